/// Formats an error followed by the chain of its causes.
///
/// Used by the `Debug` implementations of the error enums so that logs
/// (`?error`) show the root cause and not only the outermost message.
pub fn error_chain_fmt(
    error: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", error)?;

    let mut current = error.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }

    Ok(())
}

/// One-line message made of an error and each of its causes, separated by `: `
///
/// Used where the causes must reach a client, in an HTTP error body for ex.
pub fn error_chain_message(error: &impl std::error::Error) -> String {
    let mut message = error.to_string();

    let mut current = error.source();
    while let Some(cause) = current {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        current = cause.source();
    }

    message
}
