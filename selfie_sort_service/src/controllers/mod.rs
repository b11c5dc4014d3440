pub mod health_check;
pub mod selfie_sort;
pub mod upload_folder;

pub use health_check::*;
pub use selfie_sort::*;
pub use upload_folder::*;
