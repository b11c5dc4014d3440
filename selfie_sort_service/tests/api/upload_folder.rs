use reqwest::multipart::Form;
use serde_json::Value;

use crate::helpers::{image_part, spawn_app};

#[tokio::test]
async fn upload_folder_stores_the_photos_under_the_folder() {
    let app = spawn_app().await;
    let form = Form::new()
        .text("s3_folder", " Wedding 2024 ")
        .part("folder_images", image_part("ceremony/a.jpg", b"a"))
        .part("folder_images", image_part("b.jpg", b"b"));

    let response = app.post_upload_folder(form).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "Uploaded");
    assert_eq!(body["uploaded_count"], 2);
    assert_eq!(body["uploaded_files"][0]["filename"], "ceremony/a.jpg");
    assert_eq!(
        body["uploaded_files"][0]["url"],
        "memory://Wedding-2024/ceremony/a.jpg?expires_in=3600"
    );
    assert!(body["failed_files"].as_array().unwrap().is_empty());

    let stored = app.storage.objects.object("Wedding-2024/b.jpg").unwrap();
    assert_eq!(stored.content, b"b");
    assert_eq!(stored.content_type, "image/jpeg");
}

#[tokio::test]
async fn upload_folder_uses_the_photographer_folder_by_default() {
    let app = spawn_app().await;
    let form = Form::new().part("folder_images", image_part("a.jpg", b"a"));

    let response = app.post_upload_folder(form).await;

    assert_eq!(200, response.status().as_u16());
    assert!(app
        .storage
        .objects
        .object("photographer-uploads/a.jpg")
        .is_some());
}

#[tokio::test]
async fn upload_folder_returns_400_without_images() {
    let app = spawn_app().await;
    let form = Form::new().text("s3_folder", "wedding");

    let response = app.post_upload_folder(form).await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No images uploaded");
}

#[tokio::test]
async fn upload_folder_returns_a_json_400_when_the_body_is_not_a_form() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .post(&format!("{}/upload_folder", &app.address))
        .body("not a form")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No images uploaded");
}

#[tokio::test]
async fn cross_origin_responses_allow_the_caller_origin() {
    let app = spawn_app().await;
    let form = Form::new().part("folder_images", image_part("a.jpg", b"a"));

    let response = reqwest::Client::new()
        .post(&format!("{}/upload_folder", &app.address))
        .header("Origin", "http://localhost:3000")
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("http://localhost:3000")
    );
}
