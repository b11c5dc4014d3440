use reqwest::multipart::Form;
use serde_json::Value;

use crate::helpers::{image_part, spawn_app, spawn_app_with, TestFaceModel, TestStorage};

/// A selfie close to the faces of photos 1 and 2, far from photo 3
fn face_model() -> TestFaceModel {
    TestFaceModel::default()
        .with_face(b"selfie", &[1.0, 0.0, 0.0])
        .with_face(b"photo-1", &[0.98, 0.1, 0.0])
        .with_face(b"photo-2", &[0.95, 0.2, 0.05])
        .with_face(b"photo-3", &[0.0, 0.0, 1.0])
}

async fn event_storage() -> TestStorage {
    TestStorage::default()
        .with_object("photographer-uploads/1.jpg", b"photo-1")
        .await
        .with_object("photographer-uploads/2.jpg", b"photo-2")
        .await
        .with_object("photographer-uploads/3.jpg", b"photo-3")
        .await
}

fn selfie_form(content: &[u8]) -> Form {
    Form::new().part("selfie", image_part("selfie.jpg", content))
}

fn matched_filenames(body: &Value) -> Vec<&str> {
    body["matched_files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|file| file["filename"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn selfie_sort_returns_the_photos_of_the_selfie_person() {
    let app = spawn_app_with(event_storage().await, face_model()).await;

    let response = app.post_selfie_sort(selfie_form(b"selfie")).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["total_matches"], 2);
    assert_ne!(body["selfie_cluster"], -1);
    assert_eq!(
        matched_filenames(&body),
        vec!["photographer-uploads/1.jpg", "photographer-uploads/2.jpg"]
    );
    for matched_file in body["matched_files"].as_array().unwrap() {
        assert_eq!(matched_file["cluster"], body["selfie_cluster"]);
        let url = matched_file["url"].as_str().unwrap();
        assert!(url.starts_with("memory://matched-selfies/"));
    }

    let published: Vec<String> = app
        .storage
        .objects
        .keys()
        .into_iter()
        .filter(|key| key.starts_with("matched-selfies/"))
        .collect();
    assert_eq!(published.len(), 2);
}

#[tokio::test]
async fn selfie_sort_returns_no_match_when_the_selfie_is_alone() {
    let storage = TestStorage::default()
        .with_object("photographer-uploads/1.jpg", b"photo-3")
        .await
        .with_object("photographer-uploads/2.jpg", b"other")
        .await;
    let face_model = face_model().with_face(b"other", &[0.0, 1.0, 0.0]);
    let app = spawn_app_with(storage, face_model).await;

    let response = app.post_selfie_sort(selfie_form(b"selfie")).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["total_matches"], 0);
    assert_eq!(body["selfie_cluster"], -1);
    assert!(matched_filenames(&body).is_empty());
}

#[tokio::test]
async fn selfie_sort_returns_400_when_the_selfie_has_no_face() {
    let app = spawn_app_with(event_storage().await, face_model()).await;

    let response = app.post_selfie_sort(selfie_form(b"a landscape")).await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No face detected in selfie");
    // Nothing was read from the storage
    assert_eq!(app.storage.calls(), (0, 0));
    assert_eq!(app.face_model.call_count(), 1);
}

#[tokio::test]
async fn selfie_sort_returns_400_when_the_selfie_is_missing() {
    let app = spawn_app().await;
    let form = Form::new().part("not_a_selfie", image_part("selfie.jpg", b"selfie"));

    let response = app.post_selfie_sort(form).await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing selfie");
}

#[tokio::test]
async fn selfie_sort_skips_the_photos_that_cannot_be_downloaded() {
    let storage = event_storage()
        .await
        .failing_get("photographer-uploads/2.jpg");
    let app = spawn_app_with(storage, face_model()).await;

    let response = app.post_selfie_sort(selfie_form(b"selfie")).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["total_matches"], 1);
    assert_eq!(matched_filenames(&body), vec!["photographer-uploads/1.jpg"]);
    assert!(body["failed_files"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn selfie_sort_ignores_files_that_are_not_images() {
    let storage = event_storage()
        .await
        .with_object("photographer-uploads/notes.txt", b"photo-1")
        .await;
    let app = spawn_app_with(storage, face_model()).await;

    let response = app.post_selfie_sort(selfie_form(b"selfie")).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total_matches"], 2);
    // Only the 3 photos were downloaded
    assert_eq!(app.storage.calls(), (1, 3));
}

#[tokio::test]
async fn selfie_sort_reports_the_matches_that_could_not_be_published() {
    let storage = event_storage().await.failing_put("_2.jpg");
    let app = spawn_app_with(storage, face_model()).await;

    let response = app.post_selfie_sort(selfie_form(b"selfie")).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "partial_success");
    assert_eq!(body["total_matches"], 1);
    assert_eq!(matched_filenames(&body), vec!["photographer-uploads/1.jpg"]);
    let failed_files = body["failed_files"].as_array().unwrap();
    assert_eq!(failed_files.len(), 1);
    assert_eq!(failed_files[0]["filename"], "photographer-uploads/2.jpg");
    assert!(failed_files[0]["error"]
        .as_str()
        .unwrap()
        .contains("access denied"));
}

#[tokio::test]
async fn selfie_sort_returns_500_when_no_match_can_be_published() {
    let storage = event_storage().await.failing_put("matched-selfies/");
    let app = spawn_app_with(storage, face_model()).await;

    let response = app.post_selfie_sort(selfie_form(b"selfie")).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "None of the 2 matches could be published");
}

#[tokio::test]
async fn selfie_sort_returns_500_with_the_cause_when_the_listing_fails() {
    let storage = event_storage().await.failing_list();
    let app = spawn_app_with(storage, face_model()).await;

    let response = app.post_selfie_sort(selfie_form(b"selfie")).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Failed to list the candidate images: bucket listing unavailable"
    );
    assert_eq!(app.storage.calls(), (1, 0));
}

#[tokio::test]
async fn selfie_sort_returns_a_json_400_when_the_body_is_not_a_form() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .post(&format!("{}/selfie_sort", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing selfie");
}

#[tokio::test]
async fn selfie_sort_answers_cross_origin_preflight_requests() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .request(
            reqwest::Method::OPTIONS,
            &format!("{}/selfie_sort", &app.address),
        )
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("http://localhost:3000")
    );
    let allowed_methods = response
        .headers()
        .get("access-control-allow-methods")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(allowed_methods.contains("POST"));
}
