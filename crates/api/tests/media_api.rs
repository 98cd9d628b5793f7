//! Integration tests for character reference images and segment videos:
//! multipart uploads, file streaming, primary image handling and cleanup
//! of stored files.

mod common;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use common::{
    body_bytes, body_json, create_character, create_episode, create_segment, create_series,
    delete_auth, get_auth, patch_json_auth, post_json_auth, put_auth, register_user, upload_auth,
    TINY_PNG,
};
use serde_json::json;
use sqlx::PgPool;

fn stored_files(app: &common::TestApp, kind: &str) -> usize {
    let dir = app.storage.root().join(kind);
    walk(&dir)
}

fn walk(dir: &std::path::Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|e| {
            let path = e.path();
            if path.is_dir() {
                walk(&path)
            } else {
                1
            }
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Character images
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_image_upload_and_primary_handling(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = register_user(&app, "owner@example.com").await;
    let series_id = create_series(&app, &token, "Show").await;
    let character_id = create_character(&app, &token, series_id, "Mara").await;
    let uri = format!("/api/v1/series/{series_id}/characters/{character_id}/images");

    let first = upload_auth(&app, &uri, &token, "a.png", "image/png", TINY_PNG).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await["data"].clone();
    assert_eq!(first["is_primary"], true);
    assert_eq!(first["content_type"], "image/png");
    assert_eq!(first["byte_size"], TINY_PNG.len());
    assert!(first.get("storage_key").is_none());

    let second = body_json(upload_auth(&app, &uri, &token, "b.png", "image/png", TINY_PNG).await)
        .await["data"]
        .clone();
    assert_eq!(second["is_primary"], false);
    assert_eq!(stored_files(&app, "characters"), 2);

    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    let promoted = put_auth(&app, &format!("{uri}/{second_id}/primary"), &token).await;
    assert_eq!(promoted.status(), StatusCode::OK);
    let list = body_json(get_auth(&app, &uri, &token).await).await;
    let images = list["data"].as_array().unwrap();
    assert_eq!(images[0]["id"], second_id);
    assert_eq!(images[0]["is_primary"], true);
    assert_eq!(images[1]["is_primary"], false);

    let file = get_auth(&app, &format!("{uri}/{first_id}/file"), &token).await;
    assert_eq!(file.status(), StatusCode::OK);
    assert_eq!(file.headers()[CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(file).await, TINY_PNG);

    // Removing the primary promotes the remaining image.
    let deleted = delete_auth(&app, &format!("{uri}/{second_id}"), &token).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    let list = body_json(get_auth(&app, &uri, &token).await).await;
    assert_eq!(list["data"][0]["id"], first_id);
    assert_eq!(list["data"][0]["is_primary"], true);
    assert_eq!(stored_files(&app, "characters"), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_image_upload_rejects_bad_files(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = register_user(&app, "owner@example.com").await;
    let series_id = create_series(&app, &token, "Show").await;
    let character_id = create_character(&app, &token, series_id, "Mara").await;
    let uri = format!("/api/v1/series/{series_id}/characters/{character_id}/images");

    let gif = upload_auth(&app, &uri, &token, "a.gif", "image/gif", b"GIF89a").await;
    assert_eq!(gif.status(), StatusCode::BAD_REQUEST);

    let empty = upload_auth(&app, &uri, &token, "a.png", "image/png", b"").await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let missing = get_auth(&app, &format!("{uri}/999999/file"), &token).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(stored_files(&app, "characters"), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_users_images_are_forbidden(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (owner, _) = register_user(&app, "owner@example.com").await;
    let (intruder, _) = register_user(&app, "intruder@example.com").await;
    let series_id = create_series(&app, &owner, "Show").await;
    let character_id = create_character(&app, &owner, series_id, "Mara").await;
    let uri = format!("/api/v1/series/{series_id}/characters/{character_id}/images");

    let upload = upload_auth(&app, &uri, &intruder, "a.png", "image/png", TINY_PNG).await;
    assert_eq!(upload.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_character_removes_image_files(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = register_user(&app, "owner@example.com").await;
    let series_id = create_series(&app, &token, "Show").await;
    let character_id = create_character(&app, &token, series_id, "Mara").await;
    let uri = format!("/api/v1/series/{series_id}/characters/{character_id}/images");
    upload_auth(&app, &uri, &token, "a.png", "image/png", TINY_PNG).await;
    assert_eq!(stored_files(&app, "characters"), 1);

    let deleted = delete_auth(
        &app,
        &format!("/api/v1/series/{series_id}/characters/{character_id}"),
        &token,
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert_eq!(stored_files(&app, "characters"), 0);
}

// ---------------------------------------------------------------------------
// Videos
// ---------------------------------------------------------------------------

async fn segment_fixture(app: &common::TestApp, token: &str) -> (i64, i64) {
    let series_id = create_series(app, token, "Show").await;
    let episode_id = create_episode(app, token, series_id, "Pilot").await;
    let segment_id = create_segment(app, token, episode_id, json!({ "title": "Open" })).await;
    (episode_id, segment_id)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_video_job_records(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = register_user(&app, "owner@example.com").await;
    let (_, segment_id) = segment_fixture(&app, &token).await;
    let uri = format!("/api/v1/segments/{segment_id}/videos");

    let created = post_json_auth(
        &app,
        &uri,
        &token,
        json!({ "provider": "runway", "external_job_id": "job-17" }),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = body_json(created).await["data"].clone();
    assert_eq!(created["status"], "queued");
    let id = created["id"].as_i64().unwrap();

    let failed = patch_json_auth(
        &app,
        &format!("{uri}/{id}"),
        &token,
        json!({ "status": "failed", "error_message": "provider timeout" }),
    )
    .await;
    assert_eq!(failed.status(), StatusCode::OK);
    assert_eq!(body_json(failed).await["data"]["error_message"], "provider timeout");

    let bad = patch_json_auth(&app, &format!("{uri}/{id}"), &token, json!({ "status": "done" })).await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    // No stored file for a job record.
    let file = get_auth(&app, &format!("{uri}/{id}/file"), &token).await;
    assert_eq!(file.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_video_upload_stream_and_delete(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = register_user(&app, "owner@example.com").await;
    let (episode_id, segment_id) = segment_fixture(&app, &token).await;
    let uri = format!("/api/v1/segments/{segment_id}/videos");
    let payload = b"\x00\x00\x00\x18ftypmp42fake-video-bytes";

    let uploaded = upload_auth(
        &app,
        &format!("{uri}/upload"),
        &token,
        "take1.MP4",
        "application/octet-stream",
        payload,
    )
    .await;
    assert_eq!(uploaded.status(), StatusCode::CREATED);
    let video = body_json(uploaded).await["data"].clone();
    assert_eq!(video["status"], "complete");
    assert_eq!(video["content_type"], "video/mp4");
    let id = video["id"].as_i64().unwrap();
    assert_eq!(stored_files(&app, "videos"), 1);

    let file = get_auth(&app, &format!("{uri}/{id}/file"), &token).await;
    assert_eq!(file.status(), StatusCode::OK);
    assert_eq!(file.headers()[CONTENT_TYPE], "video/mp4");
    assert_eq!(body_bytes(file).await, payload);

    let unsupported = upload_auth(
        &app,
        &format!("{uri}/upload"),
        &token,
        "take1.avi",
        "video/x-msvideo",
        payload,
    )
    .await;
    assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);

    // Deleting the segment removes its videos and their files.
    let deleted = delete_auth(
        &app,
        &format!("/api/v1/episodes/{episode_id}/segments/{segment_id}"),
        &token,
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert_eq!(stored_files(&app, "videos"), 0);
}
