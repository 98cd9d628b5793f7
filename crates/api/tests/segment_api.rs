//! Integration tests for segments: defaults, reference checks, duration
//! bounds and the status lifecycle.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_character, create_episode, create_ok, create_segment, create_series,
    delete_auth, get_auth, patch_json_auth, post_json_auth, register_user,
};
use serde_json::json;
use sqlx::PgPool;

struct Fixture {
    app: common::TestApp,
    token: String,
    series_id: i64,
    episode_id: i64,
}

async fn fixture(pool: PgPool) -> Fixture {
    let app = common::build_test_app(pool);
    let (token, _) = register_user(&app, "writer@example.com").await;
    let series_id = create_series(&app, &token, "Show").await;
    let episode_id = create_episode(&app, &token, series_id, "Pilot").await;
    Fixture {
        app,
        token,
        series_id,
        episode_id,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_segment_defaults_and_ordering(pool: PgPool) {
    let f = fixture(pool).await;
    let uri = format!("/api/v1/episodes/{}/segments", f.episode_id);

    let first = body_json(post_json_auth(&f.app, &uri, &f.token, json!({ "title": "Open" })).await)
        .await;
    assert_eq!(first["data"]["segment_index"], 0);
    assert_eq!(first["data"]["duration_secs"], 5.0);
    assert_eq!(first["data"]["status"], "draft");
    assert_eq!(first["data"]["character_ids"], json!([]));

    create_segment(&f.app, &f.token, f.episode_id, json!({ "title": "Middle" })).await;
    create_segment(
        &f.app,
        &f.token,
        f.episode_id,
        json!({ "title": "End", "duration_secs": 12.5 }),
    )
    .await;

    let list = body_json(get_auth(&f.app, &uri, &f.token).await).await;
    let titles: Vec<&str> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Open", "Middle", "End"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_segment_references_must_be_in_series(pool: PgPool) {
    let f = fixture(pool).await;
    let other_series = create_series(&f.app, &f.token, "Other").await;
    let mara = create_character(&f.app, &f.token, f.series_id, "Mara").await;
    let stranger = create_character(&f.app, &f.token, other_series, "Stranger").await;
    let foreign_setting = create_ok(
        &f.app,
        &format!("/api/v1/series/{other_series}/settings"),
        &f.token,
        json!({ "name": "Moon" }),
    )
    .await;
    let uri = format!("/api/v1/episodes/{}/segments", f.episode_id);

    let ok = post_json_auth(
        &f.app,
        &uri,
        &f.token,
        json!({ "title": "Pulse", "character_ids": [mara, mara] }),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::CREATED);

    let bad_character = post_json_auth(
        &f.app,
        &uri,
        &f.token,
        json!({ "title": "Pulse", "character_ids": [mara, stranger] }),
    )
    .await;
    assert_eq!(bad_character.status(), StatusCode::BAD_REQUEST);

    let bad_setting = post_json_auth(
        &f.app,
        &uri,
        &f.token,
        json!({ "title": "Pulse", "setting_id": foreign_setting }),
    )
    .await;
    assert_eq!(bad_setting.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_segment_duration_bounds(pool: PgPool) {
    let f = fixture(pool).await;
    let uri = format!("/api/v1/episodes/{}/segments", f.episode_id);

    for bad in [0.0, 0.5, 601.0] {
        let response = post_json_auth(
            &f.app,
            &uri,
            &f.token,
            json!({ "title": "T", "duration_secs": bad }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "duration {bad}");
    }

    for good in [1.0, 600.0] {
        let response = post_json_auth(
            &f.app,
            &uri,
            &f.token,
            json!({ "title": "T", "duration_secs": good }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED, "duration {good}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_segment_status_lifecycle(pool: PgPool) {
    let f = fixture(pool).await;
    let id = create_segment(&f.app, &f.token, f.episode_id, json!({ "title": "T" })).await;
    let uri = format!("/api/v1/episodes/{}/segments/{id}", f.episode_id);

    let skip = patch_json_auth(&f.app, &uri, &f.token, json!({ "status": "complete" })).await;
    assert_eq!(skip.status(), StatusCode::BAD_REQUEST);

    for status in ["prompt_ready", "generating", "failed", "prompt_ready", "draft"] {
        let response = patch_json_auth(&f.app, &uri, &f.token, json!({ "status": status })).await;
        assert_eq!(response.status(), StatusCode::OK, "to {status}");
        assert_eq!(body_json(response).await["data"]["status"], status);
    }

    let unknown = patch_json_auth(&f.app, &uri, &f.token, json!({ "status": "paused" })).await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_segment_ownership_and_scoping(pool: PgPool) {
    let f = fixture(pool).await;
    let (intruder, _) = register_user(&f.app, "intruder@example.com").await;
    let other_episode = create_episode(&f.app, &f.token, f.series_id, "Second").await;
    let id = create_segment(&f.app, &f.token, f.episode_id, json!({ "title": "T" })).await;

    let forbidden = get_auth(
        &f.app,
        &format!("/api/v1/episodes/{}/segments/{id}", f.episode_id),
        &intruder,
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let wrong_episode = get_auth(
        &f.app,
        &format!("/api/v1/episodes/{other_episode}/segments/{id}"),
        &f.token,
    )
    .await;
    assert_eq!(wrong_episode.status(), StatusCode::NOT_FOUND);

    let deleted = delete_auth(
        &f.app,
        &format!("/api/v1/episodes/{}/segments/{id}", f.episode_id),
        &f.token,
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
}
