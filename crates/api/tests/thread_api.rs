//! Integration tests for thread pages, posting and post ownership.

mod common;

use agora_core::limits::DELETED_POST_CONTENT;
use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// App with users alice and bob, and one thread opened by alice.
async fn app_with_thread() -> (TestApp, i64) {
    let app = common::build_test_app();
    app.seed_user("alice", "Alice").await;
    app.seed_user("bob", "Bob").await;
    let forum = app.seed_forum("General").await;
    let thread = app.seed_thread(forum.id, "alice", "Test Thread").await;
    (app, thread.id)
}

async fn first_post_id(app: &TestApp, thread_id: i64) -> i64 {
    let json = body_json(app.get(&format!("/threads/{thread_id}/1")).await).await;
    json["page"]["posts"][0]["id"].as_i64().unwrap()
}

async fn reply(app: &TestApp, thread_id: i64, user: &str, content: &str) -> StatusCode {
    app.post_json_auth(
        &format!("/threads/{thread_id}"),
        &app.member_token(user),
        json!({ "content": content }),
    )
    .await
    .status()
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forty_first_post_opens_page_two() {
    let (app, thread_id) = app_with_thread().await;

    // The opening post plus 39 replies fill page 1.
    for i in 0..39 {
        assert_eq!(reply(&app, thread_id, "bob", &format!("reply {i}")).await, StatusCode::OK);
    }
    let json = body_json(app.get(&format!("/threads/{thread_id}")).await).await;
    assert_eq!(json["thread"]["pages"], 1);

    let response = app
        .post_json_auth(
            &format!("/threads/{thread_id}"),
            &app.member_token("bob"),
            json!({ "content": "overflow" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "SUCCESS");
    assert_eq!(json["thread"]["pages"], 2);

    let page_one = body_json(app.get(&format!("/threads/{thread_id}/1")).await).await;
    assert_eq!(page_one["page"]["posts"].as_array().unwrap().len(), 40);
    assert_eq!(page_one["page"]["posts"][0]["content"], "Opening post");

    let page_two = body_json(app.get(&format!("/threads/{thread_id}/2")).await).await;
    assert_eq!(page_two["page"]["pageNumber"], 2);
    let posts = page_two["page"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["content"], "overflow");
    assert_eq!(posts[0]["user_name"], "Bob");
}

#[tokio::test]
async fn posts_keep_creation_order() {
    let (app, thread_id) = app_with_thread().await;
    for content in ["one", "two", "three"] {
        reply(&app, thread_id, "bob", content).await;
    }

    let json = body_json(app.get(&format!("/threads/{thread_id}/1")).await).await;
    let contents: Vec<&str> = json["page"]["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, ["Opening post", "one", "two", "three"]);
}

#[tokio::test]
async fn out_of_range_pages_are_404() {
    let (app, thread_id) = app_with_thread().await;

    for page in [0, 2, -1] {
        let response = app.get(&format!("/threads/{thread_id}/{page}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "page {page}");
    }
}

// ---------------------------------------------------------------------------
// Posting rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn locked_thread_rejects_posts_with_422() {
    let (app, thread_id) = app_with_thread().await;
    let admin = app.admin_token();

    let response = app
        .post_auth(&format!("/admin/threads/{thread_id}/lock"), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post_json_auth(
            &format!("/threads/{thread_id}"),
            &app.member_token("bob"),
            json!({ "content": "too late" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNPROCESSABLE");

    app.post_auth(&format!("/admin/threads/{thread_id}/unlock"), &admin)
        .await;
    assert_eq!(reply(&app, thread_id, "bob", "back open").await, StatusCode::OK);
}

#[tokio::test]
async fn unregistered_author_cannot_reply() {
    let (app, thread_id) = app_with_thread().await;
    assert_eq!(
        reply(&app, thread_id, "ghost", "boo").await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn reply_to_missing_thread_is_404() {
    let (app, _) = app_with_thread().await;
    assert_eq!(reply(&app, 999, "bob", "hello?").await, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn owner_can_edit_their_post() {
    let (app, thread_id) = app_with_thread().await;
    let post_id = first_post_id(&app, thread_id).await;

    let response = app
        .send(
            Method::PATCH,
            &format!("/threads/{thread_id}"),
            Some(&app.member_token("alice")),
            Some(json!({ "post_id": post_id, "content": "Edited" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "SUCCESS");

    let json = body_json(app.get(&format!("/threads/{thread_id}/1")).await).await;
    assert_eq!(json["page"]["posts"][0]["content"], "Edited");
    assert!(json["page"]["posts"][0]["dateEdited"].is_string());
}

#[tokio::test]
async fn non_owner_edit_is_503_not_owner() {
    let (app, thread_id) = app_with_thread().await;
    let post_id = first_post_id(&app, thread_id).await;

    let response = app
        .send(
            Method::PATCH,
            &format!("/threads/{thread_id}"),
            Some(&app.member_token("bob")),
            Some(json!({ "post_id": post_id, "content": "Hijacked" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "NOT_OWNER");

    let json = body_json(app.get(&format!("/threads/{thread_id}/1")).await).await;
    assert_eq!(json["page"]["posts"][0]["content"], "Opening post");
}

#[tokio::test]
async fn admin_can_edit_any_post() {
    let (app, thread_id) = app_with_thread().await;
    let post_id = first_post_id(&app, thread_id).await;

    let response = app
        .send(
            Method::PATCH,
            &format!("/threads/{thread_id}"),
            Some(&app.admin_token()),
            Some(json!({ "post_id": post_id, "content": "Moderated" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn editing_unknown_or_foreign_posts_is_404() {
    let (app, thread_id) = app_with_thread().await;
    let post_id = first_post_id(&app, thread_id).await;
    let forum_id = app.seed_forum("Elsewhere").await.id;
    let other = app.seed_thread(forum_id, "alice", "Other").await;
    let token = app.member_token("alice");

    let response = app
        .send(
            Method::PATCH,
            &format!("/threads/{thread_id}"),
            Some(&token),
            Some(json!({ "post_id": 9999, "content": "x" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(
            Method::PATCH,
            &format!("/threads/{}", other.id),
            Some(&token),
            Some(json!({ "post_id": post_id, "content": "x" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn owner_delete_leaves_a_placeholder() {
    let (app, thread_id) = app_with_thread().await;
    let post_id = first_post_id(&app, thread_id).await;

    let response = app
        .send(
            Method::DELETE,
            &format!("/threads/{thread_id}"),
            Some(&app.member_token("alice")),
            Some(json!({ "post_id": post_id })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(app.get(&format!("/threads/{thread_id}/1")).await).await;
    let posts = json["page"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["content"], DELETED_POST_CONTENT);
}

#[tokio::test]
async fn non_owner_delete_is_503_and_admin_delete_succeeds() {
    let (app, thread_id) = app_with_thread().await;
    let post_id = first_post_id(&app, thread_id).await;
    let uri = format!("/threads/{thread_id}");
    let body = json!({ "post_id": post_id });

    let response = app
        .send(
            Method::DELETE,
            &uri,
            Some(&app.member_token("bob")),
            Some(body.clone()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .send(Method::DELETE, &uri, Some(&app.admin_token()), Some(body))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_requires_the_delete_permission() {
    let (app, thread_id) = app_with_thread().await;
    let post_id = first_post_id(&app, thread_id).await;

    let response = app
        .send(
            Method::DELETE,
            &format!("/threads/{thread_id}"),
            Some(&app.token("alice", &["edit:post"])),
            Some(json!({ "post_id": post_id })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
