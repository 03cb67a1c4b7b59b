mod common;

use axum::http::StatusCode;
use common::*;

const LDU_MAILBOX: &str = "/probation-areas/ABC/local-delivery-units/ABC200/functional-mailbox";

#[tokio::test]
async fn write_without_authorization_header_is_forbidden() -> anyhow::Result<()> {
    let (app, _) = test_app();

    let response = request(&app, "PUT", LDU_MAILBOX, None, Some("a@b.com".into())).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await?;
    assert_eq!(body, serde_json::json!({ "status": 403 }));
    Ok(())
}

#[tokio::test]
async fn write_with_garbage_token_is_forbidden() {
    let (app, _) = test_app();

    let status = put_mailbox(&app, LDU_MAILBOX, Some("not.a.jwt"), "a@b.com").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn write_without_maintainer_role_is_forbidden_even_for_valid_input() {
    let (app, _) = test_app();

    let viewer = viewer_token();
    let status = put_mailbox(&app, LDU_MAILBOX, Some(&viewer), "a@b.com").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let status = delete(&app, LDU_MAILBOX, Some(&viewer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_check_runs_before_validation() {
    let (app, _) = test_app();

    // Input is invalid too, but the missing role wins.
    let status = put_mailbox(
        &app,
        "/probation-areas/a/local-delivery-units/b/functional-mailbox",
        None,
        "not-an-email",
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn maintain_ref_data_and_system_user_both_allow_writes() {
    let (app, _) = test_app();

    let maintainer = maintainer_token();
    let status = put_mailbox(&app, LDU_MAILBOX, Some(&maintainer), "a@b.com").await;
    assert_eq!(status, StatusCode::CREATED);

    let system = system_user_token();
    let status = put_mailbox(&app, LDU_MAILBOX, Some(&system), "b@c.com").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn machine_client_token_without_user_name_works() {
    let (app, store) = test_app();

    let client = token(None, Some("delius"), &["ROLE_SYSTEM_USER"]);
    let status = put_mailbox(&app, LDU_MAILBOX, Some(&client), "a@b.com").await;
    assert_eq!(status, StatusCode::CREATED);

    // Audit attribution falls back to the client id.
    let row = store.snapshot("ABC", "ABC200").await.unwrap();
    assert_eq!(row.create_user_id.as_deref(), Some("delius"));
}

#[tokio::test]
async fn list_endpoints_require_view_probation_teams() {
    let (app, _) = test_app();

    for path in ["/local-delivery-units", "/probation-area-codes"] {
        let anonymous = get(&app, path, None).await;
        assert_eq!(anonymous.status(), StatusCode::FORBIDDEN, "{path}");

        let viewer = viewer_token();
        let authorised = get(&app, path, Some(&viewer)).await;
        assert_eq!(authorised.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn keyed_reads_are_open() {
    let (app, _) = test_app();

    let response = get(&app, "/probation-areas/ABC", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/probation-areas/ABC/local-delivery-units/ABC200", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_root_are_public() -> anyhow::Result<()> {
    let (app, _) = test_app();

    let health = get(&app, "/health", None).await;
    assert_eq!(health.status(), StatusCode::OK);
    let body = body_json(health).await?;
    assert_eq!(body["status"], "ok");

    let root = get(&app, "/", None).await;
    assert_eq!(root.status(), StatusCode::OK);
    let body = body_json(root).await?;
    assert_eq!(body["name"], "probation-teams-api");
    Ok(())
}

#[tokio::test]
async fn health_reports_degraded_when_the_store_is_down() -> anyhow::Result<()> {
    let (app, store) = test_app();
    store.fail_pings();

    let health = get(&app, "/health", None).await;
    assert_eq!(health.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(health).await?;
    assert_eq!(body["status"], "degraded");
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    Ok(())
}
