use actix_web::http::StatusCode;
use mockall::predicate::eq;
use provisioning_engine::db_types::{OrderStatusType, ServerStatus};
use serde_json::Value;

use super::{
    helpers::*,
    mocks::{MockPanel, MockPayments, MockStore},
};
use crate::auth::Role;

fn admin_token() -> String {
    token_for("ops-1", "ops@example.com", vec![Role::User, Role::Admin])
}

#[actix_web::test]
async fn my_servers_lists_without_credentials() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store
        .expect_fetch_servers_for_user()
        .withf(|user| user == ALICE)
        .times(1)
        .returning(|_| Ok(vec![active_server(12, "1a7ce997"), server(13, ServerStatus::Pending)]));
    let configure = configure_api(store, MockPayments::new(), MockPanel::new());
    let (status, body) = get_request(&alice_token(), "/servers", configure).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    let servers = body.as_array().unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0]["id"], 12);
    assert_eq!(servers[0]["status"], "active");
    assert_eq!(servers[0]["serverId"], "1a7ce997");
    assert_eq!(servers[0]["panelUrl"], "https://panel.example.com/server/1a7ce997");
    assert_eq!(servers[1]["status"], "pending");
    assert!(servers[1].get("panelUrl").is_none());
    assert!(!body.to_string().contains("password"));
}

#[actix_web::test]
async fn my_servers_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let configure = configure_api(MockStore::new(), MockPayments::new(), MockPanel::new());
    let (status, _) = get_request("", "/servers", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn retry_requires_the_admin_role() {
    let _ = env_logger::try_init().ok();
    let configure = configure_api(MockStore::new(), MockPayments::new(), MockPanel::new());
    let (status, body) = post_json(&alice_token(), "/admin/servers/13/provision", "", configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&body), "Insufficient permissions. Requires [admin]");
}

#[actix_web::test]
async fn retry_without_a_token() {
    let _ = env_logger::try_init().ok();
    let configure = configure_api(MockStore::new(), MockPayments::new(), MockPanel::new());
    let (status, body) = post_json("", "/admin/servers/13/provision", "", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "Authentication required.");
}

#[actix_web::test]
async fn retry_of_an_active_server_conflicts() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_user_server().with(eq(12)).returning(|id| Ok(Some(active_server(id, "1a7ce997"))));
    store.expect_start_provisioning().never();
    let configure = configure_api(store, MockPayments::new(), MockPanel::new());
    let (status, body) = post_json(&admin_token(), "/admin/servers/12/provision", "", configure).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_message(&body), "Server 12 is active. Only pending servers can be provisioned");
}

#[actix_web::test]
async fn retry_of_an_unknown_server() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_user_server().returning(|_| Ok(None));
    let configure = configure_api(store, MockPayments::new(), MockPanel::new());
    let (status, _) = post_json(&admin_token(), "/admin/servers/404/provision", "", configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn retry_with_a_bad_server_id() {
    let _ = env_logger::try_init().ok();
    let configure = configure_api(MockStore::new(), MockPayments::new(), MockPanel::new());
    let (status, body) = post_json(&admin_token(), "/admin/servers/abc/provision", "", configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Invalid path."));
}

#[actix_web::test]
async fn retry_of_a_plan_without_provisioning_config() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_user_server().with(eq(13)).returning(|id| Ok(Some(server(id, ServerStatus::Pending))));
    store
        .expect_fetch_latest_order_for_server()
        .with(eq(13))
        .returning(|id| Ok(Some(order(9, "8AB12345CD678901E", OrderStatusType::Paid, Some(id)))));
    store.expect_start_provisioning().with(eq(13)).times(1).returning(|_| Ok(true));
    store.expect_fetch_provisioning_config().with(eq(2)).times(1).returning(|_| Ok(None));
    store
        .expect_update_server_status()
        .with(eq(13), eq(ServerStatus::Pending))
        .times(1)
        .returning(|id, status| Ok(server(id, status)));
    let configure = configure_api(store, MockPayments::new(), MockPanel::new());
    let (status, body) = post_json(&admin_token(), "/admin/servers/13/provision", "", configure).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["userServerId"], 13);
    assert!(body["message"].as_str().unwrap().contains("set up by our team shortly"));
    assert!(body.get("error").is_none());
}
