use actix_web::http::StatusCode;
use mockall::predicate::eq;
use provisioning_engine::{
    db_types::{OrderStatusType, ProvisioningConfig, ServerStatus},
    traits::{CaptureReceipt, PanelAccount, PanelAllocation, PanelInstance, PaymentGatewayError, StoreError},
};
use serde_json::Value;

use super::{
    helpers::*,
    mocks::{MockPanel, MockPayments, MockStore},
};

const PAYPAL_ID: &str = "5O190127TN364715T";

fn capture_body() -> String {
    format!(r#"{{"paypalOrderId": "{PAYPAL_ID}"}}"#)
}

fn completed_receipt() -> CaptureReceipt {
    CaptureReceipt {
        gateway_order_id: PAYPAL_ID.into(),
        capture_id: Some("3C679366HH908993F".into()),
        status: "COMPLETED".into(),
        completed: true,
    }
}

fn provisioning_config() -> ProvisioningConfig {
    ProvisioningConfig {
        plan_id: 2,
        node_id: 1,
        nest_id: 1,
        egg_id: 3,
        memory_mb: 8192,
        disk_mb: 40960,
        cpu_percent: 300,
        databases: 2,
        backups: 3,
        allocations: 1,
        docker_image: None,
        startup: None,
        environment: None,
    }
}

/// A pending order for server #12 that PayPal captures successfully.
fn paid_order_expectations(store: &mut MockStore, payments: &mut MockPayments) {
    store
        .expect_fetch_order_for_user()
        .withf(|id, user| id == PAYPAL_ID && user == ALICE)
        .times(1)
        .returning(|id, _| Ok(Some(order(7, id, OrderStatusType::Pending, Some(12)))));
    payments.expect_capture_order().withf(|id| id == PAYPAL_ID).times(1).returning(|_| Ok(completed_receipt()));
    store
        .expect_mark_order_paid()
        .with(eq(7), eq(Some("3C679366HH908993F".to_string())))
        .times(1)
        .returning(|id, _| Ok(Some(order(id, PAYPAL_ID, OrderStatusType::Paid, Some(12)))));
    store.expect_fetch_user_server().with(eq(12)).returning(|id| Ok(Some(server(id, ServerStatus::Pending))));
    store.expect_start_provisioning().with(eq(12)).times(1).returning(|_| Ok(true));
}

#[actix_web::test]
async fn capture_without_an_order_id() {
    let _ = env_logger::try_init().ok();
    let configure = configure_api(MockStore::new(), MockPayments::new(), MockPanel::new());
    let (status, body) = post_json(&alice_token(), "/orders/capture", "{}", configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "paypalOrderId is required");
}

#[actix_web::test]
async fn capture_someone_elses_order() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut payments = MockPayments::new();
    store.expect_fetch_order_for_user().times(1).returning(|_, _| Ok(None));
    payments.expect_capture_order().never();
    let configure = configure_api(store, payments, MockPanel::new());
    let (status, body) = post_json(&alice_token(), "/orders/capture", &capture_body(), configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), format!("Order {PAYPAL_ID} does not exist"));
}

#[actix_web::test]
async fn capture_that_paypal_did_not_complete() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut payments = MockPayments::new();
    store
        .expect_fetch_order_for_user()
        .returning(|id, _| Ok(Some(order(7, id, OrderStatusType::Pending, Some(12)))));
    payments.expect_capture_order().times(1).returning(|id| {
        Ok(CaptureReceipt {
            gateway_order_id: id.into(),
            capture_id: None,
            status: "PAYER_ACTION_REQUIRED".into(),
            completed: false,
        })
    });
    store.expect_mark_order_paid().never();
    let configure = configure_api(store, payments, MockPanel::new());
    let (status, body) = post_json(&alice_token(), "/orders/capture", &capture_body(), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        format!("Payment for order {PAYPAL_ID} was not completed. Status: PAYER_ACTION_REQUIRED")
    );
}

#[actix_web::test]
async fn capture_provisions_the_server_for_an_existing_panel_account() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut payments = MockPayments::new();
    let mut panel = MockPanel::new();
    paid_order_expectations(&mut store, &mut payments);
    store.expect_fetch_provisioning_config().with(eq(2)).times(1).returning(|_| Ok(Some(provisioning_config())));
    panel.expect_find_account_by_email().withf(|email| email == ALICE_EMAIL).times(1).returning(|email| {
        Ok(Some(PanelAccount { id: 14, username: "alice4821".into(), email: email.into() }))
    });
    panel.expect_create_account().never();
    panel
        .expect_find_free_allocation()
        .with(eq(1))
        .times(1)
        .returning(|_| Ok(Some(PanelAllocation { id: 71, address: "play.example.com:25567".into() })));
    panel
        .expect_create_instance()
        .withf(|spec| spec.panel_user_id == 14 && spec.allocation_id == 71 && spec.name == "Survival")
        .times(1)
        .returning(|_| Ok(PanelInstance { id: 52, identifier: "1a7ce997".into() }));
    store
        .expect_activate_server()
        .withf(|id, a| *id == 12 && a.panel_username == "alice4821" && a.panel_server_identifier == "1a7ce997")
        .times(1)
        .returning(|id, _| Ok(active_server(id, "1a7ce997")));
    store
        .expect_update_order_status()
        .with(eq(7), eq(OrderStatusType::Active))
        .times(1)
        .returning(|id, status| Ok(order(id, PAYPAL_ID, status, Some(12))));

    let configure = configure_api(store, payments, panel);
    let (status, body) = post_json(&alice_token(), "/orders/capture", &capture_body(), configure).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Payment successful! Your server has been created.");
    assert_eq!(body["userServerId"], 12);
    assert_eq!(body["serverId"], "1a7ce997");
    assert_eq!(body["panelUsername"], "alice4821");
    assert_eq!(body["panelUrl"], "https://panel.example.com/server/1a7ce997");
    assert!(body.get("panelPassword").is_none());
    assert!(body.get("error").is_none());
}

#[actix_web::test]
async fn provisioning_failure_is_still_a_successful_payment() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut payments = MockPayments::new();
    let mut panel = MockPanel::new();
    paid_order_expectations(&mut store, &mut payments);
    store.expect_fetch_provisioning_config().returning(|_| Ok(Some(provisioning_config())));
    panel.expect_find_account_by_email().returning(|email| {
        Ok(Some(PanelAccount { id: 14, username: "alice4821".into(), email: email.into() }))
    });
    panel.expect_find_free_allocation().times(1).returning(|_| Ok(None));
    panel.expect_create_instance().never();
    store
        .expect_update_server_status()
        .with(eq(12), eq(ServerStatus::Pending))
        .times(1)
        .returning(|id, status| Ok(server(id, status)));
    store.expect_update_order_status().never();

    let configure = configure_api(store, payments, panel);
    let (status, body) = post_json(&alice_token(), "/orders/capture", &capture_body(), configure).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["userServerId"], 12);
    assert_eq!(body["error"], "No available allocations on node 1");
    assert!(body.get("serverId").is_none());
}

#[actix_web::test]
async fn capture_without_a_server_record() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut payments = MockPayments::new();
    store.expect_fetch_order_for_user().returning(|id, _| Ok(Some(order(7, id, OrderStatusType::Pending, None))));
    payments.expect_capture_order().returning(|_| Ok(completed_receipt()));
    store
        .expect_mark_order_paid()
        .times(1)
        .returning(|id, _| Ok(Some(order(id, PAYPAL_ID, OrderStatusType::Paid, None))));
    store
        .expect_fetch_latest_pending_server()
        .withf(|user, plan| user == ALICE && *plan == 2)
        .times(1)
        .returning(|_, _| Ok(None));
    let configure = configure_api(store, payments, MockPanel::new());
    let (status, body) = post_json(&alice_token(), "/orders/capture", &capture_body(), configure).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        error_message(&body),
        format!("Server record not found. No pending server record exists for user {ALICE} and plan 2")
    );
}

#[actix_web::test]
async fn capture_that_paypal_already_settled() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut payments = MockPayments::new();
    store
        .expect_fetch_order_for_user()
        .returning(|id, _| Ok(Some(order(7, id, OrderStatusType::Pending, Some(12)))));
    payments
        .expect_capture_order()
        .times(1)
        .returning(|id| Err(PaymentGatewayError::AlreadyCaptured(id.to_string())));
    payments.expect_fetch_capture().withf(|id| id == PAYPAL_ID).times(1).returning(|_| Ok(completed_receipt()));
    store.expect_mark_order_paid().times(1).returning(|_, _| Ok(None));
    store
        .expect_fetch_order()
        .with(eq(7))
        .returning(|id| Ok(Some(order(id, PAYPAL_ID, OrderStatusType::Active, Some(12)))));
    store.expect_fetch_user_server().with(eq(12)).returning(|id| {
        let mut s = server(id, ServerStatus::Active);
        s.panel_server_identifier = Some("1a7ce997".into());
        Ok(Some(s))
    });
    store.expect_start_provisioning().never();
    let configure = configure_api(store, payments, MockPanel::new());
    let (status, body) = post_json(&alice_token(), "/orders/capture", &capture_body(), configure).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["serverId"], "1a7ce997");
}

#[actix_web::test]
async fn capture_recorded_by_paypal_but_not_by_us() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut payments = MockPayments::new();
    store
        .expect_fetch_order_for_user()
        .returning(|id, _| Ok(Some(order(7, id, OrderStatusType::Pending, Some(12)))));
    payments.expect_capture_order().times(1).returning(|_| Ok(completed_receipt()));
    store
        .expect_mark_order_paid()
        .times(1)
        .returning(|_, _| Err(StoreError::DatabaseError("database is locked".into())));
    let configure = configure_api(store, payments, MockPanel::new());
    let (status, body) = post_json(&alice_token(), "/orders/capture", &capture_body(), configure).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = error_message(&body);
    assert!(message.starts_with("Payment for order #7 was received"), "{message}");
}
