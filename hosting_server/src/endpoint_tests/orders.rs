use actix_web::http::StatusCode;
use chrono::{Duration, Utc};
use hosting_common::Money;
use mockall::predicate::eq;
use provisioning_engine::{
    db_types::{NewOrder, OrderStatusType, ServerStatus},
    traits::{PayableOrder, PayableOrderCreated, PaymentGatewayError},
};
use serde_json::{json, Value};

use super::{
    helpers::*,
    mocks::{MockPanel, MockPayments, MockStore},
};
use crate::auth::{JwtClaims, Role};

const APPROVE_URL: &str = "https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T";

fn untouched() -> (MockStore, MockPayments, MockPanel) {
    (MockStore::new(), MockPayments::new(), MockPanel::new())
}

#[actix_web::test]
async fn create_order_without_a_token() {
    let _ = env_logger::try_init().ok();
    let (store, payments, panel) = untouched();
    let body = r#"{"planId": 2, "serverName": "Survival"}"#;
    let (status, body) = post_json("", "/orders", body, configure_api(store, payments, panel)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "Authentication required.");
}

#[actix_web::test]
async fn create_order_with_an_expired_token() {
    let _ = env_logger::try_init().ok();
    let (store, payments, panel) = untouched();
    let token = issue_token(JwtClaims::new(ALICE, ALICE_EMAIL, vec![Role::User], Utc::now() - Duration::hours(3)));
    let body = r#"{"planId": 2, "serverName": "Survival"}"#;
    let (status, _) = post_json(&token, "/orders", body, configure_api(store, payments, panel)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_order_without_a_plan() {
    let _ = env_logger::try_init().ok();
    let (store, payments, panel) = untouched();
    let body = r#"{"serverName": "Survival"}"#;
    let (status, body) = post_json(&alice_token(), "/orders", body, configure_api(store, payments, panel)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "planId is required");
}

#[actix_web::test]
async fn create_order_with_a_blank_server_name() {
    let _ = env_logger::try_init().ok();
    let (store, payments, panel) = untouched();
    let body = r#"{"planId": 2, "serverName": "   "}"#;
    let (status, body) = post_json(&alice_token(), "/orders", body, configure_api(store, payments, panel)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "serverName is required");
}

#[actix_web::test]
async fn create_order_with_an_unknown_billing_cycle() {
    let _ = env_logger::try_init().ok();
    let (store, payments, panel) = untouched();
    let body = r#"{"planId": 2, "serverName": "Survival", "billingCycle": "weekly"}"#;
    let (status, body) = post_json(&alice_token(), "/orders", body, configure_api(store, payments, panel)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("billingCycle:"));
}

#[actix_web::test]
async fn create_order_with_a_malformed_body() {
    let _ = env_logger::try_init().ok();
    let (store, payments, panel) = untouched();
    let (status, body) = post_json(&alice_token(), "/orders", "{planId: 2", configure_api(store, payments, panel)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Could not read request body."));
}

#[actix_web::test]
async fn create_order_for_an_unknown_plan() {
    let _ = env_logger::try_init().ok();
    let (mut store, payments, panel) = untouched();
    store.expect_fetch_plan().with(eq(99)).times(1).returning(|_| Ok(None));
    let body = r#"{"planId": 99, "serverName": "Survival"}"#;
    let (status, body) = post_json(&alice_token(), "/orders", body, configure_api(store, payments, panel)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "Plan 99 does not exist");
}

#[actix_web::test]
async fn create_yearly_order() {
    let _ = env_logger::try_init().ok();
    let (mut store, mut payments, panel) = untouched();
    store.expect_fetch_plan().with(eq(2)).times(1).returning(|id| Ok(Some(plan(id, "Pro", 1999))));
    payments
        .expect_create_payable_order()
        .withf(|o: &PayableOrder| {
            o.amount == Money::from_cents(19190) && o.currency == "USD" && o.description == "Pro - Yearly"
        })
        .times(1)
        .returning(|_| {
            Ok(PayableOrderCreated { gateway_order_id: "5O190127TN364715T".into(), approve_url: APPROVE_URL.into() })
        });
    store
        .expect_insert_order()
        .withf(|o: &NewOrder| o.user_id == ALICE && o.gateway_order_id == "5O190127TN364715T")
        .times(1)
        .returning(|o| Ok(order(7, &o.gateway_order_id, OrderStatusType::Pending, None)));
    store
        .expect_insert_user_server()
        .withf(|s| s.user_id == ALICE && s.panel_email == ALICE_EMAIL && s.name == "Survival" && s.plan_id == 2)
        .times(1)
        .returning(|_| Ok(server(12, ServerStatus::Pending)));
    let body = r#"{"planId": 2, "serverName": "Survival", "billingCycle": "yearly"}"#;
    let (status, body) = post_json(&alice_token(), "/orders", body, configure_api(store, payments, panel)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"orderId": "5O190127TN364715T", "approveUrl": APPROVE_URL, "dbOrderId": 7}));
}

#[actix_web::test]
async fn create_order_when_paypal_is_down() {
    let _ = env_logger::try_init().ok();
    let (mut store, mut payments, panel) = untouched();
    store.expect_fetch_plan().returning(|id| Ok(Some(plan(id, "Pro", 1999))));
    payments
        .expect_create_payable_order()
        .times(1)
        .returning(|_| Err(PaymentGatewayError::Unavailable("connection refused".into())));
    store.expect_insert_order().never();
    store.expect_insert_user_server().never();
    let body = r#"{"planId": 2, "serverName": "Survival"}"#;
    let (status, body) = post_json(&alice_token(), "/orders", body, configure_api(store, payments, panel)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        error_message(&body),
        "Payment processing failed. Could not reach the payment gateway: connection refused"
    );
}

#[actix_web::test]
async fn renewal_needs_a_server() {
    let _ = env_logger::try_init().ok();
    let (store, payments, panel) = untouched();
    let body = r#"{"planId": 2, "serverName": "Survival", "orderType": "renew"}"#;
    let (status, body) = post_json(&alice_token(), "/orders", body, configure_api(store, payments, panel)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "userServerId is required for renew orders");
}
