use actix_web::{
    body::{to_bytes, MessageBody},
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
    HttpResponse,
};
use chrono::{Duration, Utc};
use hosting_common::Money;
use log::debug;
use provisioning_engine::{
    db_types::{BillingCycle, Order, OrderStatusType, OrderType, Plan, ServerStatus, UserServer},
    events::EventProducers,
    order_objects::CheckoutSettings,
    OrderFlowApi,
};

use super::mocks::{MockPanel, MockPayments, MockStore};
use crate::{
    auth::{JwtClaims, Role, TokenIssuer},
    config::AuthConfig,
    routes::{CaptureOrderRoute, CreateOrderRoute, MyServersRoute, RetryProvisioningRoute},
    server::{json_config, path_config},
};

pub const ALICE: &str = "cust-alice";
pub const ALICE_EMAIL: &str = "alice@example.com";

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("4c2b7f0e9a1d48f3b6e5c8a7d2f1e0b9")
}

pub fn issue_token(claims: JwtClaims) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(&claims).expect("Failed to sign token")
}

pub fn token_for(user: &str, email: &str, roles: Vec<Role>) -> String {
    issue_token(JwtClaims::new(user, email, roles, Utc::now() + Duration::days(1)))
}

pub fn alice_token() -> String {
    token_for(ALICE, ALICE_EMAIL, vec![Role::User])
}

/// Mounts every API route over the given mocks, the way `create_server_instance` does for the real backends.
pub fn configure_api(store: MockStore, payments: MockPayments, mut panel: MockPanel) -> impl FnOnce(&mut ServiceConfig) {
    panel.expect_server_url().returning(|id| format!("https://panel.example.com/server/{id}"));
    move |cfg: &mut ServiceConfig| {
        let api = OrderFlowApi::new(store, payments, panel, EventProducers::default(), CheckoutSettings::default());
        cfg.app_data(web::Data::new(api))
            .service(CreateOrderRoute::<MockStore, MockPayments, MockPanel>::new())
            .service(CaptureOrderRoute::<MockStore, MockPayments, MockPanel>::new())
            .service(MyServersRoute::<MockStore, MockPayments, MockPanel>::new())
            .service(RetryProvisioningRoute::<MockStore, MockPayments, MockPanel>::new());
    }
}

/// Sends the request and returns the status and body, whether the request was answered by a handler or rejected by
/// middleware.
pub async fn send_request(
    auth_token: &str,
    req: TestRequest,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = req;
    if !auth_token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_token}")));
    }
    let app = App::new()
        .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())))
        .app_data(json_config())
        .app_data(path_config())
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => status_and_body(res.into_parts().1).await,
        Err(e) => status_and_body(e.error_response()).await,
    }
}

pub async fn post_json(
    auth_token: &str,
    path: &str,
    body: &str,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    let req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json")).set_payload(body.to_string());
    send_request(auth_token, req, configure).await
}

pub async fn get_request(auth_token: &str, path: &str, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    send_request(auth_token, TestRequest::get().uri(path), configure).await
}

async fn status_and_body<B: MessageBody>(res: HttpResponse<B>) -> (StatusCode, String) {
    let status = res.status();
    let body = match to_bytes(res.into_body()).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => "<unreadable body>".to_string(),
    };
    (status, body)
}

pub fn error_message(body: &str) -> String {
    let json: serde_json::Value = serde_json::from_str(body).expect("Error body is not JSON");
    json["error"].as_str().expect("Error body has no error field").to_string()
}

//----------------------------------------------   Fixtures  ----------------------------------------------------

pub fn plan(id: i64, name: &str, cents: i64) -> Plan {
    let now = Utc::now();
    Plan {
        id,
        name: name.to_string(),
        category: "minecraft".into(),
        price: Money::from_cents(cents),
        billing_cycle: BillingCycle::Month,
        ram: "8 GB".into(),
        cpu: "3 vCores".into(),
        storage: "40 GB".into(),
        bandwidth: "Unmetered".into(),
        enabled: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn order(id: i64, gateway_order_id: &str, status: OrderStatusType, user_server_id: Option<i64>) -> Order {
    let now = Utc::now();
    Order {
        id,
        user_id: ALICE.into(),
        plan_id: 2,
        order_type: OrderType::New,
        amount: Money::from_cents(19190),
        currency: "USD".into(),
        billing_cycle: BillingCycle::Year,
        gateway_order_id: gateway_order_id.into(),
        capture_id: None,
        status,
        user_server_id,
        created_at: now,
        updated_at: now,
    }
}

pub fn server(id: i64, status: ServerStatus) -> UserServer {
    let now = Utc::now();
    UserServer {
        id,
        user_id: ALICE.into(),
        plan_id: 2,
        name: "Survival".into(),
        panel_email: ALICE_EMAIL.into(),
        panel_username: None,
        panel_user_id: None,
        panel_server_id: None,
        panel_server_identifier: None,
        status,
        expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn active_server(id: i64, identifier: &str) -> UserServer {
    let mut server = server(id, ServerStatus::Active);
    server.panel_username = Some("alice4821".into());
    server.panel_user_id = Some(14);
    server.panel_server_id = Some(52);
    server.panel_server_identifier = Some(identifier.into());
    server.expires_at = Some(Utc::now() + Duration::days(365));
    server
}
