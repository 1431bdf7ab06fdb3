use std::time::Duration;

use chrono::{Months, Utc};
use cucumber::{then, when};
use provisioning_engine::{
    db_types::{BillingCycle, OrderStatusType, OrderType, ServerStatus},
    order_objects::CheckoutRequest,
    traits::OrderManagement,
};

use crate::cucumber::HostingWorld;

//----------------------------------------------   Checkout  ----------------------------------------------------

#[when(expr = "customer {string} checks out plan {string} as {string} billed {word}")]
async fn checkout(world: &mut HostingWorld, customer: String, plan: String, server_name: String, cycle: String) {
    let cycle = cycle.parse::<BillingCycle>().expect("Invalid billing cycle");
    let request = CheckoutRequest::new(world.plan_id(&plan), &server_name).with_billing_cycle(cycle);
    submit_checkout(world, &customer, request).await;
}

#[when(expr = "customer {string} renews their server on plan {string} billed {word}")]
async fn renew(world: &mut HostingWorld, customer: String, plan: String, cycle: String) {
    let cycle = cycle.parse::<BillingCycle>().expect("Invalid billing cycle");
    let server = world.server_of(&customer).await;
    world.remembered_expiry = server.expires_at;
    let request = CheckoutRequest::new(world.plan_id(&plan), &server.name)
        .with_billing_cycle(cycle)
        .with_order_type(OrderType::Renew, Some(server.id));
    submit_checkout(world, &customer, request).await;
}

async fn submit_checkout(world: &mut HostingWorld, customer: &str, request: CheckoutRequest) {
    let caller = world.customer(customer);
    match world.api().create_order(&caller, request).await {
        Ok(session) => {
            world.sessions.insert(customer.to_string(), session);
            world.last_checkout_error = None;
        },
        Err(e) => world.last_checkout_error = Some(e),
    }
}

#[then(expr = "the checkout amount is {word}")]
async fn checkout_amount(world: &mut HostingWorld, amount: String) {
    assert!(world.last_checkout_error.is_none(), "Checkout failed: {:?}", world.last_checkout_error);
    let session = world.sessions.values().max_by_key(|s| s.order_id).expect("No checkout");
    assert_eq!(session.amount.to_string(), amount);
}

#[then(expr = "the payment gateway was asked for {word} with description {string}")]
async fn gateway_request(world: &mut HostingWorld, amount: String, description: String) {
    let created = world.system().payments.created_orders();
    let (_, order) = created.last().expect("No gateway orders were created");
    assert_eq!(order.amount.to_string(), amount);
    assert_eq!(order.description, description);
    assert_eq!(order.currency, "USD");
}

#[then(expr = "the payment gateway received {int} order(s)")]
async fn gateway_order_count(world: &mut HostingWorld, count: usize) {
    assert_eq!(world.system().payments.created_orders().len(), count);
}

#[then(expr = "the checkout fails with {string}")]
async fn checkout_fails(world: &mut HostingWorld, message: String) {
    let err = world.last_checkout_error.as_ref().expect("The checkout succeeded");
    assert!(err.to_string().contains(&message), "Unexpected error: {err}");
}

//----------------------------------------------   Capture  ----------------------------------------------------

#[when(expr = "customer {string} captures their order")]
async fn capture_own(world: &mut HostingWorld, customer: String) {
    capture(world, &customer, &customer).await;
}

#[when(expr = "customer {string} captures the order of customer {string}")]
async fn capture_other(world: &mut HostingWorld, customer: String, owner: String) {
    capture(world, &customer, &owner).await;
}

async fn capture(world: &mut HostingWorld, customer: &str, owner: &str) {
    let gateway_order_id = world.session(owner).gateway_order_id.clone();
    let caller = world.customer(customer);
    let outcome = world.api().capture_order(&caller, &gateway_order_id).await;
    world.last_outcome = Some(outcome);
}

#[when(expr = "an operator retries provisioning of the server of customer {string}")]
async fn operator_retry(world: &mut HostingWorld, customer: String) {
    let server = world.server_of(&customer).await;
    let outcome = world.api().retry_provisioning(server.id).await;
    world.last_outcome = Some(outcome);
}

#[when(expr = "I pause for {int}ms")]
async fn pause(_world: &mut HostingWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[then("the capture succeeds")]
async fn capture_succeeds(world: &mut HostingWorld) {
    let outcome = world.outcome();
    assert!(outcome.success);
    assert!(outcome.error.is_none(), "Provisioning failed: {:?}", outcome.error);
}

#[then("the capture succeeds but provisioning failed")]
async fn capture_succeeds_with_error(world: &mut HostingWorld) {
    let outcome = world.outcome();
    assert!(outcome.success);
    assert!(outcome.error.is_some(), "Provisioning did not fail");
}

#[then(expr = "the capture fails with {string}")]
async fn capture_fails(world: &mut HostingWorld, message: String) {
    match world.last_outcome.as_ref().expect("Nothing has been captured") {
        Ok(outcome) => panic!("The capture succeeded: {outcome:?}"),
        Err(e) => assert!(e.to_string().contains(&message), "Unexpected error: {e}"),
    }
}

#[then(expr = "the capture message contains {string}")]
async fn capture_message(world: &mut HostingWorld, message: String) {
    let outcome = world.outcome();
    assert!(outcome.message.contains(&message), "Unexpected message: {}", outcome.message);
}

#[then(expr = "the capture reports the error {string}")]
async fn capture_error(world: &mut HostingWorld, error: String) {
    assert_eq!(world.outcome().error.as_deref(), Some(error.as_str()));
}

#[then(expr = "the capture reports panel username {string}")]
async fn capture_username(world: &mut HostingWorld, username: String) {
    assert_eq!(world.outcome().panel_username.as_deref(), Some(username.as_str()));
}

#[then("the capture reports a panel password")]
async fn capture_password(world: &mut HostingWorld) {
    let password = world.outcome().panel_password.as_ref().expect("No password was returned");
    assert_eq!(password.len(), 16);
}

#[then("the capture reports no panel password")]
async fn capture_no_password(world: &mut HostingWorld) {
    assert!(world.outcome().panel_password.is_none());
}

#[then("the capture reports the panel link")]
async fn capture_panel_link(world: &mut HostingWorld) {
    let outcome = world.outcome();
    let identifier = outcome.server_id.as_deref().expect("No server id");
    let expected = format!("https://panel.example.com/server/{identifier}");
    assert_eq!(outcome.panel_url.as_deref(), Some(expected.as_str()));
}

#[then(expr = "the payment gateway captured {int} order(s)")]
async fn gateway_capture_count(world: &mut HostingWorld, count: usize) {
    assert_eq!(world.system().payments.captured_orders().len(), count);
}

#[then(expr = "the payment gateway refused {int} repeated capture(s)")]
async fn gateway_repeat_count(world: &mut HostingWorld, count: usize) {
    assert_eq!(world.system().payments.repeated_captures(), count);
}

//----------------------------------------------   State  ----------------------------------------------------

#[then(expr = "marking the order of customer {string} paid again changes nothing")]
async fn mark_paid_again(world: &mut HostingWorld, customer: String) {
    let gateway_order_id = world.session(&customer).gateway_order_id.clone();
    let db = &world.system().db;
    let order = db
        .fetch_order_by_gateway_id(&gateway_order_id)
        .await
        .expect("Error fetching order")
        .expect("Order does not exist");
    let again = db.mark_order_paid(order.id, Some("CAP-LATE".into())).await.expect("Error marking order paid");
    assert!(again.is_none(), "{again:?}");
    let current = db.fetch_order(order.id).await.expect("Error fetching order").expect("Order does not exist");
    assert_eq!(current.status, order.status);
    assert_eq!(current.capture_id, order.capture_id);
}

#[then(expr = "customer {string} has {int} server(s) with status {word}")]
async fn server_count(world: &mut HostingWorld, customer: String, count: usize, status: String) {
    let status = status.parse::<ServerStatus>().expect("Invalid server status");
    let servers = world.servers_of(&customer).await;
    assert_eq!(servers.len(), count, "{servers:?}");
    assert!(servers.iter().all(|s| s.status == status), "{servers:?}");
}

#[then(expr = "the order of customer {string} is {word}")]
async fn order_status(world: &mut HostingWorld, customer: String, status: String) {
    let status = status.parse::<OrderStatusType>().expect("Invalid order status");
    let gateway_order_id = world.session(&customer).gateway_order_id.clone();
    let order = world
        .system()
        .db
        .fetch_order_by_gateway_id(&gateway_order_id)
        .await
        .expect("Error fetching order")
        .expect("Order does not exist");
    assert_eq!(order.status, status);
}

#[then(expr = "the server of customer {string} expires {int} month(s) from now")]
async fn expires_in(world: &mut HostingWorld, customer: String, months: u32) {
    let server = world.server_of(&customer).await;
    let expires_at = server.expires_at.expect("The server has no expiry");
    let expected = Utc::now().checked_add_months(Months::new(months)).expect("Date out of range");
    let drift = (expected - expires_at).num_seconds().abs();
    assert!(drift < 60, "Expected expiry near {expected}, but it is {expires_at}");
}

#[then(expr = "the server of customer {string} was extended by {int} month(s)")]
async fn extended_by(world: &mut HostingWorld, customer: String, months: u32) {
    let previous = world.remembered_expiry.expect("No expiry was recorded before the renewal");
    let server = world.server_of(&customer).await;
    let expected = previous.checked_add_months(Months::new(months)).expect("Date out of range");
    assert_eq!(server.expires_at, Some(expected));
}

#[then(expr = "the panel created {int} account(s)")]
async fn accounts_created(world: &mut HostingWorld, count: usize) {
    assert_eq!(world.system().panel.accounts_created(), count);
}

#[then(expr = "the panel created {int} server(s)")]
async fn instances_created(world: &mut HostingWorld, count: usize) {
    assert_eq!(world.system().panel.instances().len(), count);
}

#[then(expr = "an event containing {string} was published")]
async fn event_published(world: &mut HostingWorld, text: String) {
    let events = world.system().events();
    assert!(events.iter().any(|e| e.contains(&text)), "Events: {events:?}");
}
