use std::{future::Future, pin::Pin};

use log::*;
use provisioning_engine::events::{EventHooks, OrderPaidEvent, ProvisioningFailedEvent, ServerProvisionedEvent};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Hooks that write every engine event to the operator log. A failed provisioning is logged as an error, since a
/// customer has paid for a server that someone now has to set up.
pub fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_paid(|ev: OrderPaidEvent| -> HookFuture {
            Box::pin(async move {
                let order = ev.order;
                info!(
                    "📬️ Order #{} ({}) paid: {} {} for plan {} by {}",
                    order.id, order.order_type, order.amount, order.currency, order.plan_id, order.user_id
                );
            })
        })
        .on_server_provisioned(|ev: ServerProvisionedEvent| -> HookFuture {
            Box::pin(async move {
                let server = ev.server;
                info!(
                    "📬️ Server #{} '{}' is live on the panel as {} for {}",
                    server.id,
                    server.name,
                    server.panel_server_identifier.as_deref().unwrap_or("?"),
                    server.user_id
                );
            })
        })
        .on_provisioning_failed(|ev: ProvisioningFailedEvent| -> HookFuture {
            Box::pin(async move {
                error!(
                    "📬️ Server #{} for paid order #{} needs manual setup. Retry with POST /api/admin/servers/{}/provision \
                     once the cause is fixed. {}",
                    ev.server.id, ev.order.id, ev.server.id, ev.reason
                );
            })
        });
    hooks
}
