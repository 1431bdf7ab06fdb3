use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{
        ActivatedServer,
        BillingCycle,
        Caller,
        NewOrder,
        NewUserServer,
        Order,
        OrderStatusType,
        OrderType,
        ProvisioningConfig,
        ServerStatus,
        UserServer,
    },
    events::{EventProducers, OrderPaidEvent, ProvisioningFailedEvent, ServerProvisionedEvent},
    helpers::{charge_for, generate_password, generate_username},
    pe_api::{
        errors::{OrderFlowError, ProvisioningError},
        order_objects::{CaptureOutcome, CheckoutRequest, CheckoutSession, CheckoutSettings, ServerSummary},
    },
    traits::{
        HostingDatabase,
        InstanceSpec,
        NewPanelAccount,
        PayableOrder,
        PaymentGateway,
        PaymentGatewayError,
        ProvisioningGateway,
    },
};

const PROVISIONED_MESSAGE: &str = "Payment successful! Your server has been created.";
const MANUAL_SETUP_MESSAGE: &str =
    "Payment successful! Your server will be set up by our team shortly. You will receive an email once it is ready.";
const PROVISIONING_FAILED_MESSAGE: &str = "Payment successful, but we could not set up your server automatically. \
                                           Our team has been notified and will complete the setup.";
const UPGRADE_MESSAGE: &str = "Payment successful! Your upgrade will be applied by our team shortly.";
const ALREADY_ACTIVE_MESSAGE: &str = "Payment received. Your server is already active.";
const IN_PROGRESS_MESSAGE: &str = "Payment received. Your server is already being set up.";
const ALREADY_COMPLETE_MESSAGE: &str = "This order has already been completed.";

/// `OrderFlowApi` runs the order-to-server pipeline: checkout creation, payment capture and provisioning.
///
/// It owns the consistency contract between an order, its server record and the server on the panel. Every step
/// that follows a payment can be re-derived from the stored order and server status, so a failed or interrupted
/// capture can be re-run safely.
pub struct OrderFlowApi<B, P, G> {
    db: B,
    payments: P,
    panel: G,
    producers: EventProducers,
    settings: CheckoutSettings,
}

impl<B, P, G> Debug for OrderFlowApi<B, P, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, P, G> OrderFlowApi<B, P, G> {
    pub fn new(db: B, payments: P, panel: G, producers: EventProducers, settings: CheckoutSettings) -> Self {
        Self { db, payments, panel, producers, settings }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }
}

impl<B, P, G> OrderFlowApi<B, P, G>
where
    B: HostingDatabase,
    P: PaymentGateway,
    G: ProvisioningGateway,
{
    /// Starts a checkout.
    ///
    /// The payable order is created at the payment gateway first, and only then is anything stored: the order (as
    /// `pending`) and, for new servers, a `pending` server record for capture to pick up. Nothing is stored if the
    /// gateway call fails.
    ///
    /// If storing the order fails after the gateway order was created, that gateway order is orphaned. A later
    /// capture of it fails with [`OrderFlowError::OrderNotFound`].
    pub async fn create_order(
        &self,
        caller: &Caller,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, OrderFlowError> {
        let plan_id = request.plan_id.ok_or_else(|| OrderFlowError::InvalidInput("planId is required".into()))?;
        let name = request
            .server_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| OrderFlowError::InvalidInput("serverName is required".into()))?
            .to_string();
        let cycle = request.billing_cycle.unwrap_or_default();
        let order_type = request.order_type.unwrap_or_default();
        let existing_server = if order_type.requires_existing_server() {
            let id = request.user_server_id.ok_or_else(|| {
                OrderFlowError::InvalidInput(format!("userServerId is required for {order_type} orders"))
            })?;
            Some(self.owned_server(caller, id).await?.id)
        } else {
            None
        };
        let plan = self
            .db
            .fetch_plan(plan_id)
            .await?
            .filter(|p| p.enabled)
            .ok_or(OrderFlowError::PlanNotFound(plan_id))?;
        let amount = charge_for(plan.price, cycle);
        debug!("🛒️ {} ({}) is checking out {} for {amount}", caller.user_id, order_type, plan.name);
        let payable = PayableOrder {
            amount,
            currency: self.settings.currency.clone(),
            description: format!("{} - {}", plan.name, cycle.label()),
            return_url: self.settings.return_url.clone(),
            cancel_url: self.settings.cancel_url.clone(),
        };
        let created = self.payments.create_payable_order(payable).await.map_err(|e| {
            warn!("🛒️ Could not create a payment gateway order for {}: {e}", caller.user_id);
            e
        })?;
        let new_order = NewOrder {
            user_id: caller.user_id.clone(),
            plan_id,
            order_type,
            amount,
            currency: self.settings.currency.clone(),
            billing_cycle: cycle,
            gateway_order_id: created.gateway_order_id.clone(),
            user_server_id: existing_server,
        };
        let order = self.db.insert_order(new_order).await.map_err(|e| {
            error!(
                "🛒️ Payment gateway order {} was created but could not be saved. It is not linked to any order. {e}",
                created.gateway_order_id
            );
            e
        })?;
        let user_server_id = match order_type {
            OrderType::New => {
                let server = NewUserServer {
                    user_id: caller.user_id.clone(),
                    plan_id,
                    name,
                    panel_email: caller.email.clone(),
                };
                Some(self.db.insert_user_server(server).await?.id)
            },
            OrderType::Renew | OrderType::Upgrade => existing_server,
        };
        info!(
            "🛒️ Order #{} ({}) created for {}. {amount} awaiting approval",
            order.id, order.gateway_order_id, caller.user_id
        );
        Ok(CheckoutSession {
            gateway_order_id: created.gateway_order_id,
            approve_url: created.approve_url,
            order_id: order.id,
            amount,
            user_server_id,
        })
    }

    /// Captures the payment for a checkout and fulfils the order.
    ///
    /// The order is looked up for this caller before the gateway is contacted, so another customer's order id yields
    /// [`OrderFlowError::OrderNotFound`] and no capture. A capture the gateway does not complete fails with
    /// [`OrderFlowError::PaymentNotCompleted`] and changes nothing.
    ///
    /// Once the order is `paid`, the result is always `Ok`: provisioning problems are reported in
    /// [`CaptureOutcome::error`]. Calling this again for an order that is already `paid` skips the gateway and resumes
    /// from the server step.
    pub async fn capture_order(
        &self,
        caller: &Caller,
        gateway_order_id: &str,
    ) -> Result<CaptureOutcome, OrderFlowError> {
        let gateway_order_id = gateway_order_id.trim();
        if gateway_order_id.is_empty() {
            return Err(OrderFlowError::InvalidInput("paypalOrderId is required".into()));
        }
        let order = self.db.fetch_order_for_user(gateway_order_id, &caller.user_id).await?.ok_or_else(|| {
            warn!("💳️ {} tried to capture {gateway_order_id}, which is not one of their orders", caller.user_id);
            OrderFlowError::OrderNotFound(gateway_order_id.to_string())
        })?;
        let order = match order.status {
            OrderStatusType::Pending => self.settle_payment(order).await?,
            OrderStatusType::Paid => {
                info!("💳️ Order #{} is already paid. Resuming fulfilment", order.id);
                order
            },
            OrderStatusType::Active => return self.completed_order_outcome(caller, &order).await,
            status => {
                return Err(OrderFlowError::InvalidState(format!("Order #{} is {status} and cannot be captured", order.id)))
            },
        };
        let order_id = order.id;
        let fulfilled = match (order.status, order.order_type) {
            (OrderStatusType::Active, _) => self.completed_order_outcome(caller, &order).await,
            (_, OrderType::New) => self.fulfil_new_server(caller, order).await,
            (_, OrderType::Renew) => self.fulfil_renewal(caller, order).await,
            (_, OrderType::Upgrade) => self.fulfil_upgrade(caller, order).await,
        };
        fulfilled.map_err(|e| fulfilment_error(order_id, e))
    }

    /// Re-runs provisioning for a paid server that is waiting in `pending`. This is the operator's retry path.
    pub async fn retry_provisioning(&self, user_server_id: i64) -> Result<CaptureOutcome, OrderFlowError> {
        let server =
            self.db.fetch_user_server(user_server_id).await?.ok_or(OrderFlowError::UserServerNotFound(user_server_id))?;
        if server.status != ServerStatus::Pending {
            return Err(OrderFlowError::InvalidState(format!(
                "Server {user_server_id} is {}. Only pending servers can be provisioned",
                server.status
            )));
        }
        let order = self
            .db
            .fetch_latest_order_for_server(user_server_id)
            .await?
            .filter(|o| o.order_type == OrderType::New && o.status == OrderStatusType::Paid)
            .ok_or_else(|| {
                OrderFlowError::InvalidState(format!("Server {user_server_id} has no paid order awaiting provisioning"))
            })?;
        info!("🖥️ Retrying provisioning of server {user_server_id} for order #{}", order.id);
        self.provision_and_report(order, server).await
    }

    /// The caller's servers, newest first.
    pub async fn servers_for_user(&self, caller: &Caller) -> Result<Vec<ServerSummary>, OrderFlowError> {
        let servers = self.db.fetch_servers_for_user(&caller.user_id).await?;
        let summaries = servers
            .into_iter()
            .map(|server| {
                let panel_url = server.panel_server_identifier.as_deref().map(|id| self.panel.server_url(id));
                ServerSummary { server, panel_url }
            })
            .collect();
        Ok(summaries)
    }

    /// Captures the funds and marks the order paid. The returned order may have been settled by a concurrent capture,
    /// in which case it is returned in whatever state that capture left it.
    async fn settle_payment(&self, order: Order) -> Result<Order, OrderFlowError> {
        let gateway_order_id = order.gateway_order_id.as_str();
        let receipt = match self.payments.capture_order(gateway_order_id).await {
            Ok(receipt) => receipt,
            Err(PaymentGatewayError::AlreadyCaptured(_)) => {
                info!("💳️ {gateway_order_id} was captured by an earlier call. Fetching its current state");
                self.payments.fetch_capture(gateway_order_id).await?
            },
            Err(e) => return Err(e.into()),
        };
        if !receipt.completed {
            warn!("💳️ Capture of {gateway_order_id} was not completed. Status: {}", receipt.status);
            return Err(OrderFlowError::PaymentNotCompleted {
                gateway_order_id: order.gateway_order_id,
                status: receipt.status,
            });
        }
        let paid = match self.db.mark_order_paid(order.id, receipt.capture_id).await {
            Ok(Some(paid)) => paid,
            Ok(None) => {
                info!("💳️ Order #{} was settled by a concurrent capture", order.id);
                let order_id = order.id;
                return match self.db.fetch_order(order_id).await {
                    Ok(Some(current)) => Ok(current),
                    Ok(None) => Err(OrderFlowError::OrderNotFound(order.gateway_order_id)),
                    Err(e) => Err(fulfilment_error(order_id, e.into())),
                };
            },
            Err(e) => {
                error!("💳️ {gateway_order_id} was captured, but order #{} could not be marked paid. {e}", order.id);
                return Err(fulfilment_error(order.id, e.into()));
            },
        };
        info!("💳️ Order #{} is paid. {} {} captured", paid.id, paid.amount, paid.currency);
        self.producers.publish_order_paid(OrderPaidEvent::new(paid.clone())).await;
        Ok(paid)
    }

    async fn fulfil_new_server(&self, caller: &Caller, order: Order) -> Result<CaptureOutcome, OrderFlowError> {
        let server = match order.user_server_id {
            Some(id) => self.owned_server(caller, id).await?,
            None => self.db.fetch_latest_pending_server(&caller.user_id, order.plan_id).await?.ok_or_else(|| {
                error!(
                    "🛒️ Order #{} is paid, but there is no pending server record for {} on plan {}. Checkout should \
                     have created one",
                    order.id, caller.user_id, order.plan_id
                );
                OrderFlowError::ServerRecordNotFound { user_id: caller.user_id.clone(), plan_id: order.plan_id }
            })?,
        };
        let order = match order.user_server_id {
            Some(id) if id == server.id => order,
            _ => match self.db.link_order_to_server(order.id, server.id).await {
                Ok(order) => order,
                Err(e) => {
                    warn!("🛒️ Order #{} could not be linked to server {}. {e}", order.id, server.id);
                    return Ok(CaptureOutcome::paid(server.id, PROVISIONING_FAILED_MESSAGE).with_error(e.to_string()));
                },
            },
        };
        self.provision_and_report(order, server).await
    }

    async fn fulfil_renewal(&self, caller: &Caller, order: Order) -> Result<CaptureOutcome, OrderFlowError> {
        let server = self.linked_server(caller, &order).await?;
        let now = Utc::now();
        let start = server.expires_at.filter(|t| *t > now).unwrap_or(now);
        let expires_at = order.billing_cycle.expiry_from(start);
        let server = self.db.extend_server_expiry(server.id, expires_at).await?;
        if let Err(e) = self.db.update_order_status(order.id, OrderStatusType::Active).await {
            error!("🛒️ Server {} was renewed, but order #{} could not be marked active. {e}", server.id, order.id);
        }
        info!("🛒️ Server {} renewed until {expires_at}", server.id);
        let message = format!("Payment successful! Your server has been renewed until {}.", expires_at.format("%Y-%m-%d"));
        Ok(self.server_outcome(&server, &message))
    }

    async fn fulfil_upgrade(&self, caller: &Caller, order: Order) -> Result<CaptureOutcome, OrderFlowError> {
        let server = self.linked_server(caller, &order).await?;
        info!("🛒️ Upgrade order #{} for server {} is paid and waiting to be applied", order.id, server.id);
        Ok(self.server_outcome(&server, UPGRADE_MESSAGE))
    }

    async fn completed_order_outcome(&self, caller: &Caller, order: &Order) -> Result<CaptureOutcome, OrderFlowError> {
        let server_id = order.user_server_id.ok_or_else(|| {
            OrderFlowError::InvalidState(format!("Order #{} is active but not linked to a server", order.id))
        })?;
        let server = self.owned_server(caller, server_id).await?;
        Ok(self.server_outcome(&server, ALREADY_COMPLETE_MESSAGE))
    }

    /// Steps shared by capture and retry: claim the server, look up its build parameters, provision it and record
    /// the result. The order is already paid, so every failure here is reported in the outcome, never as `Err`.
    async fn provision_and_report(&self, order: Order, server: UserServer) -> Result<CaptureOutcome, OrderFlowError> {
        let server_id = server.id;
        match self.db.start_provisioning(server_id).await {
            Ok(true) => {},
            Ok(false) => {
                let current = match self.db.fetch_user_server(server_id).await {
                    Ok(current) => current.unwrap_or(server),
                    Err(e) => {
                        warn!("🖥️ Could not re-read server {server_id}. {e}");
                        server
                    },
                };
                debug!("🖥️ Server {} is {}. Not provisioning it again", current.id, current.status);
                return Ok(match current.status {
                    ServerStatus::Active => self.server_outcome(&current, ALREADY_ACTIVE_MESSAGE),
                    _ => CaptureOutcome::paid(current.id, IN_PROGRESS_MESSAGE),
                });
            },
            Err(e) => {
                warn!("🖥️ Could not claim server {server_id} for provisioning. {e}");
                return Ok(CaptureOutcome::paid(server_id, PROVISIONING_FAILED_MESSAGE).with_error(e.to_string()));
            },
        }
        let config = match self.db.fetch_provisioning_config(server.plan_id).await {
            Ok(Some(config)) => config,
            Ok(None) => {
                warn!(
                    "🖥️ Plan {} has no provisioning config. Server {server_id} for order #{} must be set up by hand",
                    server.plan_id, order.id
                );
                self.revert_to_pending(server_id).await;
                return Ok(CaptureOutcome::paid(server_id, MANUAL_SETUP_MESSAGE));
            },
            Err(e) => {
                warn!("🖥️ Could not load the provisioning config for plan {}. {e}", server.plan_id);
                self.revert_to_pending(server_id).await;
                return Ok(CaptureOutcome::paid(server_id, PROVISIONING_FAILED_MESSAGE).with_error(e.to_string()));
            },
        };
        match self.provision(&server, &config, order.billing_cycle).await {
            Ok((server, password)) => {
                if let Err(e) = self.db.update_order_status(order.id, OrderStatusType::Active).await {
                    error!("🛒️ Server {} is active, but order #{} could not be marked active. {e}", server.id, order.id);
                }
                info!(
                    "🖥️ Server {} is live as {} for {}",
                    server.id,
                    server.panel_server_identifier.as_deref().unwrap_or_default(),
                    server.user_id
                );
                let mut outcome = self.server_outcome(&server, PROVISIONED_MESSAGE);
                outcome.panel_password = password;
                self.producers.publish_server_provisioned(ServerProvisionedEvent::new(server, order)).await;
                Ok(outcome)
            },
            Err(e) => {
                warn!("🖥️ Provisioning server {} for order #{} failed. {e}", server.id, order.id);
                self.revert_to_pending(server.id).await;
                let reason = e.to_string();
                let event = ProvisioningFailedEvent::new(server.clone(), order, reason.clone());
                self.producers.publish_provisioning_failed(event).await;
                Ok(CaptureOutcome::paid(server.id, PROVISIONING_FAILED_MESSAGE).with_error(reason))
            },
        }
    }

    /// Creates the panel account (unless one already exists for the email), picks an allocation, creates the server
    /// and records it. Returns the activated record and, for new accounts only, the generated password.
    async fn provision(
        &self,
        server: &UserServer,
        config: &ProvisioningConfig,
        cycle: BillingCycle,
    ) -> Result<(UserServer, Option<String>), ProvisioningError> {
        let email = server.panel_email.as_str();
        let (account, password) = match self.panel.find_account_by_email(email).await? {
            Some(account) => {
                debug!("🖥️ Reusing panel account #{} ({}) for {email}", account.id, account.username);
                (account, None)
            },
            None => {
                let password = generate_password();
                let first_name = email.split('@').next().filter(|s| !s.is_empty()).unwrap_or("Customer");
                let new_account = NewPanelAccount {
                    email: email.to_string(),
                    username: generate_username(email),
                    first_name: first_name.to_string(),
                    last_name: "Customer".to_string(),
                    password: password.clone(),
                };
                let account = self.panel.create_account(new_account).await?;
                debug!("🖥️ Created panel account #{} ({}) for {email}", account.id, account.username);
                (account, Some(password))
            },
        };
        let allocation = self
            .panel
            .find_free_allocation(config.node_id)
            .await?
            .ok_or(ProvisioningError::NoAvailableAllocation(config.node_id))?;
        debug!("🖥️ Using allocation #{} ({}) for server {}", allocation.id, allocation.address, server.id);
        let spec = InstanceSpec {
            name: server.name.clone(),
            panel_user_id: account.id,
            allocation_id: allocation.id,
            config: config.clone(),
        };
        let instance = self.panel.create_instance(spec).await?;
        let activation = ActivatedServer {
            panel_user_id: account.id,
            panel_username: account.username,
            panel_server_id: instance.id,
            panel_server_identifier: instance.identifier.clone(),
            expires_at: cycle.expiry_from(Utc::now()),
        };
        let server = self.db.activate_server(server.id, activation).await.map_err(|e| {
            error!(
                "🖥️ Panel server {} was created for server {}, but could not be recorded. Reconcile it by hand. {e}",
                instance.identifier, server.id
            );
            e
        })?;
        Ok((server, password))
    }

    async fn revert_to_pending(&self, server_id: i64) {
        if let Err(e) = self.db.update_server_status(server_id, ServerStatus::Pending).await {
            error!("🖥️ Server {server_id} could not be returned to pending and is stuck in provisioning. {e}");
        }
    }

    async fn owned_server(&self, caller: &Caller, id: i64) -> Result<UserServer, OrderFlowError> {
        self.db
            .fetch_user_server(id)
            .await?
            .filter(|s| s.user_id == caller.user_id)
            .ok_or(OrderFlowError::UserServerNotFound(id))
    }

    async fn linked_server(&self, caller: &Caller, order: &Order) -> Result<UserServer, OrderFlowError> {
        let id = order.user_server_id.ok_or_else(|| {
            OrderFlowError::InvalidState(format!("{} order #{} is not linked to a server", order.order_type, order.id))
        })?;
        self.owned_server(caller, id).await
    }

    fn server_outcome(&self, server: &UserServer, message: &str) -> CaptureOutcome {
        let identifier = server.panel_server_identifier.clone();
        CaptureOutcome {
            success: true,
            message: message.to_string(),
            user_server_id: server.id,
            panel_url: identifier.as_deref().map(|id| self.panel.server_url(id)),
            server_id: identifier,
            panel_username: server.panel_username.clone(),
            panel_password: None,
            error: None,
        }
    }
}

/// Once an order is paid, a failure must still tell the customer that they were charged. A missing server record
/// keeps its own error since it points at a defect in checkout.
fn fulfilment_error(order_id: i64, e: OrderFlowError) -> OrderFlowError {
    match e {
        OrderFlowError::ServerRecordNotFound { .. } | OrderFlowError::FulfilmentIncomplete { .. } => e,
        e => {
            error!("🛒️ Order #{order_id} is paid but could not be fulfilled. {e}");
            OrderFlowError::FulfilmentIncomplete { order_id, reason: e.to_string() }
        },
    }
}
