use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    OrderPaidEvent,
    ProvisioningFailedEvent,
    ServerProvisionedEvent,
};

/// The sending halves of every subscribed hook. Cheap to clone into each API instance.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_paid_producer: Vec<EventProducer<OrderPaidEvent>>,
    pub server_provisioned_producer: Vec<EventProducer<ServerProvisionedEvent>>,
    pub provisioning_failed_producer: Vec<EventProducer<ProvisioningFailedEvent>>,
}

impl EventProducers {
    pub async fn publish_order_paid(&self, event: OrderPaidEvent) {
        for emitter in &self.order_paid_producer {
            emitter.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_server_provisioned(&self, event: ServerProvisionedEvent) {
        for emitter in &self.server_provisioned_producer {
            emitter.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_provisioning_failed(&self, event: ProvisioningFailedEvent) {
        for emitter in &self.provisioning_failed_producer {
            emitter.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_order_paid: Option<EventHandler<OrderPaidEvent>>,
    pub on_server_provisioned: Option<EventHandler<ServerProvisionedEvent>>,
    pub on_provisioning_failed: Option<EventHandler<ProvisioningFailedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_paid = hooks.on_order_paid.map(|f| EventHandler::new(buffer_size, f));
        let on_server_provisioned = hooks.on_server_provisioned.map(|f| EventHandler::new(buffer_size, f));
        let on_provisioning_failed = hooks.on_provisioning_failed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_paid, on_server_provisioned, on_provisioning_failed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_paid {
            result.order_paid_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_server_provisioned {
            result.server_provisioned_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_provisioning_failed {
            result.provisioning_failed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_order_paid {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_server_provisioned {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_provisioning_failed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

type BoxedHook = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_paid: Option<Handler<OrderPaidEvent>>,
    pub on_server_provisioned: Option<Handler<ServerProvisionedEvent>>,
    pub on_provisioning_failed: Option<Handler<ProvisioningFailedEvent>>,
}

impl EventHooks {
    pub fn on_order_paid<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderPaidEvent) -> BoxedHook) + Send + Sync + 'static {
        self.on_order_paid = Some(Arc::new(f));
        self
    }

    pub fn on_server_provisioned<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ServerProvisionedEvent) -> BoxedHook) + Send + Sync + 'static {
        self.on_server_provisioned = Some(Arc::new(f));
        self
    }

    pub fn on_provisioning_failed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ProvisioningFailedEvent) -> BoxedHook) + Send + Sync + 'static {
        self.on_provisioning_failed = Some(Arc::new(f));
        self
    }
}
