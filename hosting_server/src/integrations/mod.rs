//! Adapters from the external service clients to the provisioning engine's gateway traits, plus the event hooks the
//! server installs.
pub mod events;
pub mod panel;
pub mod paypal;

pub use panel::PanelGateway;
pub use paypal::PaypalGateway;
