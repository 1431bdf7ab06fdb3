//! Typed access to the game panel's Application API.
//!
//! Responses arrive wrapped in `{"object": ..., "attributes": ...}` envelopes. They are unwrapped here so callers
//! only ever see the plain resource structs in [`data_objects`].
mod api;
mod config;
pub mod data_objects;
mod error;

pub use api::PanelApi;
pub use config::PanelConfig;
pub use data_objects::{
    Account,
    Allocation,
    Egg,
    EggVariable,
    FeatureLimits,
    Limits,
    Nest,
    NewAccount,
    NewServer,
    Node,
    Server,
};
pub use error::PanelApiError;
