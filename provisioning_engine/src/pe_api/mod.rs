//! # Provisioning engine public API
//!
//! * [`order_flow_api`] runs checkout creation, payment capture and server provisioning.
//! * [`order_objects`] holds the request and response types of those flows.
//! * [`errors`] is the error taxonomy callers map onto their own responses.
//!
//! An API instance is created by handing it its collaborators: a storage backend and the two gateways.
//!
//! ```rust,ignore
//! let db = SqliteDatabase::new_with_url(&url, 5).await?;
//! let api = OrderFlowApi::new(db, paypal, panel, producers, settings);
//! let session = api.create_order(&caller, request).await?;
//! ```
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
