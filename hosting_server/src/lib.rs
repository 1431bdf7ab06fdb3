//! # Hosting server
//! The HTTP front end of the game server hosting store. It is responsible for:
//! * Creating PayPal checkouts for hosting plans.
//! * Capturing approved payments and provisioning the purchased servers on the game panel.
//! * Showing customers their servers.
//!
//! The order-to-server pipeline itself lives in the `provisioning_engine` crate. This crate supplies the PayPal and
//! panel adapters, authentication, and the routes.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `GET /health`: Returns 200 OK.
//! * `POST /api/orders`: Starts a checkout.
//! * `POST /api/orders/capture`: Captures an approved payment and provisions the server.
//! * `GET /api/servers`: The caller's servers.
//! * `POST /api/admin/servers/{id}/provision`: Retries provisioning of a paid server. Admin only.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
