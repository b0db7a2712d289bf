//! HTTP API for the profile service

pub mod handlers;
pub mod routes;

pub use routes::create_router;
