//! Multi-channel notification dispatch.
//!
//! Requests are routed to an email-only or email-plus-SMS plan, rendered from
//! per-type templates and handed to pluggable transports. Email is the
//! authoritative channel; SMS is best-effort.

pub mod api;
pub mod clients;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod routing;
pub mod templates;
pub mod utils;
