//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own database access and outbound calls so route handlers
//! can stay focused on request parsing and status mapping.

pub mod assessment;
pub mod chat;
pub mod ident;
pub mod poller;
pub mod remarks;
pub mod results;
pub mod webhook;
