//! Clinic Portal - role-scoped data access for the admin/doctor portal
//!
//! This library provides:
//! - Per-role session stores with durable token storage
//! - A resource client for the booking backend's `{success, message, ...}` API
//! - A per-role data cache reconciled after every mutation
//! - Headless view models for dashboards, lists, the profile editor and the
//!   add-doctor form

pub mod bus;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod portal;
pub mod role;
pub mod session;
pub mod views;

pub use error::{PortalError, PortalResult};
pub use portal::RolePortal;
pub use role::Role;
