//! Mock servers for portal integration testing
//!
//! The mock backend simulates the booking platform's REST API so the portal
//! can be exercised end to end without a real deployment.

#![allow(dead_code)]

pub mod backend;

pub use backend::{MockAppointment, MockBackend, MockDoctor, ADMIN_TOKEN, DOCTOR_ID, DOCTOR_TOKEN};
