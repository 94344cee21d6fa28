//! Acting role and its per-role configuration
//!
//! Admin and Doctor share one view set; everything that differs between
//! them (credential header, storage key, menu, allowed operations) hangs
//! off [`Role`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::client::Operation;

/// Authentication scope of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
}

/// Sidebar entry for a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub route: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

const ADMIN_MENU: &[MenuEntry] = &[
    MenuEntry {
        route: "/admin-dashboard",
        label: "Dashboard",
        description: "Overview & Analytics",
    },
    MenuEntry {
        route: "/all-appointments",
        label: "Appointments",
        description: "Manage Bookings",
    },
    MenuEntry {
        route: "/add-doctor",
        label: "Add Doctor",
        description: "Register New Doctor",
    },
    MenuEntry {
        route: "/doctor-list",
        label: "Doctors List",
        description: "View All Doctors",
    },
    MenuEntry {
        route: "/users-list",
        label: "Users",
        description: "Registered Patients",
    },
];

const DOCTOR_MENU: &[MenuEntry] = &[
    MenuEntry {
        route: "/doctor-dashboard",
        label: "Dashboard",
        description: "My Overview",
    },
    MenuEntry {
        route: "/doctor-appointments",
        label: "Appointments",
        description: "My Schedule",
    },
    MenuEntry {
        route: "/doctor-profile",
        label: "Profile",
        description: "My Information",
    },
];

const ADMIN_OPERATIONS: &[Operation] = &[
    Operation::FetchAppointments,
    Operation::FetchDashboard,
    Operation::CancelAppointment,
    Operation::FetchDoctors,
    Operation::AddDoctor,
    Operation::ToggleDoctorAvailability,
    Operation::FetchUsers,
];

const DOCTOR_OPERATIONS: &[Operation] = &[
    Operation::FetchAppointments,
    Operation::FetchDashboard,
    Operation::FetchProfile,
    Operation::UpdateProfile,
    Operation::CancelAppointment,
    Operation::AcceptAppointment,
    Operation::CompleteAppointment,
];

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Doctor];

    /// Request header carrying the role's token (not a bearer scheme)
    pub fn header_name(self) -> &'static str {
        match self {
            Role::Admin => "aToken",
            Role::Doctor => "dToken",
        }
    }

    /// Durable storage key for the role's token
    pub fn storage_key(self) -> &'static str {
        self.header_name()
    }

    /// Backend path segment (`/api/<segment>/...`)
    pub fn path_segment(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
        }
    }

    pub fn panel_title(self) -> &'static str {
        match self {
            Role::Admin => "Admin Panel",
            Role::Doctor => "Medical System",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Doctor => "Doctor",
        }
    }

    pub fn menu(self) -> &'static [MenuEntry] {
        match self {
            Role::Admin => ADMIN_MENU,
            Role::Doctor => DOCTOR_MENU,
        }
    }

    pub fn operations(self) -> &'static [Operation] {
        match self {
            Role::Admin => ADMIN_OPERATIONS,
            Role::Doctor => DOCTOR_OPERATIONS,
        }
    }

    pub fn allows(self, op: Operation) -> bool {
        self.operations().contains(&op)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
