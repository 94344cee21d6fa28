//! Logical operations and their fixed backend routes

use std::fmt;

use crate::role::Role;

/// HTTP method used by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One logical backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchAppointments,
    FetchDashboard,
    FetchProfile,
    UpdateProfile,
    CancelAppointment,
    AcceptAppointment,
    CompleteAppointment,
    FetchDoctors,
    AddDoctor,
    ToggleDoctorAvailability,
    FetchUsers,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::FetchAppointments,
        Operation::FetchDashboard,
        Operation::FetchProfile,
        Operation::UpdateProfile,
        Operation::CancelAppointment,
        Operation::AcceptAppointment,
        Operation::CompleteAppointment,
        Operation::FetchDoctors,
        Operation::AddDoctor,
        Operation::ToggleDoctorAvailability,
        Operation::FetchUsers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::FetchAppointments => "fetchAppointments",
            Operation::FetchDashboard => "fetchDashboard",
            Operation::FetchProfile => "fetchProfile",
            Operation::UpdateProfile => "updateProfile",
            Operation::CancelAppointment => "cancelAppointment",
            Operation::AcceptAppointment => "acceptAppointment",
            Operation::CompleteAppointment => "completeAppointment",
            Operation::FetchDoctors => "fetchDoctors",
            Operation::AddDoctor => "addDoctor",
            Operation::ToggleDoctorAvailability => "toggleDoctorAvailability",
            Operation::FetchUsers => "fetchUsers",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Operation::FetchAppointments
            | Operation::FetchDashboard
            | Operation::FetchProfile
            | Operation::FetchUsers => Method::Get,
            // The backend lists doctors through a POST route
            Operation::FetchDoctors => Method::Post,
            _ => Method::Post,
        }
    }

    pub fn mutates(self) -> bool {
        matches!(
            self,
            Operation::UpdateProfile
                | Operation::CancelAppointment
                | Operation::AcceptAppointment
                | Operation::CompleteAppointment
                | Operation::AddDoctor
                | Operation::ToggleDoctorAvailability
        )
    }

    /// Route for `role`, or `None` when the role may not issue this operation
    pub fn path(self, role: Role) -> Option<&'static str> {
        let path = match (role, self) {
            (Role::Doctor, Operation::FetchAppointments) => "/api/doctor/appointments",
            (Role::Doctor, Operation::FetchDashboard) => "/api/doctor/dashboard",
            (Role::Doctor, Operation::FetchProfile) => "/api/doctor/profile",
            (Role::Doctor, Operation::UpdateProfile) => "/api/doctor/update-profile",
            (Role::Doctor, Operation::CancelAppointment) => "/api/doctor/cancel-appointment",
            (Role::Doctor, Operation::AcceptAppointment) => "/api/doctor/accept-appointment",
            (Role::Doctor, Operation::CompleteAppointment) => "/api/doctor/complete-appointment",
            (Role::Admin, Operation::FetchAppointments) => "/api/admin/appointments",
            (Role::Admin, Operation::FetchDashboard) => "/api/admin/dashboard",
            (Role::Admin, Operation::CancelAppointment) => "/api/admin/cancel-appointment",
            (Role::Admin, Operation::FetchDoctors) => "/api/admin/all-doctors",
            (Role::Admin, Operation::AddDoctor) => "/api/admin/add-doctor",
            (Role::Admin, Operation::ToggleDoctorAvailability) => "/api/admin/change-availability",
            (Role::Admin, Operation::FetchUsers) => "/api/admin/users",
            _ => return None,
        };
        Some(path)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
