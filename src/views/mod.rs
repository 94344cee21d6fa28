//! Headless view models
//!
//! Every view is a pure function of cached data and a [`Role`]; none of them
//! touch the network or the session. Rendering is left to the caller (the
//! CLI prints the `Display` form).

pub mod add_doctor;
pub mod appointments;
pub mod dashboard;
pub mod doctors;
pub mod format;
pub mod nav;
pub mod profile;
pub mod users;

pub use add_doctor::AddDoctorForm;
pub use appointments::{actions_for, AppointmentAction, AppointmentListView, AppointmentRow};
pub use dashboard::{DashboardCard, DashboardView, DASHBOARD_WINDOW};
pub use doctors::DoctorListView;
pub use nav::NavView;
pub use profile::{ProfileEditor, ProfileView};
pub use users::UserListView;

use crate::bus::CacheSlot;
use crate::role::Role;

/// Screens reachable from the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Dashboard,
    Appointments,
    Profile,
    AddDoctor,
    DoctorsList,
    UsersList,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::Dashboard,
        Screen::Appointments,
        Screen::Profile,
        Screen::AddDoctor,
        Screen::DoctorsList,
        Screen::UsersList,
    ];

    /// Route of this screen for `role`, `None` when the role has no such screen
    pub fn route(self, role: Role) -> Option<&'static str> {
        match (role, self) {
            (Role::Admin, Screen::Dashboard) => Some("/admin-dashboard"),
            (Role::Admin, Screen::Appointments) => Some("/all-appointments"),
            (Role::Admin, Screen::AddDoctor) => Some("/add-doctor"),
            (Role::Admin, Screen::DoctorsList) => Some("/doctor-list"),
            (Role::Admin, Screen::UsersList) => Some("/users-list"),
            (Role::Doctor, Screen::Dashboard) => Some("/doctor-dashboard"),
            (Role::Doctor, Screen::Appointments) => Some("/doctor-appointments"),
            (Role::Doctor, Screen::Profile) => Some("/doctor-profile"),
            _ => None,
        }
    }

    pub fn from_route(role: Role, route: &str) -> Option<Screen> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.route(role) == Some(route))
    }

    pub fn available_to(self, role: Role) -> bool {
        self.route(role).is_some()
    }

    /// Cache slots this screen loads on mount
    pub fn slots(self) -> &'static [CacheSlot] {
        match self {
            Screen::Dashboard => &[CacheSlot::Dashboard],
            Screen::Appointments => &[CacheSlot::Appointments],
            Screen::Profile => &[CacheSlot::Profile],
            Screen::DoctorsList => &[CacheSlot::Doctors],
            Screen::UsersList => &[CacheSlot::Users],
            Screen::AddDoctor => &[],
        }
    }
}
