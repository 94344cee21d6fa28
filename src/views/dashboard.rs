//! Dashboard: summary cards plus the latest bookings window

use std::fmt;

use super::appointments::{actions_for, AppointmentAction};
use super::format::{money, slot_date_format};
use crate::models::{AppointmentStatus, DashboardSummary};
use crate::role::Role;

/// Number of latest bookings shown
pub const DASHBOARD_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardCard {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatestBooking {
    pub id: String,
    /// Doctor for admins, patient for doctors
    pub name: String,
    pub detail: Option<String>,
    pub booked_on: String,
    pub status: AppointmentStatus,
    pub actions: Vec<AppointmentAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub cards: Vec<DashboardCard>,
    pub latest: Vec<LatestBooking>,
}

impl DashboardView {
    /// Latest bookings keep the backend's order and are cut to
    /// [`DASHBOARD_WINDOW`]; nothing is re-sorted.
    pub fn build(role: Role, summary: &DashboardSummary, currency: &str) -> Self {
        let cards = match role {
            Role::Admin => vec![
                DashboardCard {
                    label: "Doctors",
                    value: summary.doctors_count.unwrap_or_default().to_string(),
                },
                DashboardCard {
                    label: "Appointments",
                    value: summary.appointments_count.to_string(),
                },
                DashboardCard {
                    label: "Patients",
                    value: summary.patients_count.to_string(),
                },
            ],
            Role::Doctor => vec![
                DashboardCard {
                    label: "Earnings",
                    value: money(currency, summary.earnings.unwrap_or_default()),
                },
                DashboardCard {
                    label: "Appointments",
                    value: summary.appointments_count.to_string(),
                },
                DashboardCard {
                    label: "Patients",
                    value: summary.patients_count.to_string(),
                },
            ],
        };

        let latest = summary
            .latest_appointments
            .iter()
            .take(DASHBOARD_WINDOW)
            .map(|appointment| {
                let (name, detail) = match role {
                    Role::Admin => appointment
                        .doctor
                        .as_ref()
                        .map(|d| (d.name.clone(), Some(d.speciality.clone())))
                        .unwrap_or_default(),
                    Role::Doctor => (
                        appointment
                            .patient
                            .as_ref()
                            .map(|p| p.name.clone())
                            .unwrap_or_default(),
                        None,
                    ),
                };
                LatestBooking {
                    id: appointment.id.clone(),
                    name,
                    detail,
                    booked_on: slot_date_format(&appointment.slot_date),
                    status: appointment.status(),
                    actions: actions_for(role, appointment),
                }
            })
            .collect();

        Self { cards, latest }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in &self.cards {
            writeln!(f, "{:<14} {}", card.label, card.value)?;
        }
        writeln!(f, "Latest Bookings")?;
        if self.latest.is_empty() {
            return writeln!(f, "  No recent bookings");
        }
        for booking in &self.latest {
            write!(f, "  {} {}", booking.id, booking.name)?;
            if let Some(detail) = &booking.detail {
                write!(f, " ({})", detail)?;
            }
            writeln!(
                f,
                " - Booking on {} [{}]",
                booking.booked_on,
                booking.status.label()
            )?;
        }
        Ok(())
    }
}
