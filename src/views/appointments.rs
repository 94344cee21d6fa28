//! Appointment list: one row per appointment with its status and the
//! actions the acting role may take on it.

use chrono::NaiveDate;
use std::fmt;

use super::format::{calculate_age, count_label, money, slot_date_format};
use crate::models::{Appointment, AppointmentStatus};
use crate::role::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentAction {
    Accept,
    Cancel,
    Complete,
    /// Attach a scan to a completed appointment (re-issues accept with a file)
    AttachScan,
    /// Open the attached scan
    ViewScan(String),
}

impl AppointmentAction {
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentAction::Accept => "Accept",
            AppointmentAction::Cancel => "Cancel",
            AppointmentAction::Complete => "Complete",
            AppointmentAction::AttachScan => "Attach scan",
            AppointmentAction::ViewScan(_) => "View scan",
        }
    }
}

/// Actions offered for `appointment` when viewed by `role`
pub fn actions_for(role: Role, appointment: &Appointment) -> Vec<AppointmentAction> {
    match (role, appointment.status()) {
        (_, AppointmentStatus::Cancelled) => Vec::new(),
        (Role::Admin, AppointmentStatus::Completed) => Vec::new(),
        (Role::Admin, _) => vec![AppointmentAction::Cancel],
        (Role::Doctor, AppointmentStatus::Completed) => {
            let mut actions = vec![AppointmentAction::AttachScan];
            if let Some(url) = appointment.scan_image.as_ref().filter(|u| !u.is_empty()) {
                actions.push(AppointmentAction::ViewScan(url.clone()));
            }
            actions
        }
        (Role::Doctor, AppointmentStatus::Accepted) => {
            vec![AppointmentAction::Cancel, AppointmentAction::Complete]
        }
        (Role::Doctor, AppointmentStatus::Pending) => {
            vec![AppointmentAction::Cancel, AppointmentAction::Accept]
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentRow {
    /// 1-based position in the list
    pub position: usize,
    pub id: String,
    pub patient_name: String,
    pub patient_age: Option<u32>,
    /// Admin lists only
    pub doctor_name: Option<String>,
    pub payment: &'static str,
    pub when: String,
    pub fees: String,
    pub status: AppointmentStatus,
    pub actions: Vec<AppointmentAction>,
}

impl AppointmentRow {
    pub fn build(
        role: Role,
        position: usize,
        appointment: &Appointment,
        currency: &str,
        today: NaiveDate,
    ) -> Self {
        let patient = appointment.patient.as_ref();
        Self {
            position,
            id: appointment.id.clone(),
            patient_name: patient.map(|p| p.name.clone()).unwrap_or_default(),
            patient_age: patient.and_then(|p| calculate_age(&p.dob, today)),
            doctor_name: match role {
                Role::Admin => appointment.doctor.as_ref().map(|d| d.name.clone()),
                Role::Doctor => None,
            },
            payment: appointment.payment_method.label(),
            when: format!(
                "{}, {}",
                slot_date_format(&appointment.slot_date),
                appointment.slot_time
            ),
            fees: money(currency, appointment.amount),
            status: appointment.status(),
            actions: actions_for(role, appointment),
        }
    }
}

impl fmt::Display for AppointmentRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let age = self
            .patient_age
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{:>3}. {} [{}] {} (age {}) {} {} {}",
            self.position,
            self.id,
            self.status.label(),
            self.patient_name,
            age,
            self.when,
            self.fees,
            self.payment
        )?;
        if let Some(doctor) = &self.doctor_name {
            write!(f, " with {}", doctor)?;
        }
        if !self.actions.is_empty() {
            let labels: Vec<_> = self.actions.iter().map(|a| a.label()).collect();
            write!(f, " -> {}", labels.join(" | "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentListView {
    pub role: Role,
    pub title: &'static str,
    /// "3 Appointments" for doctors, total for admins
    pub header: String,
    /// Neither cancelled nor completed
    pub active_count: usize,
    pub rows: Vec<AppointmentRow>,
}

impl AppointmentListView {
    /// Rows keep the order held in the cache (most-recent-first)
    pub fn build(
        role: Role,
        appointments: &[Appointment],
        currency: &str,
        today: NaiveDate,
    ) -> Self {
        let rows = appointments
            .iter()
            .enumerate()
            .map(|(i, a)| AppointmentRow::build(role, i + 1, a, currency, today))
            .collect();
        let active_count = appointments.iter().filter(|a| a.is_active()).count();
        let header = match role {
            Role::Doctor => count_label(appointments.len(), "Appointment", "Appointments"),
            Role::Admin => format!("Total Appointments: {}", appointments.len()),
        };
        Self {
            role,
            title: match role {
                Role::Admin => "All Appointments",
                Role::Doctor => "Appointment Management",
            },
            header,
            active_count,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: &str) -> Option<&AppointmentRow> {
        self.rows.iter().find(|r| r.id == id)
    }
}

impl fmt::Display for AppointmentListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        write!(f, "{}", self.header)?;
        if self.role == Role::Admin {
            write!(f, " ({} Active)", self.active_count)?;
        }
        writeln!(f)?;
        if self.rows.is_empty() {
            return writeln!(f, "No appointments scheduled");
        }
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
