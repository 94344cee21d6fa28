//! Wire types exchanged with the booking backend.
//!
//! Field names follow the backend's JSON exactly (`_id`, `slotDate`,
//! `isAccepted`, ...); Rust-side names are snake_case.

use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Shared Types
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
}

/// How an appointment was paid; the backend sends a boolean `payment` flag
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "bool", into = "bool")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Online,
}

impl From<bool> for PaymentMethod {
    fn from(paid_online: bool) -> Self {
        if paid_online {
            PaymentMethod::Online
        } else {
            PaymentMethod::Cash
        }
    }
}

impl From<PaymentMethod> for bool {
    fn from(method: PaymentMethod) -> Self {
        method == PaymentMethod::Online
    }
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Online => "Online",
        }
    }
}

// =============================================================================
// Appointment Types
// =============================================================================

/// Patient snapshot denormalized into an appointment (`userData`)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    /// Date of birth as `YYYY-MM-DD`, or a placeholder the backend left unset
    #[serde(default)]
    pub dob: String,
}

/// Doctor snapshot denormalized into an appointment (`docData`)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DoctorSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub speciality: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "userId", default)]
    pub patient_id: String,
    #[serde(rename = "docId", default)]
    pub doctor_id: String,
    /// Slot date as sent by the backend (`DD_MM_YYYY`)
    #[serde(default)]
    pub slot_date: String,
    #[serde(default)]
    pub slot_time: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(rename = "payment", default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub is_accepted: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(rename = "scanImage", default, skip_serializing_if = "Option::is_none")]
    pub scan_image: Option<String>,
    #[serde(rename = "userData", default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientSnapshot>,
    #[serde(rename = "docData", default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorSnapshot>,
}

/// Lifecycle position of an appointment.
///
/// `Pending -> Accepted -> Completed`, or `Pending|Accepted -> Cancelled`.
/// `Completed` and `Cancelled` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppointmentStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Accepted => "Accepted",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

impl Appointment {
    pub fn status(&self) -> AppointmentStatus {
        if self.cancelled {
            AppointmentStatus::Cancelled
        } else if self.is_completed {
            AppointmentStatus::Completed
        } else if self.is_accepted {
            AppointmentStatus::Accepted
        } else {
            AppointmentStatus::Pending
        }
    }

    /// Neither cancelled nor completed
    pub fn is_active(&self) -> bool {
        !self.status().is_terminal()
    }

    /// Status flags obey the lifecycle: at most one terminal flag, and an
    /// accepted appointment is never cancelled.
    pub fn flags_consistent(&self) -> bool {
        !(self.cancelled && self.is_completed) && !(self.is_accepted && self.cancelled)
    }

    /// True when `next` is reachable from `self` without reversing a flag
    pub fn transition_allowed(&self, next: &Appointment) -> bool {
        let reverses = (self.cancelled && !next.cancelled)
            || (self.is_completed && !next.is_completed)
            || (self.is_accepted && !next.is_accepted && !next.cancelled);
        !reverses && next.flags_consistent()
    }
}

// =============================================================================
// Doctor Types
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub speciality: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub available: bool,
}

impl Doctor {
    /// Fields a doctor may edit on their own profile
    pub fn profile_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            address: self.address.clone(),
            fees: self.fees,
            about: self.about.clone(),
            available: self.available,
        }
    }
}

/// Body of `update-profile`
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    pub address: Address,
    pub fees: f64,
    pub about: String,
    pub available: bool,
}

/// Fields of the Add Doctor submission (sent as multipart alongside `image`)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub password: String,
    pub experience: String,
    pub fees: f64,
    pub about: String,
    pub speciality: String,
    pub degree: String,
    pub address: Address,
}

// =============================================================================
// Dashboard / User Types
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    /// Admin dashboards only
    #[serde(rename = "doctors", default, skip_serializing_if = "Option::is_none")]
    pub doctors_count: Option<u64>,
    #[serde(rename = "appointments", default)]
    pub appointments_count: u64,
    #[serde(rename = "patients", default)]
    pub patients_count: u64,
    /// Doctor dashboards only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earnings: Option<f64>,
    /// Most-recent-first, as computed by the backend
    #[serde(rename = "latestAppointments", default)]
    pub latest_appointments: Vec<Appointment>,
}

/// Registered patient (read-only here)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub dob: Option<String>,
}

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRef {
    pub appointment_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRef {
    pub doc_id: String,
}

/// File attached to a multipart mutation
#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Build an upload, guessing the content type from the file name
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

// =============================================================================
// Response Payloads (envelope minus `success`/`message`)
// =============================================================================

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppointmentsPayload {
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub dash_data: DashboardSummary,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub profile_data: Doctor,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DoctorsPayload {
    #[serde(default)]
    pub doctors: Vec<Doctor>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UsersPayload {
    #[serde(default)]
    pub users: Vec<User>,
}

/// Accept/complete may echo the updated appointment
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppointmentPayload {
    #[serde(default)]
    pub appointment: Option<Appointment>,
}

/// Mutations whose envelope carries nothing but `success`/`message`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NoPayload {}
