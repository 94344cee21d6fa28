//! Resource Client - one HTTP call per logical operation
//!
//! Requests go to a single configured base URL. The acting role's token is
//! attached under the role's own header (`dToken` / `aToken`), and every
//! response is decoded through the `{success, message, ...}` envelope.
//!
//! Mutations are fingerprinted (`<operation>:<subject>`) while in flight so a
//! double submit cannot issue the same mutation twice concurrently. There are
//! no retries.

mod envelope;
mod operations;

pub use envelope::{decode, Envelope, Reply};
pub use operations::{Method, Operation};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{PortalError, PortalResult};
use crate::models::{
    Appointment, AppointmentPayload, AppointmentRef, AppointmentsPayload, DashboardPayload,
    DashboardSummary, Doctor, DoctorRef, DoctorsPayload, NewDoctor, NoPayload, ProfilePayload,
    ProfileUpdate, Upload, User, UsersPayload,
};
use crate::session::Credential;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Request body for one call
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<FormField>),
}

/// One multipart field
#[derive(Debug, Clone)]
pub enum FormField {
    Text { name: String, value: String },
    File { name: String, upload: Upload },
}

impl FormField {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        FormField::Text {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn file(name: &str, upload: Upload) -> Self {
        FormField::File {
            name: name.to_string(),
            upload,
        }
    }
}

fn build_form(fields: Vec<FormField>) -> PortalResult<Form> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File { name, upload } => {
                let part = Part::bytes(upload.bytes)
                    .file_name(upload.file_name)
                    .mime_str(&upload.content_type)?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

/// Removes its fingerprint from the in-flight set when dropped
struct InFlightGuard {
    key: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.key);
    }
}

/// HTTP client bound to one backend
#[derive(Clone)]
pub struct ResourceClient {
    http: Client,
    base_url: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ResourceClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> PortalResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(PortalError::Config("backend URL is not configured".to_string()));
        }
        let parsed = url::Url::parse(trimmed)
            .map_err(|e| PortalError::Config(format!("invalid backend URL {trimmed:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PortalError::Config(format!(
                "backend URL must be http or https, got {}",
                parsed.scheme()
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of mutations currently in flight
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn claim(&self, op: Operation, subject: Option<&str>) -> PortalResult<InFlightGuard> {
        let key = match subject {
            Some(id) => format!("{}:{}", op.name(), id),
            None => op.name().to_string(),
        };
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(key.clone()) {
            return Err(PortalError::Duplicate(key));
        }
        Ok(InFlightGuard {
            key,
            in_flight: self.in_flight.clone(),
        })
    }

    /// Issue one operation and decode its envelope.
    ///
    /// `subject` identifies the record a mutation targets; it is only used
    /// for in-flight deduplication.
    pub async fn call<T: DeserializeOwned>(
        &self,
        op: Operation,
        credential: &Credential,
        subject: Option<&str>,
        body: RequestBody,
    ) -> PortalResult<Reply<T>> {
        let role = credential.role;
        let path = op.path(role).ok_or_else(|| {
            PortalError::Precondition(format!("{} is not available to the {} role", op, role))
        })?;

        // Claimed before the first await so a concurrent duplicate sees it
        let _guard = if op.mutates() {
            Some(self.claim(op, subject)?)
        } else {
            None
        };

        let url = format!("{}{}", self.base_url, path);
        debug!(operation = %op, role = %role, %url, "Issuing request");

        let request = match op.method() {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        }
        .header(role.header_name(), credential.token.as_str());

        let request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(fields) => request.multipart(build_form(fields)?),
        };

        let response = request.send().await.map_err(|e| {
            warn!(operation = %op, role = %role, "Request failed: {}", e);
            PortalError::from(e)
        })?;
        let status = response.status();
        let body = response.text().await?;

        classify(status, &body)
    }

    pub async fn fetch_appointments(
        &self,
        credential: &Credential,
    ) -> PortalResult<Reply<Vec<Appointment>>> {
        let reply: Reply<AppointmentsPayload> = self
            .call(Operation::FetchAppointments, credential, None, RequestBody::Empty)
            .await?;
        // Backend returns booking order; callers get most-recent-first
        Ok(reply.map(|p| p.appointments.into_iter().rev().collect()))
    }

    pub async fn fetch_dashboard(
        &self,
        credential: &Credential,
    ) -> PortalResult<Reply<DashboardSummary>> {
        let reply: Reply<DashboardPayload> = self
            .call(Operation::FetchDashboard, credential, None, RequestBody::Empty)
            .await?;
        Ok(reply.map(|p| p.dash_data))
    }

    pub async fn fetch_profile(&self, credential: &Credential) -> PortalResult<Reply<Doctor>> {
        let reply: Reply<ProfilePayload> = self
            .call(Operation::FetchProfile, credential, None, RequestBody::Empty)
            .await?;
        Ok(reply.map(|p| p.profile_data))
    }

    pub async fn update_profile(
        &self,
        credential: &Credential,
        update: &ProfileUpdate,
    ) -> PortalResult<Reply<()>> {
        let body = json_body(update)?;
        let reply: Reply<NoPayload> = self
            .call(Operation::UpdateProfile, credential, None, RequestBody::Json(body))
            .await?;
        Ok(reply.map(|_| ()))
    }

    pub async fn cancel_appointment(
        &self,
        credential: &Credential,
        appointment_id: &str,
    ) -> PortalResult<Reply<()>> {
        let body = json_body(&AppointmentRef {
            appointment_id: appointment_id.to_string(),
        })?;
        let reply: Reply<NoPayload> = self
            .call(
                Operation::CancelAppointment,
                credential,
                Some(appointment_id),
                RequestBody::Json(body),
            )
            .await?;
        Ok(reply.map(|_| ()))
    }

    pub async fn accept_appointment(
        &self,
        credential: &Credential,
        appointment_id: &str,
        scan: Option<Upload>,
    ) -> PortalResult<Reply<Option<Appointment>>> {
        self.appointment_transition(Operation::AcceptAppointment, credential, appointment_id, scan)
            .await
    }

    pub async fn complete_appointment(
        &self,
        credential: &Credential,
        appointment_id: &str,
        scan: Option<Upload>,
    ) -> PortalResult<Reply<Option<Appointment>>> {
        self.appointment_transition(
            Operation::CompleteAppointment,
            credential,
            appointment_id,
            scan,
        )
        .await
    }

    async fn appointment_transition(
        &self,
        op: Operation,
        credential: &Credential,
        appointment_id: &str,
        scan: Option<Upload>,
    ) -> PortalResult<Reply<Option<Appointment>>> {
        let mut fields = vec![FormField::text("appointmentId", appointment_id)];
        if let Some(upload) = scan {
            fields.push(FormField::file("scanImage", upload));
        }
        let reply: Reply<AppointmentPayload> = self
            .call(op, credential, Some(appointment_id), RequestBody::Multipart(fields))
            .await?;
        Ok(reply.map(|p| p.appointment))
    }

    pub async fn fetch_doctors(&self, credential: &Credential) -> PortalResult<Reply<Vec<Doctor>>> {
        let reply: Reply<DoctorsPayload> = self
            .call(Operation::FetchDoctors, credential, None, RequestBody::Empty)
            .await?;
        Ok(reply.map(|p| p.doctors))
    }

    pub async fn add_doctor(
        &self,
        credential: &Credential,
        doctor: &NewDoctor,
        image: Upload,
    ) -> PortalResult<Reply<()>> {
        let address = serde_json::to_string(&doctor.address)
            .map_err(|e| PortalError::Precondition(format!("Invalid address: {e}")))?;
        let fields = vec![
            FormField::file("image", image),
            FormField::text("name", doctor.name.as_str()),
            FormField::text("email", doctor.email.as_str()),
            FormField::text("password", doctor.password.as_str()),
            FormField::text("experience", doctor.experience.as_str()),
            FormField::text("fees", doctor.fees.to_string()),
            FormField::text("about", doctor.about.as_str()),
            FormField::text("speciality", doctor.speciality.as_str()),
            FormField::text("degree", doctor.degree.as_str()),
            FormField::text("address", address),
        ];
        let reply: Reply<NoPayload> = self
            .call(
                Operation::AddDoctor,
                credential,
                Some(doctor.email.as_str()),
                RequestBody::Multipart(fields),
            )
            .await?;
        Ok(reply.map(|_| ()))
    }

    pub async fn toggle_doctor_availability(
        &self,
        credential: &Credential,
        doctor_id: &str,
    ) -> PortalResult<Reply<()>> {
        let body = json_body(&DoctorRef {
            doc_id: doctor_id.to_string(),
        })?;
        let reply: Reply<NoPayload> = self
            .call(
                Operation::ToggleDoctorAvailability,
                credential,
                Some(doctor_id),
                RequestBody::Json(body),
            )
            .await?;
        Ok(reply.map(|_| ()))
    }

    pub async fn fetch_users(&self, credential: &Credential) -> PortalResult<Reply<Vec<User>>> {
        let reply: Reply<UsersPayload> = self
            .call(Operation::FetchUsers, credential, None, RequestBody::Empty)
            .await?;
        Ok(reply.map(|p| p.users))
    }
}

fn json_body<T: Serialize>(value: &T) -> PortalResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| PortalError::Precondition(format!("Invalid request data: {e}")))
}

/// Map an HTTP status and body onto the error taxonomy
fn classify<T: DeserializeOwned>(status: StatusCode, body: &str) -> PortalResult<Reply<T>> {
    let envelope = Envelope::parse(body);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        let message = envelope
            .map(|e| e.failure_message())
            .unwrap_or_else(|_| status_failure(status));
        return Err(PortalError::AuthRejected(message));
    }

    if !status.is_success() {
        return match envelope {
            Ok(env) if !env.success => Err(PortalError::UserFacing(env.failure_message())),
            _ => Err(PortalError::Transport(status_failure(status))),
        };
    }

    envelope?.into_payload()
}

fn status_failure(status: StatusCode) -> String {
    format!("Request failed with status code {}", status.as_u16())
}
