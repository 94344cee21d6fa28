//! Mock booking backend for testing
//!
//! Serves the admin and doctor REST routes with the `{success, message, ...}`
//! envelope, checks the `aToken` / `dToken` headers, and counts requests per
//! route so tests can assert what the portal actually sent.

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const DOCTOR_TOKEN: &str = "doctor-token";
/// The doctor the doctor token belongs to
pub const DOCTOR_ID: &str = "doc-1";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockAppointment {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub doc_id: String,
    pub slot_date: String,
    pub slot_time: String,
    pub amount: f64,
    pub payment: bool,
    pub cancelled: bool,
    pub is_accepted: bool,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_image: Option<String>,
    pub user_data: Value,
    pub doc_data: Value,
}

impl MockAppointment {
    pub fn new(id: &str, user_id: &str) -> Self {
        Self {
            id: id.to_string(),
            user_id: user_id.to_string(),
            doc_id: DOCTOR_ID.to_string(),
            slot_date: "20_1_2025".to_string(),
            slot_time: "10:30 AM".to_string(),
            amount: 50.0,
            payment: false,
            cancelled: false,
            is_accepted: false,
            is_completed: false,
            scan_image: None,
            user_data: json!({ "name": format!("Patient {}", user_id), "image": "", "dob": "1990-06-15" }),
            doc_data: json!({ "name": "Dr. Lee", "image": "", "speciality": "Neurologist" }),
        }
    }

    pub fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    pub fn completed(mut self) -> Self {
        self.is_accepted = true;
        self.is_completed = true;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MockDoctor {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub fees: f64,
    pub about: String,
    pub address: Value,
    pub available: bool,
}

impl MockDoctor {
    pub fn new(id: &str, email: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Dr. {}", id),
            email: email.to_string(),
            image: String::new(),
            speciality: "Neurologist".to_string(),
            degree: "MBBS".to_string(),
            experience: "4 Year".to_string(),
            fees: 40.0,
            about: String::new(),
            address: json!({ "line1": "", "line2": "" }),
            available: true,
        }
    }
}

/// Mock backend state
#[derive(Default)]
struct BackendState {
    appointments: Vec<MockAppointment>,
    doctors: Vec<MockDoctor>,
    users: Vec<Value>,
    hits: HashMap<&'static str, usize>,
    mutation_delay: Option<Duration>,
    fetch_delay: Option<Duration>,
    echo_appointment: bool,
    /// Replaces the echoed appointment in accept/complete replies
    stale_echo: Option<MockAppointment>,
    last_form: HashMap<String, String>,
    revoked: bool,
}

#[derive(Clone, Copy)]
enum Caller {
    Admin,
    Doctor,
}

impl BackendState {
    fn record(&mut self, route: &'static str) {
        *self.hits.entry(route).or_insert(0) += 1;
    }

    fn authorized(&self, headers: &HeaderMap, caller: Caller) -> bool {
        let (header, expected) = match caller {
            Caller::Admin => ("aToken", ADMIN_TOKEN),
            Caller::Doctor => ("dToken", DOCTOR_TOKEN),
        };
        !self.revoked && headers.get(header).and_then(|v| v.to_str().ok()) == Some(expected)
    }

    fn appointment_mut(&mut self, id: &str) -> Option<&mut MockAppointment> {
        self.appointments.iter_mut().find(|a| a.id == id)
    }
}

type Shared = Arc<RwLock<BackendState>>;

/// Mock booking backend
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Start the mock backend on a random port
    pub async fn start() -> Self {
        let state: Shared = Arc::new(RwLock::new(BackendState::default()));

        let app = Router::new()
            .route("/api/doctor/appointments", get(doctor_appointments))
            .route("/api/doctor/dashboard", get(doctor_dashboard))
            .route("/api/doctor/profile", get(doctor_profile))
            .route("/api/doctor/update-profile", post(update_profile))
            .route("/api/doctor/cancel-appointment", post(doctor_cancel))
            .route("/api/doctor/accept-appointment", post(accept_appointment))
            .route("/api/doctor/complete-appointment", post(complete_appointment))
            .route("/api/admin/appointments", get(admin_appointments))
            .route("/api/admin/dashboard", get(admin_dashboard))
            .route("/api/admin/cancel-appointment", post(admin_cancel))
            .route("/api/admin/all-doctors", post(all_doctors))
            .route("/api/admin/add-doctor", post(add_doctor))
            .route("/api/admin/change-availability", post(change_availability))
            .route("/api/admin/users", get(users))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received on `route` (e.g. "doctor/appointments")
    pub async fn hits(&self, route: &str) -> usize {
        self.state.read().await.hits.get(route).copied().unwrap_or(0)
    }

    pub async fn add_appointment(&self, appointment: MockAppointment) {
        self.state.write().await.appointments.push(appointment);
    }

    pub async fn add_doctor(&self, doctor: MockDoctor) {
        self.state.write().await.doctors.push(doctor);
    }

    pub async fn add_user(&self, id: &str, name: &str) {
        self.state.write().await.users.push(json!({
            "_id": id,
            "name": name,
            "email": format!("{}@mail.test", id),
            "phone": "000",
            "gender": "Female",
            "image": "",
            "address": { "line1": "12 Nile St", "line2": "Cairo" },
            "dob": "1990-06-15"
        }));
    }

    pub async fn appointment(&self, id: &str) -> Option<MockAppointment> {
        let state = self.state.read().await;
        state.appointments.iter().find(|a| a.id == id).cloned()
    }

    pub async fn doctor_count(&self) -> usize {
        self.state.read().await.doctors.len()
    }

    /// Hold every mutation for `delay` after it is counted
    pub async fn set_mutation_delay(&self, delay: Duration) {
        self.state.write().await.mutation_delay = Some(delay);
    }

    /// Hold every read route for `delay` before answering
    pub async fn set_fetch_delay(&self, delay: Duration) {
        self.state.write().await.fetch_delay = Some(delay);
    }

    /// Include the updated appointment in accept/complete replies
    pub async fn set_echo_appointment(&self, echo: bool) {
        self.state.write().await.echo_appointment = echo;
    }

    /// Echo `appointment` from accept/complete instead of the stored record
    pub async fn set_stale_echo(&self, appointment: MockAppointment) {
        let mut s = self.state.write().await;
        s.echo_appointment = true;
        s.stale_echo = Some(appointment);
    }

    /// Reject every token with HTTP 401 from now on
    pub async fn revoke_tokens(&self) {
        self.state.write().await.revoked = true;
    }

    /// Fields of the last multipart request; files appear as `file:<name>:<len>`
    pub async fn last_form(&self) -> HashMap<String, String> {
        self.state.read().await.last_form.clone()
    }

    /// Stop the mock server
    pub async fn stop(self) {
        self.handle.abort();
    }
}

// =============================================================================
// Response helpers
// =============================================================================

fn ok(message: &str, mut payload: Value) -> Response {
    if let Some(map) = payload.as_object_mut() {
        map.insert("success".into(), json!(true));
        map.insert("message".into(), json!(message));
    }
    Json(payload).into_response()
}

fn fail(message: &str) -> Response {
    Json(json!({ "success": false, "message": message })).into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Not Authorized Login Again" })),
    )
        .into_response()
}

async fn read_form(mut multipart: Multipart) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let value = match file_name {
            Some(file) => {
                let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                format!("file:{}:{}", file, len)
            }
            None => field.text().await.unwrap_or_default(),
        };
        fields.insert(name, value);
    }
    fields
}

/// Count and authorize a mutation, then wait out the configured delay.
/// Returns false when the caller is not authorized.
async fn admit(state: &Shared, route: &'static str, headers: &HeaderMap, caller: Caller) -> bool {
    let delay = {
        let mut s = state.write().await;
        s.record(route);
        if !s.authorized(headers, caller) {
            return false;
        }
        s.mutation_delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    true
}

/// Wait out the configured read delay; no lock is held while sleeping
async fn pause_fetch(state: &Shared) {
    let delay = state.read().await.fetch_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

fn appointment_id(body: &Value) -> String {
    body.get("appointmentId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// Doctor routes
// =============================================================================

async fn doctor_appointments(State(state): State<Shared>, headers: HeaderMap) -> Response {
    pause_fetch(&state).await;
    let mut s = state.write().await;
    s.record("doctor/appointments");
    if !s.authorized(&headers, Caller::Doctor) {
        return unauthorized();
    }
    let list: Vec<_> = s
        .appointments
        .iter()
        .filter(|a| a.doc_id == DOCTOR_ID)
        .cloned()
        .collect();
    ok("", json!({ "appointments": list }))
}

async fn doctor_dashboard(State(state): State<Shared>, headers: HeaderMap) -> Response {
    pause_fetch(&state).await;
    let mut s = state.write().await;
    s.record("doctor/dashboard");
    if !s.authorized(&headers, Caller::Doctor) {
        return unauthorized();
    }
    let mine: Vec<_> = s
        .appointments
        .iter()
        .filter(|a| a.doc_id == DOCTOR_ID)
        .cloned()
        .collect();
    let earnings: f64 = mine
        .iter()
        .filter(|a| a.is_completed || a.payment)
        .map(|a| a.amount)
        .sum();
    let patients: HashSet<_> = mine.iter().map(|a| a.user_id.clone()).collect();
    let latest: Vec<_> = mine.iter().rev().cloned().collect();
    ok(
        "",
        json!({
            "dashData": {
                "earnings": earnings,
                "appointments": mine.len(),
                "patients": patients.len(),
                "latestAppointments": latest
            }
        }),
    )
}

async fn doctor_profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    pause_fetch(&state).await;
    let mut s = state.write().await;
    s.record("doctor/profile");
    if !s.authorized(&headers, Caller::Doctor) {
        return unauthorized();
    }
    match s.doctors.iter().find(|d| d.id == DOCTOR_ID) {
        Some(doctor) => ok("", json!({ "profileData": doctor })),
        None => fail("Doctor not found"),
    }
}

async fn update_profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !admit(&state, "doctor/update-profile", &headers, Caller::Doctor).await {
        return unauthorized();
    }
    let mut s = state.write().await;
    let Some(doctor) = s.doctors.iter_mut().find(|d| d.id == DOCTOR_ID) else {
        return fail("Doctor not found");
    };
    if let Some(fees) = body.get("fees").and_then(Value::as_f64) {
        doctor.fees = fees;
    }
    if let Some(about) = body.get("about").and_then(Value::as_str) {
        doctor.about = about.to_string();
    }
    if let Some(available) = body.get("available").and_then(Value::as_bool) {
        doctor.available = available;
    }
    if let Some(address) = body.get("address") {
        doctor.address = address.clone();
    }
    ok("Profile Updated", json!({}))
}

async fn doctor_cancel(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !admit(&state, "doctor/cancel-appointment", &headers, Caller::Doctor).await {
        return unauthorized();
    }
    cancel(&state, &appointment_id(&body)).await
}

async fn accept_appointment(
    State(state): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let form = read_form(multipart).await;
    if !admit(&state, "doctor/accept-appointment", &headers, Caller::Doctor).await {
        return unauthorized();
    }
    transition(&state, form, false).await
}

async fn complete_appointment(
    State(state): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let form = read_form(multipart).await;
    if !admit(&state, "doctor/complete-appointment", &headers, Caller::Doctor).await {
        return unauthorized();
    }
    transition(&state, form, true).await
}

async fn cancel(state: &Shared, id: &str) -> Response {
    let mut s = state.write().await;
    let Some(appointment) = s.appointment_mut(id) else {
        return fail("Appointment not found");
    };
    if appointment.cancelled {
        return fail("Appointment already cancelled");
    }
    if appointment.is_completed {
        return fail("Appointment already completed");
    }
    appointment.cancelled = true;
    appointment.is_accepted = false;
    ok("Appointment Cancelled", json!({}))
}

async fn transition(state: &Shared, form: HashMap<String, String>, complete: bool) -> Response {
    let mut s = state.write().await;
    let echo = s.echo_appointment;
    let stale_echo = s.stale_echo.clone();
    s.last_form = form.clone();
    let id = form.get("appointmentId").cloned().unwrap_or_default();
    let Some(appointment) = s.appointment_mut(&id) else {
        return fail("Appointment not found");
    };
    if appointment.cancelled {
        return fail("Appointment cancelled");
    }
    appointment.is_accepted = true;
    if complete {
        appointment.is_completed = true;
    }
    if let Some(file) = form.get("scanImage") {
        let name = file.split(':').nth(1).unwrap_or("scan");
        appointment.scan_image = Some(format!("https://cdn.mock/{}", name));
    }
    let message = if complete {
        "Appointment Completed"
    } else {
        "Appointment Accepted"
    };
    if echo {
        let updated = stale_echo.unwrap_or_else(|| appointment.clone());
        ok(message, json!({ "appointment": updated }))
    } else {
        ok(message, json!({}))
    }
}

// =============================================================================
// Admin routes
// =============================================================================

async fn admin_appointments(State(state): State<Shared>, headers: HeaderMap) -> Response {
    pause_fetch(&state).await;
    let mut s = state.write().await;
    s.record("admin/appointments");
    if !s.authorized(&headers, Caller::Admin) {
        return unauthorized();
    }
    ok("", json!({ "appointments": s.appointments }))
}

async fn admin_dashboard(State(state): State<Shared>, headers: HeaderMap) -> Response {
    pause_fetch(&state).await;
    let mut s = state.write().await;
    s.record("admin/dashboard");
    if !s.authorized(&headers, Caller::Admin) {
        return unauthorized();
    }
    let latest: Vec<_> = s.appointments.iter().rev().cloned().collect();
    ok(
        "",
        json!({
            "dashData": {
                "doctors": s.doctors.len(),
                "appointments": s.appointments.len(),
                "patients": s.users.len(),
                "latestAppointments": latest
            }
        }),
    )
}

async fn admin_cancel(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !admit(&state, "admin/cancel-appointment", &headers, Caller::Admin).await {
        return unauthorized();
    }
    cancel(&state, &appointment_id(&body)).await
}

async fn all_doctors(State(state): State<Shared>, headers: HeaderMap) -> Response {
    pause_fetch(&state).await;
    let mut s = state.write().await;
    s.record("admin/all-doctors");
    if !s.authorized(&headers, Caller::Admin) {
        return unauthorized();
    }
    ok("", json!({ "doctors": s.doctors }))
}

async fn add_doctor(
    State(state): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let form = read_form(multipart).await;
    if !admit(&state, "admin/add-doctor", &headers, Caller::Admin).await {
        return unauthorized();
    }
    let mut s = state.write().await;
    s.last_form = form.clone();

    let field = |name: &str| form.get(name).cloned().unwrap_or_default();
    if !form.contains_key("image") || field("name").is_empty() || field("email").is_empty() {
        return fail("Missing Details");
    }
    if s.doctors.iter().any(|d| d.email == field("email")) {
        return fail("Doctor already exists");
    }
    let id = format!("doc-{}", s.doctors.len() + 1);
    let mut doctor = MockDoctor::new(&id, &field("email"));
    doctor.name = field("name");
    doctor.speciality = field("speciality");
    doctor.degree = field("degree");
    doctor.experience = field("experience");
    doctor.about = field("about");
    doctor.fees = field("fees").parse().unwrap_or(0.0);
    doctor.address = serde_json::from_str(&field("address")).unwrap_or(Value::Null);
    s.doctors.push(doctor);
    ok("Doctor Added", json!({}))
}

async fn change_availability(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !admit(&state, "admin/change-availability", &headers, Caller::Admin).await {
        return unauthorized();
    }
    let id = body
        .get("docId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let mut s = state.write().await;
    match s.doctors.iter_mut().find(|d| d.id == id) {
        Some(doctor) => {
            doctor.available = !doctor.available;
            ok("Availability Changed", json!({}))
        }
        None => fail("Doctor not found"),
    }
}

async fn users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    pause_fetch(&state).await;
    let mut s = state.write().await;
    s.record("admin/users");
    if !s.authorized(&headers, Caller::Admin) {
        return unauthorized();
    }
    ok("", json!({ "users": s.users }))
}
