//! Role portal - the data-access layer one role's screens talk to
//!
//! A [`RolePortal`] owns nothing global: it is handed its role's session,
//! a client, a cache and the bus. Fetches replace a cache slot; mutations
//! are followed by the reconciliation refresh:
//!
//! - appointment mutations always re-fetch the dashboard, and patch the list
//!   entry by id when the backend returned the updated appointment
//!   (otherwise the list is re-fetched)
//! - doctor mutations re-fetch the doctors list and the dashboard
//! - profile updates re-fetch the profile
//!
//! Every failure is published as an error notification and returned.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::bus::{CacheSlot, Level, PortalEvent, SharedBus};
use crate::cache::{DataCache, Generation, PatchOutcome};
use crate::client::{Operation, Reply, ResourceClient};
use crate::error::{PortalError, PortalResult};
use crate::models::{Appointment, DashboardSummary, Doctor, ProfileUpdate, Upload, User};
use crate::role::Role;
use crate::session::{Credential, SessionStore};
use crate::views::{AddDoctorForm, ProfileEditor, Screen};

/// Shown when an operation is attempted without a token
pub const LOGIN_REQUIRED: &str = "Please login first";

pub struct RolePortal {
    role: Role,
    session: Arc<SessionStore>,
    client: ResourceClient,
    cache: DataCache,
    bus: SharedBus,
    auto_logout: bool,
}

impl RolePortal {
    pub fn new(session: Arc<SessionStore>, client: ResourceClient, bus: SharedBus) -> Self {
        Self {
            role: session.role(),
            session,
            client,
            cache: DataCache::new(),
            bus,
            auto_logout: true,
        }
    }

    /// Whether an auth rejection clears the session (default true)
    pub fn with_auto_logout(mut self, enabled: bool) -> Self {
        self.auto_logout = enabled;
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    pub fn bus(&self) -> &SharedBus {
        &self.bus
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn login(&self, token: &str) {
        self.session.set_token(token);
        self.bus.publish(PortalEvent::SessionChanged {
            role: self.role,
            authenticated: self.session.is_authenticated(),
        });
    }

    /// Clear the token and drop everything cached for this role
    pub async fn logout(&self) {
        self.session.clear_token();
        self.cache.clear().await;
        self.bus.publish(PortalEvent::SessionChanged {
            role: self.role,
            authenticated: false,
        });
        self.bus.publish(PortalEvent::CacheCleared { role: self.role });
    }

    fn credential(&self) -> PortalResult<Credential> {
        self.session
            .credential()
            .ok_or_else(|| PortalError::Precondition(LOGIN_REQUIRED.to_string()))
    }

    /// Credential for an explicit user action; reports when missing
    fn require_credential(&self) -> PortalResult<Credential> {
        self.credential().map_err(|e| self.report_local(e))
    }

    // =========================================================================
    // Mount
    // =========================================================================

    /// Load what `screen` shows.
    ///
    /// Without a token nothing is requested and `Ok(false)` is returned.
    pub async fn mount(&self, screen: Screen) -> PortalResult<bool> {
        if !screen.available_to(self.role) {
            return Err(self.report_local(PortalError::Precondition(format!(
                "{:?} is not available to the {} role",
                screen, self.role
            ))));
        }
        if !self.session.is_authenticated() {
            debug!(role = %self.role, ?screen, "No session token, skipping load");
            return Ok(false);
        }
        let results = join_all(screen.slots().iter().map(|slot| self.refresh(*slot))).await;
        results.into_iter().collect::<PortalResult<Vec<()>>>()?;
        Ok(true)
    }

    /// Re-fetch one cache slot
    pub async fn refresh(&self, slot: CacheSlot) -> PortalResult<()> {
        match slot {
            CacheSlot::Appointments => self.load_appointments().await.map(|_| ()),
            CacheSlot::Dashboard => self.load_dashboard().await.map(|_| ()),
            CacheSlot::Profile => self.load_profile().await.map(|_| ()),
            CacheSlot::Doctors => self.load_doctors().await.map(|_| ()),
            CacheSlot::Users => self.load_users().await.map(|_| ()),
        }
    }

    // =========================================================================
    // Fetches
    // =========================================================================

    pub async fn load_appointments(&self) -> PortalResult<Vec<Appointment>> {
        let generation = self.cache.generation().await;
        let credential = self.require_credential()?;
        let result = self.client.fetch_appointments(&credential).await;
        let reply = self.fetched(Operation::FetchAppointments, result).await?;
        let stored = self.cache.set_appointments(generation, reply.data.clone()).await;
        self.stored(CacheSlot::Appointments, stored);
        Ok(reply.data)
    }

    pub async fn load_dashboard(&self) -> PortalResult<DashboardSummary> {
        let generation = self.cache.generation().await;
        let credential = self.require_credential()?;
        let result = self.client.fetch_dashboard(&credential).await;
        let reply = self.fetched(Operation::FetchDashboard, result).await?;
        let stored = self.cache.set_dashboard(generation, reply.data.clone()).await;
        self.stored(CacheSlot::Dashboard, stored);
        Ok(reply.data)
    }

    pub async fn load_profile(&self) -> PortalResult<Doctor> {
        let generation = self.cache.generation().await;
        let credential = self.require_credential()?;
        let result = self.client.fetch_profile(&credential).await;
        let reply = self.fetched(Operation::FetchProfile, result).await?;
        let stored = self.cache.set_profile(generation, reply.data.clone()).await;
        self.stored(CacheSlot::Profile, stored);
        Ok(reply.data)
    }

    pub async fn load_doctors(&self) -> PortalResult<Vec<Doctor>> {
        let generation = self.cache.generation().await;
        let credential = self.require_credential()?;
        let result = self.client.fetch_doctors(&credential).await;
        let reply = self.fetched(Operation::FetchDoctors, result).await?;
        let stored = self.cache.set_doctors(generation, reply.data.clone()).await;
        self.stored(CacheSlot::Doctors, stored);
        Ok(reply.data)
    }

    pub async fn load_users(&self) -> PortalResult<Vec<User>> {
        let generation = self.cache.generation().await;
        let credential = self.require_credential()?;
        let result = self.client.fetch_users(&credential).await;
        let reply = self.fetched(Operation::FetchUsers, result).await?;
        let stored = self.cache.set_users(generation, reply.data.clone()).await;
        self.stored(CacheSlot::Users, stored);
        Ok(reply.data)
    }

    // =========================================================================
    // Appointment mutations
    // =========================================================================

    pub async fn cancel_appointment(&self, appointment_id: &str) -> PortalResult<()> {
        let generation = self.cache.generation().await;
        let credential = self.require_credential()?;
        let result = self
            .client
            .cancel_appointment(&credential, appointment_id)
            .await;
        let reply = self.mutated(Operation::CancelAppointment, appointment_id, result).await?;
        self.succeeded(&reply, "Appointment Cancelled");
        self.reconcile_appointment(generation, None).await;
        Ok(())
    }

    /// Accept a pending appointment, or attach a scan to a completed one
    pub async fn accept_appointment(
        &self,
        appointment_id: &str,
        scan: Option<Upload>,
    ) -> PortalResult<()> {
        let generation = self.cache.generation().await;
        let credential = self.require_credential()?;
        let result = self
            .client
            .accept_appointment(&credential, appointment_id, scan)
            .await;
        let reply = self.mutated(Operation::AcceptAppointment, appointment_id, result).await?;
        self.succeeded(&reply, "Appointment Accepted");
        self.reconcile_appointment(generation, reply.data).await;
        Ok(())
    }

    pub async fn complete_appointment(
        &self,
        appointment_id: &str,
        scan: Option<Upload>,
    ) -> PortalResult<()> {
        let generation = self.cache.generation().await;
        let credential = self.require_credential()?;
        let result = self
            .client
            .complete_appointment(&credential, appointment_id, scan)
            .await;
        let reply = self.mutated(Operation::CompleteAppointment, appointment_id, result).await?;
        self.succeeded(&reply, "Appointment Completed");
        self.reconcile_appointment(generation, reply.data).await;
        Ok(())
    }

    async fn reconcile_appointment(&self, generation: Generation, returned: Option<Appointment>) {
        let patched = match returned {
            Some(updated) => self.apply_returned(generation, updated).await,
            None => false,
        };
        let slots: &[CacheSlot] = if patched {
            &[CacheSlot::Dashboard]
        } else {
            &[CacheSlot::Appointments, CacheSlot::Dashboard]
        };
        self.refresh_after_mutation(slots).await;
    }

    /// Patch the held list with the backend's copy; false means re-fetch
    async fn apply_returned(&self, generation: Generation, updated: Appointment) -> bool {
        let id = updated.id.clone();
        match self.cache.patch_appointment(generation, updated).await {
            PatchOutcome::Patched => {
                self.updated(CacheSlot::Appointments);
                true
            }
            PatchOutcome::Refused => {
                warn!(
                    role = %self.role,
                    appointment = %id,
                    "Returned appointment reverses its status, re-fetching"
                );
                false
            }
            PatchOutcome::Missing | PatchOutcome::Stale => false,
        }
    }

    // =========================================================================
    // Doctor mutations
    // =========================================================================

    pub async fn toggle_availability(&self, doctor_id: &str) -> PortalResult<()> {
        let credential = self.require_credential()?;
        let result = self
            .client
            .toggle_doctor_availability(&credential, doctor_id)
            .await;
        let reply = self.mutated(Operation::ToggleDoctorAvailability, doctor_id, result).await?;
        self.succeeded(&reply, "Availability Changed");
        self.refresh_after_mutation(&[CacheSlot::Doctors, CacheSlot::Dashboard])
            .await;
        Ok(())
    }

    /// Submit the Add Doctor form.
    ///
    /// The form is reset on success and left untouched on failure; its
    /// loading flag is set for the duration of the request.
    pub async fn add_doctor(&self, form: &mut AddDoctorForm) -> PortalResult<()> {
        let credential = self.require_credential()?;
        let (doctor, image) = form.to_submission().map_err(|e| self.report_local(e))?;

        form.set_loading(true);
        let result = self.client.add_doctor(&credential, &doctor, image).await;
        form.set_loading(false);

        let reply = self.mutated(Operation::AddDoctor, &doctor.email, result).await?;
        self.succeeded(&reply, "Doctor Added");
        form.reset_after_success();
        self.refresh_after_mutation(&[CacheSlot::Doctors, CacheSlot::Dashboard])
            .await;
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    pub async fn update_profile(&self, update: &ProfileUpdate) -> PortalResult<()> {
        let credential = self.require_credential()?;
        let result = self.client.update_profile(&credential, update).await;
        let reply = self.mutated(Operation::UpdateProfile, "profile", result).await?;
        self.succeeded(&reply, "Profile Updated");
        self.refresh_after_mutation(&[CacheSlot::Profile]).await;
        Ok(())
    }

    /// Save the editor's draft; leaves edit mode on success
    pub async fn save_profile(&self, editor: &mut ProfileEditor) -> PortalResult<()> {
        let update = editor.submission().map_err(|e| self.report_local(e))?;
        self.update_profile(&update).await?;
        editor.finish_save();
        if let Some(profile) = self.cache.profile().await {
            editor.sync(&profile);
        }
        Ok(())
    }

    // =========================================================================
    // Outcome handling
    // =========================================================================

    async fn refresh_after_mutation(&self, slots: &[CacheSlot]) {
        if !self.session.is_authenticated() {
            debug!(role = %self.role, "Session ended during mutation, skipping refresh");
            return;
        }
        // Failures were already reported by the loads
        let results = join_all(slots.iter().map(|slot| self.refresh(*slot))).await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            debug!(role = %self.role, failed, "Follow-up refresh incomplete");
        }
    }

    async fn fetched<T>(
        &self,
        op: Operation,
        result: PortalResult<Reply<T>>,
    ) -> PortalResult<Reply<T>> {
        match result {
            Ok(reply) => Ok(reply),
            Err(e) => Err(self.report(op, e).await),
        }
    }

    async fn mutated<T>(
        &self,
        op: Operation,
        subject: &str,
        result: PortalResult<Reply<T>>,
    ) -> PortalResult<Reply<T>> {
        match result {
            Ok(reply) => {
                info!(role = %self.role, operation = %op, subject, "Mutation succeeded");
                Ok(reply)
            }
            Err(e) => Err(self.report(op, e).await),
        }
    }

    fn succeeded<T>(&self, reply: &Reply<T>, fallback: &str) {
        self.bus
            .notify(self.role, Level::Success, reply.message_or(fallback));
    }

    fn stored(&self, slot: CacheSlot, stored: bool) {
        if stored {
            self.updated(slot);
        } else {
            debug!(role = %self.role, ?slot, "Cache cleared while loading, response dropped");
        }
    }

    fn updated(&self, slot: CacheSlot) {
        self.bus.publish(PortalEvent::CacheUpdated {
            role: self.role,
            slot,
        });
    }

    /// Publish a failed local check; nothing was sent
    fn report_local(&self, error: PortalError) -> PortalError {
        warn!(role = %self.role, kind = error.kind(), "{}", error);
        self.bus.notify(self.role, Level::Error, error.to_string());
        error
    }

    /// Publish a failed call and apply auto-logout; returns the error
    async fn report(&self, op: Operation, error: PortalError) -> PortalError {
        match &error {
            PortalError::Duplicate(key) => {
                debug!(role = %self.role, operation = %op, "Ignoring duplicate request {}", key);
                return error;
            }
            PortalError::AuthRejected(_) if self.auto_logout => {
                warn!(role = %self.role, operation = %op, "Session rejected by backend, logging out");
                self.logout().await;
            }
            _ => {
                warn!(role = %self.role, operation = %op, kind = error.kind(), "{}", error);
            }
        }
        self.bus.notify(self.role, Level::Error, error.to_string());
        error
    }
}
