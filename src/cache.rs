//! Data Cache - last successful result of each fetch, per role
//!
//! Each slot is replaced wholesale when a response arrives, so concurrent
//! fetches resolve last-write-wins in arrival order. The only in-place edit
//! is replacing a single appointment by id with a copy the backend returned.
//! Derived aggregates (dashboard counts) are never recomputed locally.
//!
//! Writes carry the [`Generation`] read before the request was issued. A
//! `clear` starts a new generation, so a response that was in flight across
//! a logout is dropped instead of refilling the cache.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::bus::CacheSlot;
use crate::models::{Appointment, DashboardSummary, Doctor, User};

/// Session epoch a cached write belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Generation(u64);

/// Result of patching one appointment in the held list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched,
    /// List not loaded, or no entry with that id
    Missing,
    /// The copy would reverse a cancelled or completed entry
    Refused,
    /// The cache was cleared since the request was issued
    Stale,
}

/// Everything cached for one role
#[derive(Debug, Clone, Default)]
pub struct CacheState {
    pub appointments: Option<Vec<Appointment>>,
    pub dashboard: Option<DashboardSummary>,
    pub profile: Option<Doctor>,
    pub doctors: Option<Vec<Doctor>>,
    pub users: Option<Vec<User>>,
    pub generation: Generation,
}

impl CacheState {
    pub fn is_loaded(&self, slot: CacheSlot) -> bool {
        match slot {
            CacheSlot::Appointments => self.appointments.is_some(),
            CacheSlot::Dashboard => self.dashboard.is_some(),
            CacheSlot::Profile => self.profile.is_some(),
            CacheSlot::Doctors => self.doctors.is_some(),
            CacheSlot::Users => self.users.is_some(),
        }
    }
}

/// Cache shared between a portal and its views
#[derive(Clone, Default)]
pub struct DataCache {
    state: Arc<RwLock<CacheState>>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state for rendering
    pub async fn snapshot(&self) -> CacheState {
        self.state.read().await.clone()
    }

    pub async fn is_loaded(&self, slot: CacheSlot) -> bool {
        self.state.read().await.is_loaded(slot)
    }

    pub async fn appointments(&self) -> Option<Vec<Appointment>> {
        self.state.read().await.appointments.clone()
    }

    pub async fn dashboard(&self) -> Option<DashboardSummary> {
        self.state.read().await.dashboard.clone()
    }

    pub async fn profile(&self) -> Option<Doctor> {
        self.state.read().await.profile.clone()
    }

    pub async fn doctors(&self) -> Option<Vec<Doctor>> {
        self.state.read().await.doctors.clone()
    }

    pub async fn users(&self) -> Option<Vec<User>> {
        self.state.read().await.users.clone()
    }

    /// Read before issuing a request; pass back when storing its result
    pub async fn generation(&self) -> Generation {
        self.state.read().await.generation
    }

    /// Returns false (and stores nothing) when `generation` is out of date
    pub async fn set_appointments(&self, generation: Generation, list: Vec<Appointment>) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        state.appointments = Some(list);
        true
    }

    pub async fn set_dashboard(&self, generation: Generation, summary: DashboardSummary) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        state.dashboard = Some(summary);
        true
    }

    pub async fn set_profile(&self, generation: Generation, profile: Doctor) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        state.profile = Some(profile);
        true
    }

    pub async fn set_doctors(&self, generation: Generation, doctors: Vec<Doctor>) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        state.doctors = Some(doctors);
        true
    }

    pub async fn set_users(&self, generation: Generation, users: Vec<User>) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        state.users = Some(users);
        true
    }

    /// Replace the held appointment with the same id.
    ///
    /// The status check and the write happen under one guard, so a list
    /// that arrived while the mutation was in flight is compared against,
    /// not overwritten blindly. Anything but `Patched` means the caller
    /// should re-fetch.
    pub async fn patch_appointment(
        &self,
        generation: Generation,
        updated: Appointment,
    ) -> PatchOutcome {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return PatchOutcome::Stale;
        }
        let Some(list) = state.appointments.as_mut() else {
            return PatchOutcome::Missing;
        };
        let Some(slot) = list.iter_mut().find(|a| a.id == updated.id) else {
            return PatchOutcome::Missing;
        };
        if !slot.transition_allowed(&updated) {
            return PatchOutcome::Refused;
        }
        *slot = updated;
        PatchOutcome::Patched
    }

    /// Drop everything and start a new generation (logout, auth rejection)
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        let Generation(n) = state.generation;
        *state = CacheState {
            generation: Generation(n + 1),
            ..CacheState::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appt(id: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn starts_empty() {
        let cache = DataCache::new();
        assert!(!cache.is_loaded(CacheSlot::Appointments).await);
        assert!(cache.dashboard().await.is_none());
        assert_eq!(cache.generation().await, Generation::default());
    }

    #[tokio::test]
    async fn later_write_replaces_slot() {
        let cache = DataCache::new();
        let generation = cache.generation().await;
        assert!(cache.set_appointments(generation, vec![appt("a1"), appt("a2")]).await);
        assert!(cache.set_appointments(generation, vec![appt("a3")]).await);

        let held = cache.appointments().await.unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].id, "a3");
    }

    #[tokio::test]
    async fn patch_replaces_by_id_and_keeps_order() {
        let cache = DataCache::new();
        let generation = cache.generation().await;
        cache
            .set_appointments(generation, vec![appt("a1"), appt("a2"), appt("a3")])
            .await;

        let accepted = Appointment {
            is_accepted: true,
            ..appt("a2")
        };
        assert_eq!(
            cache.patch_appointment(generation, accepted).await,
            PatchOutcome::Patched
        );

        let held = cache.appointments().await.unwrap();
        let ids: Vec<_> = held.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
        assert!(held[1].is_accepted);
    }

    #[tokio::test]
    async fn patch_unknown_id_reports_miss() {
        let cache = DataCache::new();
        let generation = cache.generation().await;
        assert_eq!(
            cache.patch_appointment(generation, appt("a1")).await,
            PatchOutcome::Missing
        );

        cache.set_appointments(generation, vec![appt("a1")]).await;
        assert_eq!(
            cache.patch_appointment(generation, appt("zzz")).await,
            PatchOutcome::Missing
        );
    }

    #[tokio::test]
    async fn patch_never_reverses_a_terminal_entry() {
        let cache = DataCache::new();
        let generation = cache.generation().await;
        // A fetch that landed while the accept was in flight saw it cancelled
        let cancelled = Appointment {
            cancelled: true,
            ..appt("a1")
        };
        cache.set_appointments(generation, vec![cancelled]).await;

        let accepted = Appointment {
            is_accepted: true,
            ..appt("a1")
        };
        assert_eq!(
            cache.patch_appointment(generation, accepted).await,
            PatchOutcome::Refused
        );
        let held = cache.appointments().await.unwrap();
        assert!(held[0].cancelled);
        assert!(!held[0].is_accepted);
    }

    #[tokio::test]
    async fn clear_drops_all_slots() {
        let cache = DataCache::new();
        let generation = cache.generation().await;
        cache.set_doctors(generation, vec![]).await;
        cache.set_users(generation, vec![]).await;
        cache.clear().await;

        let state = cache.snapshot().await;
        assert!(!state.is_loaded(CacheSlot::Doctors));
        assert!(!state.is_loaded(CacheSlot::Users));
        assert_ne!(state.generation, generation);
    }

    #[tokio::test]
    async fn writes_from_before_a_clear_are_dropped() {
        let cache = DataCache::new();
        let before = cache.generation().await;
        cache.set_appointments(before, vec![appt("a1")]).await;
        cache.clear().await;

        assert!(!cache.set_doctors(before, vec![Doctor::default()]).await);
        assert!(!cache.is_loaded(CacheSlot::Doctors).await);
        assert_eq!(
            cache.patch_appointment(before, appt("a1")).await,
            PatchOutcome::Stale
        );

        let current = cache.generation().await;
        assert!(cache.set_doctors(current, vec![Doctor::default()]).await);
    }
}
