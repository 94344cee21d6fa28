//! Doctor profile: read-only view and the edit-mode draft

use std::fmt;

use super::format::money;
use crate::error::{PortalError, PortalResult};
use crate::models::{Doctor, ProfileUpdate};

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub name: String,
    pub headline: String,
    pub experience: String,
    pub about: String,
    pub fees: String,
    pub address: [String; 2],
    pub available: bool,
}

impl ProfileView {
    pub fn build(profile: &Doctor, currency: &str) -> Self {
        Self {
            name: profile.name.clone(),
            headline: format!("{} - {}", profile.degree, profile.speciality),
            experience: profile.experience.clone(),
            about: profile.about.clone(),
            fees: money(currency, profile.fees),
            address: [profile.address.line1.clone(), profile.address.line2.clone()],
            available: profile.available,
        }
    }
}

impl fmt::Display for ProfileView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", self.headline)?;
        writeln!(f, "Experience: {}", self.experience)?;
        if self.about.is_empty() {
            writeln!(f, "About: No description provided")?;
        } else {
            writeln!(f, "About: {}", self.about)?;
        }
        writeln!(f, "Fees: {}", self.fees)?;
        writeln!(f, "Address: {}", self.address.join(", "))?;
        let availability = if self.available {
            "Available for appointments"
        } else {
            "Not available"
        };
        writeln!(f, "{}", availability)
    }
}

/// Edit state for the profile screen.
///
/// Outside edit mode the draft tracks the last loaded profile; entering edit
/// mode freezes it so a background refresh does not overwrite user input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileEditor {
    draft: ProfileUpdate,
    editing: bool,
}

impl ProfileEditor {
    pub fn new(profile: Option<&Doctor>) -> Self {
        Self {
            draft: profile.map(Doctor::profile_update).unwrap_or_default(),
            editing: false,
        }
    }

    /// Track a freshly loaded profile unless the user is editing
    pub fn sync(&mut self, profile: &Doctor) {
        if !self.editing {
            self.draft = profile.profile_update();
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    /// Leave edit mode, restoring `profile`'s values
    pub fn cancel_edit(&mut self, profile: &Doctor) {
        self.editing = false;
        self.draft = profile.profile_update();
    }

    pub fn draft(&self) -> &ProfileUpdate {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ProfileUpdate {
        &mut self.draft
    }

    /// Body to send; only available in edit mode
    pub fn submission(&self) -> PortalResult<ProfileUpdate> {
        if !self.editing {
            return Err(PortalError::Precondition(
                "Profile is not being edited".to_string(),
            ));
        }
        Ok(self.draft.clone())
    }

    pub fn finish_save(&mut self) {
        self.editing = false;
    }
}
