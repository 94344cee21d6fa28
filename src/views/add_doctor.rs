//! Add Doctor form

use crate::error::{PortalError, PortalResult};
use crate::models::{Address, NewDoctor, Upload};

pub const EXPERIENCE_OPTIONS: [&str; 9] = [
    "1 Year", "2 Year", "3 Year", "4 Year", "5 Year", "6 Year", "8 Year", "9 Year", "10 Year",
];

pub const SPECIALITY_OPTIONS: [&str; 6] = [
    "General physician",
    "Gynecologist",
    "Dermatologist",
    "Pediatricians",
    "Neurologist",
    "Gastroenterologist",
];

/// Form state for creating a doctor.
///
/// Fees are kept as typed text until submission.
#[derive(Debug, Clone, PartialEq)]
pub struct AddDoctorForm {
    pub image: Option<Upload>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub experience: String,
    pub fees: String,
    pub about: String,
    pub speciality: String,
    pub degree: String,
    pub address1: String,
    pub address2: String,
    loading: bool,
}

impl Default for AddDoctorForm {
    fn default() -> Self {
        Self {
            image: None,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            experience: EXPERIENCE_OPTIONS[0].to_string(),
            fees: String::new(),
            about: String::new(),
            speciality: SPECIALITY_OPTIONS[0].to_string(),
            degree: String::new(),
            address1: String::new(),
            address2: String::new(),
            loading: false,
        }
    }
}

impl AddDoctorForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a submission is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Local checks before anything is sent
    pub fn to_submission(&self) -> PortalResult<(NewDoctor, Upload)> {
        let image = self
            .image
            .clone()
            .ok_or_else(|| PortalError::Precondition("Image Not Selected".to_string()))?;

        let fees_text = self.fees.trim();
        let fees = if fees_text.is_empty() {
            0.0
        } else {
            fees_text
                .parse::<f64>()
                .map_err(|_| PortalError::Precondition(format!("Invalid fees: {}", fees_text)))?
        };

        let doctor = NewDoctor {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            experience: self.experience.clone(),
            fees,
            about: self.about.clone(),
            speciality: self.speciality.clone(),
            degree: self.degree.clone(),
            address: Address {
                line1: self.address1.clone(),
                line2: self.address2.clone(),
            },
        };
        Ok((doctor, image))
    }

    /// Clear the entered values after a successful submission.
    ///
    /// Experience and speciality keep their selection.
    pub fn reset_after_success(&mut self) {
        let experience = std::mem::take(&mut self.experience);
        let speciality = std::mem::take(&mut self.speciality);
        *self = Self {
            experience,
            speciality,
            loading: self.loading,
            ..Self::default()
        };
    }
}
