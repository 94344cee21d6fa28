use std::fmt;

use super::format::money;
use crate::models::Doctor;

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorCard {
    pub id: String,
    pub name: String,
    pub speciality: String,
    pub fees: String,
    pub available: bool,
}

impl DoctorCard {
    pub fn availability_label(&self) -> &'static str {
        if self.available {
            "Available"
        } else {
            "Unavailable"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorListView {
    pub total: usize,
    pub available_count: usize,
    pub cards: Vec<DoctorCard>,
}

impl DoctorListView {
    pub fn build(doctors: &[Doctor], currency: &str) -> Self {
        let cards: Vec<DoctorCard> = doctors
            .iter()
            .map(|d| DoctorCard {
                id: d.id.clone(),
                name: d.name.clone(),
                speciality: d.speciality.clone(),
                fees: money(currency, d.fees),
                available: d.available,
            })
            .collect();
        Self {
            total: cards.len(),
            available_count: cards.iter().filter(|c| c.available).count(),
            cards,
        }
    }
}

impl fmt::Display for DoctorListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Doctors: {} ({} Available)",
            self.total, self.available_count
        )?;
        if self.cards.is_empty() {
            return writeln!(f, "No doctors found");
        }
        for card in &self.cards {
            writeln!(
                f,
                "  {} {} - {} {} [{}]",
                card.id,
                card.name,
                card.speciality,
                card.fees,
                card.availability_label()
            )?;
        }
        Ok(())
    }
}
