//! Display formatting shared by the views

use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `20_1_2025` -> `20 Jan 2025`.
///
/// Input that does not have three `_`-separated parts with a valid month is
/// returned unchanged.
pub fn slot_date_format(slot_date: &str) -> String {
    let parts: Vec<&str> = slot_date.split('_').collect();
    if let [day, month, year] = parts.as_slice() {
        if let Some(name) = month
            .parse::<usize>()
            .ok()
            .and_then(|m| m.checked_sub(1))
            .and_then(|m| MONTHS.get(m))
        {
            return format!("{} {} {}", day, name, year);
        }
    }
    slot_date.to_string()
}

/// Whole years between `dob` (`YYYY-MM-DD`) and `today`
pub fn calculate_age(dob: &str, today: NaiveDate) -> Option<u32> {
    let born = NaiveDate::parse_from_str(dob.trim(), "%Y-%m-%d").ok()?;
    if born > today {
        return None;
    }
    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

/// `$50`, `$12.50`
pub fn money(currency: &str, amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}{:.0}", currency, amount)
    } else {
        format!("{}{:.2}", currency, amount)
    }
}

/// `1 Appointment`, `3 Appointments`
pub fn count_label(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
