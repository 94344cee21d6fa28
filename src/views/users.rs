use std::fmt;

use crate::models::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    /// Both address lines joined, when the user has an address
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListView {
    pub rows: Vec<UserRow>,
}

impl UserListView {
    pub fn build(users: &[User]) -> Self {
        let rows = users
            .iter()
            .map(|u| UserRow {
                id: u.id.clone(),
                name: u.name.clone(),
                email: u.email.clone(),
                phone: u.phone.clone(),
                gender: u.gender.clone(),
                address: u
                    .address
                    .as_ref()
                    .map(|a| format!("{} {}", a.line1, a.line2).trim().to_string())
                    .filter(|a| !a.is_empty()),
            })
            .collect();
        Self { rows }
    }
}

impl fmt::Display for UserListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Users: {}", self.rows.len())?;
        for row in &self.rows {
            write!(f, "  {} {} <{}> {}", row.id, row.name, row.email, row.phone)?;
            if !row.gender.is_empty() {
                write!(f, " {}", row.gender)?;
            }
            if let Some(address) = &row.address {
                write!(f, " | {}", address)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
