//! Navbar and sidebar

use std::fmt;

use crate::role::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub route: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavView {
    pub title: &'static str,
    pub role_label: &'static str,
    pub items: Vec<NavItem>,
}

impl NavView {
    pub fn build(role: Role, current_route: &str) -> Self {
        let items = role
            .menu()
            .iter()
            .map(|entry| NavItem {
                route: entry.route,
                label: entry.label,
                description: entry.description,
                active: entry.route == current_route,
            })
            .collect();
        Self {
            title: role.panel_title(),
            role_label: role.label(),
            items,
        }
    }
}

impl fmt::Display for NavView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.title, self.role_label)?;
        for item in &self.items {
            let marker = if item.active { '*' } else { ' ' };
            writeln!(f, " {} {:<14} {}", marker, item.label, item.route)?;
        }
        Ok(())
    }
}
