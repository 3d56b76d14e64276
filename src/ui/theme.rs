//! Role-specific class helpers so every page picks up the same accent.

use crate::domain::{AccountStatus, Role, ShipmentStatus};

pub fn shell(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Client) => "app-shell theme-client",
        Some(Role::Courier) => "app-shell theme-courier",
        Some(Role::Admin) => "app-shell theme-admin",
        None => "app-shell",
    }
}

pub fn nav_button(active: bool) -> &'static str {
    if active {
        "nav-btn active"
    } else {
        "nav-btn"
    }
}

pub fn role_card(selected: bool) -> &'static str {
    if selected {
        "role-card selected"
    } else {
        "role-card"
    }
}

pub fn input(invalid: bool) -> &'static str {
    if invalid {
        "input invalid"
    } else {
        "input"
    }
}

pub fn select(invalid: bool) -> &'static str {
    if invalid {
        "select invalid"
    } else {
        "select"
    }
}

pub fn status_badge(status: ShipmentStatus) -> &'static str {
    match status {
        ShipmentStatus::Pending => "status-badge status-pending",
        ShipmentStatus::Collected => "status-badge status-collected",
        ShipmentStatus::InTransit => "status-badge status-in_transit",
        ShipmentStatus::OutForDelivery => "status-badge status-out_for_delivery",
        ShipmentStatus::Delivered => "status-badge status-delivered",
    }
}

pub fn status_icon(status: ShipmentStatus) -> &'static str {
    match status {
        ShipmentStatus::Pending => "⏳",
        ShipmentStatus::Collected => "📦",
        ShipmentStatus::InTransit => "🚚",
        ShipmentStatus::OutForDelivery => "🛵",
        ShipmentStatus::Delivered => "✅",
    }
}

pub fn account_badge(status: AccountStatus) -> &'static str {
    match status {
        AccountStatus::Active => "account-badge account-active",
        AccountStatus::Inactive => "account-badge account-inactive",
    }
}

/// Button that flips an account to the other status.
pub fn status_toggle(status: AccountStatus) -> (&'static str, &'static str) {
    match status {
        AccountStatus::Active => ("btn btn-danger btn-small", "Deactivate"),
        AccountStatus::Inactive => ("btn btn-ghost btn-small", "Activate"),
    }
}
