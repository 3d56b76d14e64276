use dioxus::prelude::*;

use crate::domain::{AccountStatus, ShipmentStatus};
use crate::ui::theme;

#[component]
pub fn StatusBadge(status: ShipmentStatus) -> Element {
    rsx! {
        span {
            class: "{theme::status_badge(status)}",
            "{theme::status_icon(status)} {status.label()}"
        }
    }
}

#[component]
pub fn AccountBadge(status: AccountStatus) -> Element {
    rsx! {
        span { class: "{theme::account_badge(status)}", "{status.label()}" }
    }
}
