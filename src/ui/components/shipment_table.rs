use dioxus::prelude::*;
use time::{macros::format_description, OffsetDateTime};

use super::status_badge::StatusBadge;
use crate::domain::{format_price, format_weight, Shipment};

/// `29/01/2024 10:30`
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
        .unwrap_or_else(|_| at.date().to_string())
}

#[derive(Clone, PartialEq)]
pub struct RowAction {
    pub label: &'static str,
    /// Shipment whose action is in flight; its button is disabled.
    pub busy_id: Option<String>,
    pub on_click: EventHandler<String>,
}

#[component]
pub fn ShipmentTable(
    rows: Vec<Shipment>,
    #[props(default)] show_sender: bool,
    #[props(default)] action: Option<RowAction>,
    empty_text: &'static str,
) -> Element {
    if rows.is_empty() {
        return rsx! {
            p { class: "empty", "{empty_text}" }
        };
    }

    rsx! {
        table {
            class: "data-table",
            thead {
                tr {
                    th { "Code" }
                    if show_sender {
                        th { "Sender" }
                    }
                    th { "Recipient" }
                    th { "Destination" }
                    th { "Weight" }
                    th { "Price" }
                    th { "Status" }
                    th { "Deposited" }
                    if action.is_some() {
                        th {}
                    }
                }
            }
            tbody {
                for shipment in rows {
                    tr {
                        key: "{shipment.id}",
                        td { class: "mono", "{shipment.tracking_code}" }
                        if show_sender {
                            td {
                                "{shipment.sender_name.clone().unwrap_or_default()}"
                                if let Some(address) = shipment.pickup_address.clone() {
                                    div { class: "muted", "{address}" }
                                }
                            }
                        }
                        td {
                            "{shipment.recipient.name}"
                            div { class: "muted", "{shipment.recipient.phone}" }
                        }
                        td { "{shipment.destination_label()}" }
                        td { "{format_weight(shipment.weight_kg)}" }
                        td { "{format_price(shipment.price)}" }
                        td { StatusBadge { status: shipment.status } }
                        td { class: "muted", "{format_timestamp(shipment.created_at)}" }
                        if let Some(action) = action.clone() {
                            td {
                                button {
                                    class: "btn btn-primary btn-small",
                                    disabled: action.busy_id.as_deref() == Some(shipment.id.as_str()),
                                    onclick: {
                                        let id = shipment.id.clone();
                                        let on_click = action.on_click;
                                        move |_| on_click.call(id.clone())
                                    },
                                    "{action.label}"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn timestamps_use_day_first() {
        assert_eq!(
            format_timestamp(datetime!(2024-01-29 08:05 UTC)),
            "29/01/2024 08:05"
        );
    }
}
