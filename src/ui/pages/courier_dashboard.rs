use dioxus::prelude::*;

use super::login::SignInRequired;
use crate::domain::{courier_stats, format_weight, AppState, CourierQueue, Role};
use crate::infra::{config::StoreHandle, repository::fetch_courier_queue};
use crate::ui::components::{
    shipment_table::RowAction,
    toast::{lifecycle_toast, push_toast, store_toast, ToastKind, ToastMessage},
    KpiCard, LoadFailed, ShipmentTable,
};

/// Pickup district used when the courier's account has none.
const FALLBACK_DISTRICT: &str = "Agdal";

#[component]
pub fn CourierDashboardPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let store = use_context::<StoreHandle>();

    let mut queue = use_signal(|| None::<CourierQueue>);
    let mut busy_id = use_signal(|| None::<String>);
    let mut reload = use_signal(|| 0u32);
    let mut load_error = use_signal(|| None::<String>);

    let district = state.with(|s| {
        s.user
            .as_ref()
            .and_then(|user| user.district.clone())
            .unwrap_or_else(|| FALLBACK_DISTRICT.to_string())
    });

    let _loader = use_resource({
        let store = store.clone();
        let district = district.clone();
        move || {
            let store = store.clone();
            let district = district.clone();
            let _generation = reload();
            async move {
                match fetch_courier_queue(&*store, &district).await {
                    Ok(loaded) => {
                        load_error.set(None);
                        queue.set(Some(loaded));
                    }
                    Err(err) => {
                        load_error.set(Some(err.to_string()));
                        let (kind, text) = store_toast(&err);
                        push_toast(toasts, kind, text);
                    }
                }
            }
        }
    });

    let collect = use_callback(move |id: String| {
        if busy_id.peek().is_some() {
            return;
        }
        let Some(mut working) = queue.peek().clone() else {
            return;
        };
        busy_id.set(Some(id.clone()));
        let store = store.clone();
        spawn(async move {
            let outcome = working
                .collect(&id, &*store)
                .await
                .map(|shipment| shipment.tracking_code.clone());
            match outcome {
                Ok(code) => {
                    push_toast(toasts, ToastKind::Success, format!("{code} collected."));
                    queue.set(Some(working));
                }
                Err(err) => {
                    let (kind, text) = lifecycle_toast(&err);
                    push_toast(toasts, kind, text);
                }
            }
            busy_id.set(None);
        });
    });

    if state.with(|s| s.role) != Some(Role::Courier) {
        return rsx! { SignInRequired { role: Role::Courier } };
    }

    let Some(current) = queue() else {
        return rsx! {
            section { class: "panel",
                if let Some(reason) = load_error() {
                    LoadFailed {
                        what: "pickups",
                        reason,
                        on_retry: move |_| {
                            load_error.set(None);
                            reload += 1;
                        },
                    }
                } else {
                    p { class: "empty", "Loading pickups for {district}…" }
                }
            }
        };
    };
    let stats = courier_stats(&current);

    rsx! {
        div { class: "stack",
            div {
                h2 { class: "page-title", "Pickups in {district}" }
                p { class: "page-subtitle", "Oldest deposits first." }
            }
            div { class: "grid-3",
                KpiCard { title: "To collect".to_string(), value: stats.to_collect.to_string() }
                KpiCard { title: "Collected".to_string(), value: stats.collected.to_string() }
                KpiCard {
                    title: "Total weight".to_string(),
                    value: format_weight(stats.total_weight_kg),
                    description: Some("across both lists".to_string()),
                }
            }
            section { class: "panel",
                h3 { class: "panel-title", "To collect" }
                ShipmentTable {
                    rows: current.to_collect().to_vec(),
                    show_sender: true,
                    action: Some(RowAction {
                        label: "Mark collected",
                        busy_id: busy_id(),
                        on_click: collect,
                    }),
                    empty_text: "Nothing waiting for pickup.",
                }
            }
            section { class: "panel",
                h3 { class: "panel-title", "Collected" }
                ShipmentTable {
                    rows: current.collected().to_vec(),
                    show_sender: true,
                    empty_text: "No parcels collected yet.",
                }
                div { class: "form-actions",
                    button {
                        class: "btn btn-ghost",
                        disabled: busy_id().is_some(),
                        onclick: move |_| reload += 1,
                        "Refresh"
                    }
                }
            }
        }
    }
}
