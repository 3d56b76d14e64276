use dioxus::prelude::*;

use super::login::SignInRequired;
use crate::app::Route;
use crate::domain::{client_stats, format_price, AppState, Role, User};
use crate::infra::{config::StoreHandle, repository::fetch_client_shipments};
use crate::ui::components::{
    toast::{push_toast, store_toast, ToastMessage},
    KpiCard, LoadFailed, ShipmentTable,
};

#[component]
pub fn ClientDashboardPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let store = use_context::<StoreHandle>();
    let nav = use_navigator();
    let mut reload = use_signal(|| 0u32);

    let shipments = use_resource(move || {
        let store = store.clone();
        let _generation = reload();
        let sender_id = state.with(|s| {
            s.user
                .as_ref()
                .filter(|_| s.role == Some(Role::Client))
                .map(|user| user.id.clone())
        });
        async move {
            let sender_id = sender_id?;
            let loaded = fetch_client_shipments(&*store, &sender_id).await;
            if let Err(err) = &loaded {
                let (kind, text) = store_toast(err);
                push_toast(toasts, kind, text);
            }
            Some(loaded.map_err(|err| err.to_string()))
        }
    });

    let Some(user) = state.with(|s| s.user.clone().filter(|_| s.role == Some(Role::Client)))
    else {
        return rsx! { SignInRequired { role: Role::Client } };
    };

    let outcome = shipments.read().clone().flatten();
    let rows = match &outcome {
        Some(Ok(rows)) => rows.clone(),
        _ => Vec::new(),
    };
    let stats = client_stats(&rows);

    rsx! {
        div { class: "stack",
            div {
                h2 { class: "page-title", "Hello, {user.first_name}" }
                p { class: "page-subtitle", "Your parcels, newest first." }
            }
            div { class: "grid-4",
                KpiCard { title: "Parcels".to_string(), value: stats.total.to_string() }
                KpiCard { title: "In progress".to_string(), value: stats.in_progress.to_string() }
                KpiCard { title: "Delivered".to_string(), value: stats.delivered.to_string() }
                KpiCard { title: "Total spent".to_string(), value: format_price(stats.total_spent) }
            }
            section { class: "panel",
                h3 { class: "panel-title", "My parcels" }
                match outcome {
                    None => rsx! { p { class: "empty", "Loading parcels…" } },
                    Some(Err(reason)) => rsx! {
                        LoadFailed { what: "your parcels", reason, on_retry: move |_| reload += 1 }
                    },
                    Some(Ok(rows)) => rsx! { ShipmentTable { rows, empty_text: "No parcels yet." } },
                }
                div { class: "form-actions",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| { nav.push(Route::NewPackage {}); },
                        "New parcel"
                    }
                }
            }
            ProfileCard { user }
        }
    }
}

/// Read-only account details as the desk holds them.
#[component]
fn ProfileCard(user: User) -> Element {
    let phone = user.phone.clone().unwrap_or_else(|| "not given".to_string());
    let national_id = user.national_id.clone().unwrap_or_else(|| "not given".to_string());
    let address = user.postal_address();

    rsx! {
        section { class: "panel",
            h3 { class: "panel-title", "My profile" }
            div { class: "grid-2",
                ProfileField { label: "Full name", value: user.full_name() }
                ProfileField { label: "Email", value: user.email.clone() }
                ProfileField { label: "Phone", value: phone }
                ProfileField { label: "National ID", value: national_id }
                ProfileField { label: "Address", value: address }
            }
        }
    }
}

#[component]
fn ProfileField(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "field",
            span { class: "field-label", "{label}" }
            p { "{value}" }
        }
    }
}
