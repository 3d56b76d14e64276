use dioxus::prelude::*;

use super::login::SignInRequired;
use crate::domain::{
    admin_stats, format_price, AdminRoster, AppState, LinearTariff, Role, Shipment,
    TariffTable, User,
};
use crate::infra::{
    config::StoreHandle,
    repository::{fetch_all_shipments, fetch_tariffs, fetch_users},
};
use crate::ui::components::{
    toast::{push_toast, store_toast, ToastKind, ToastMessage},
    AccountBadge, KpiCard, LoadFailed, ShipmentTable,
};
use crate::ui::theme;

/// Everything the overview needs, loaded in one round.
#[derive(Clone, Debug, PartialEq)]
struct Overview {
    shipments: Vec<Shipment>,
    tariffs: TariffTable,
}

#[component]
pub fn AdminDashboardPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let store = use_context::<StoreHandle>();

    let mut roster = use_signal(|| None::<AdminRoster>);
    let mut overview = use_signal(|| None::<Overview>);
    let mut pending_toggle = use_signal(|| None::<User>);
    let mut busy = use_signal(|| false);
    let mut reload = use_signal(|| 0u32);
    let mut load_error = use_signal(|| None::<String>);

    let _loader = use_resource({
        let store = store.clone();
        move || {
            let store = store.clone();
            let _generation = reload();
            async move {
                let (users, shipments, tariffs) = tokio::join!(
                    fetch_users(&*store),
                    fetch_all_shipments(&*store),
                    fetch_tariffs(&*store),
                );
                let loaded = users.and_then(|users| {
                    Ok((users, Overview { shipments: shipments?, tariffs: tariffs? }))
                });
                match loaded {
                    Ok((users, loaded)) => {
                        load_error.set(None);
                        roster.set(Some(AdminRoster::new(users)));
                        overview.set(Some(loaded));
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

    let confirm_toggle = move |_: MouseEvent| {
        let Some(user) = pending_toggle() else {
            return;
        };
        let Some(mut working) = roster.peek().clone() else {
            return;
        };
        busy.set(true);
        let store = store.clone();
        spawn(async move {
            match working.toggle_status(&user.id, &*store).await {
                Ok(status) => {
                    tracing::info!("[admin] user {} is now {}", user.id, status.label());
                    push_toast(
                        toasts,
                        ToastKind::Success,
                        format!("{} is now {}.", user.full_name(), status.label().to_lowercase()),
                    );
                    roster.set(Some(working));
                }
                Err(err) => {
                    let (kind, text) = store_toast(&err);
                    push_toast(toasts, kind, text);
                }
            }
            pending_toggle.set(None);
            busy.set(false);
        });
    };

    if state.with(|s| s.role) != Some(Role::Admin) {
        return rsx! { SignInRequired { role: Role::Admin } };
    }

    let (Some(users), Some(loaded)) = (roster(), overview()) else {
        return rsx! {
            section { class: "panel",
                if let Some(reason) = load_error() {
                    LoadFailed {
                        what: "the overview",
                        reason,
                        on_retry: move |_| {
                            load_error.set(None);
                            reload += 1;
                        },
                    }
                } else {
                    p { class: "empty", "Loading overview…" }
                }
            }
        };
    };
    let stats = admin_stats(users.users(), &loaded.shipments);
    let linear = LinearTariff::default();

    rsx! {
        div { class: "stack",
            div {
                h2 { class: "page-title", "Overview" }
                p { class: "page-subtitle", "Accounts, parcels and tariffs across every district." }
            }
            div { class: "grid-4",
                KpiCard { title: "Clients".to_string(), value: stats.clients.to_string() }
                KpiCard { title: "Couriers".to_string(), value: stats.couriers.to_string() }
                KpiCard { title: "Parcels".to_string(), value: stats.shipments.to_string() }
                KpiCard {
                    title: "Revenue".to_string(),
                    value: format_price(stats.revenue),
                    description: Some("sum of parcel prices".to_string()),
                }
            }
            section { class: "panel",
                h3 { class: "panel-title", "Accounts" }
                table { class: "data-table",
                    thead {
                        tr {
                            th { "Name" }
                            th { "Email" }
                            th { "Role" }
                            th { "City" }
                            th { "Status" }
                            th { "" }
                        }
                    }
                    tbody {
                        for user in users.users().iter().cloned() {
                            tr { key: "{user.id}",
                                td { "{user.full_name()}" }
                                td { class: "mono", "{user.email}" }
                                td { "{user.role.name()}" }
                                td { "{user.city.clone().unwrap_or_default()}" }
                                td { AccountBadge { status: user.status } }
                                td {
                                    button {
                                        class: "{theme::status_toggle(user.status).0}",
                                        disabled: busy(),
                                        onclick: {
                                            let user = user.clone();
                                            move |_| pending_toggle.set(Some(user.clone()))
                                        },
                                        "{theme::status_toggle(user.status).1}"
                                    }
                                }
                            }
                        }
                    }
                }
            }
            section { class: "panel",
                h3 { class: "panel-title", "Tariff grid" }
                if loaded.tariffs.rules().is_empty() {
                    p { class: "empty", "No tariff rows configured." }
                } else {
                    table { class: "data-table",
                        thead {
                            tr {
                                th { "City" }
                                th { "Weight" }
                                th { "Grid price" }
                                th { "Formula at max weight" }
                            }
                        }
                        tbody {
                            for rule in loaded.tariffs.rules().iter() {
                                tr { key: "{rule.id}",
                                    td { "{rule.city}" }
                                    td { "{rule.weight_min_kg} – {rule.weight_max_kg} kg" }
                                    td { "{format_price(rule.price)}" }
                                    td { class: "muted",
                                        {
                                            linear
                                                .price(rule.weight_max_kg, &rule.city)
                                                .map(format_price)
                                                .unwrap_or_else(|| "n/a".to_string())
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            section { class: "panel",
                h3 { class: "panel-title", "All parcels" }
                ShipmentTable {
                    rows: loaded.shipments.clone(),
                    show_sender: true,
                    empty_text: "No parcels registered yet.",
                }
            }
            if let Some(user) = pending_toggle() {
                div { class: "overlay",
                    div { class: "dialog",
                        h3 { class: "panel-title", "Change account status" }
                        p {
                            "Set {user.full_name()} to "
                            strong { "{user.status.toggled().label()}" }
                            "?"
                        }
                        div { class: "form-actions",
                            button {
                                class: "btn btn-primary",
                                disabled: busy(),
                                onclick: confirm_toggle,
                                if busy() { "Saving…" } else { "Confirm" }
                            }
                            button {
                                class: "btn btn-ghost",
                                disabled: busy(),
                                onclick: move |_| pending_toggle.set(None),
                                "Cancel"
                            }
                        }
                    }
                }
            }
        }
    }
}
