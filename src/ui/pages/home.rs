use dioxus::prelude::*;

use crate::app::Route;
use crate::domain::{format_price, AppState, LinearTariff, PriceEstimator, Role};

#[component]
pub fn HomePage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let nav = use_navigator();
    let role = state.with(|s| s.role);
    let tariff = LinearTariff::default();
    let distant = tariff.distant_cities.join(", ");
    let sample = tariff
        .estimate(2.5, "Casablanca")
        .map(format_price)
        .unwrap_or_default();

    rsx! {
        div { class: "stack",
            div {
                h2 { class: "page-title", "Send, track and collect parcels across Morocco" }
                p { class: "page-subtitle",
                    "Register a parcel in a minute, follow it with its tracking code, and let couriers plan their pickups."
                }
            }

            div { class: "grid-3",
                section { class: "panel",
                    h3 { class: "panel-title", "Track a parcel" }
                    p { class: "muted", "Codes look like PM20250129001234." }
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| { nav.push(Route::Tracking {}); },
                        "Open tracking"
                    }
                }
                section { class: "panel",
                    h3 { class: "panel-title", "Pricing" }
                    p { "{tariff.base} DH + {tariff.per_kg} DH per kg" }
                    p { class: "muted", "+{tariff.distant_surcharge} DH to {distant}" }
                    p { class: "muted", "2.5 kg to Casablanca: {sample}" }
                }
                section { class: "panel",
                    match role {
                        Some(role) => rsx! {
                            h3 { class: "panel-title", "{role.emoji()} Signed in as {role.name()}" }
                            button {
                                class: "btn btn-primary",
                                onclick: move |_| { nav.push(Route::dashboard_for(role)); },
                                "Go to dashboard"
                            }
                        },
                        None => rsx! {
                            h3 { class: "panel-title", "Your space" }
                            p { class: "muted",
                                "{Role::Client.name()}, {Role::Courier.name()} or {Role::Admin.name()}."
                            }
                            div { class: "form-actions",
                                button {
                                    class: "btn btn-primary",
                                    onclick: move |_| { nav.push(Route::Login {}); },
                                    "Sign in"
                                }
                                button {
                                    class: "btn btn-ghost",
                                    onclick: move |_| { nav.push(Route::Register {}); },
                                    "Create account"
                                }
                            }
                        },
                    }
                }
            }
        }
    }
}
