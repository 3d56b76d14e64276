use dioxus::prelude::*;

use crate::app::{persist_user_state, Route};
use crate::domain::{AppState, Role};
use crate::ui::components::toast::{push_toast, ToastKind, ToastMessage};
use crate::ui::theme;
use crate::util::version::{version_label, APP_NAME};

#[component]
pub fn Shell(children: Element) -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let role = state.with(|s| s.role);
    let user_name = state.with(|s| s.user.as_ref().map(|user| user.full_name()));

    let current_route = use_route::<Route>();
    let nav = use_navigator();

    let tagline = role
        .map(|role| role.tagline())
        .unwrap_or("Parcel intake, tracking and pickup");
    let brand_emoji = role.map(|role| role.emoji()).unwrap_or("📮");

    let on_sign_out = {
        let mut state = state;
        move |_: MouseEvent| {
            state.with_mut(|s| s.sign_out());
            persist_user_state(&state);
            push_toast(toasts, ToastKind::Info, "Signed out.");
            nav.push(Route::Home {});
        }
    };

    rsx! {
        div { class: "{theme::shell(role)}",
            header { class: "app-header",
                div { class: "header-inner",
                    div {
                        class: "brand",
                        onclick: move |_| { nav.push(Route::Home {}); },
                        span { class: "brand-emoji", "{brand_emoji}" }
                        div {
                            h1 { class: "brand-title", "{APP_NAME}" }
                            p { class: "brand-tagline", "{tagline}" }
                        }
                    }

                    nav { class: "nav",
                        match role {
                            Some(Role::Client) => rsx! {
                                NavButton { active: matches!(current_route, Route::ClientDashboard {}), onclick: move |_| { nav.push(Route::ClientDashboard {}); }, label: "📋 My parcels" }
                                NavButton { active: matches!(current_route, Route::NewPackage {}), onclick: move |_| { nav.push(Route::NewPackage {}); }, label: "➕ New parcel" }
                            },
                            Some(Role::Courier) => rsx! {
                                NavButton { active: matches!(current_route, Route::CourierDashboard {}), onclick: move |_| { nav.push(Route::CourierDashboard {}); }, label: "🚚 Pickups" }
                            },
                            Some(Role::Admin) => rsx! {
                                NavButton { active: matches!(current_route, Route::AdminDashboard {}), onclick: move |_| { nav.push(Route::AdminDashboard {}); }, label: "🛡️ Overview" }
                            },
                            None => rsx! {
                                NavButton { active: matches!(current_route, Route::Login {}), onclick: move |_| { nav.push(Route::Login {}); }, label: "Sign in" }
                                NavButton { active: matches!(current_route, Route::Register {}), onclick: move |_| { nav.push(Route::Register {}); }, label: "Create account" }
                            },
                        }
                        NavButton { active: matches!(current_route, Route::Tracking {}), onclick: move |_| { nav.push(Route::Tracking {}); }, label: "🔎 Track" }
                        if role.is_some() {
                            button {
                                class: "nav-btn",
                                title: user_name.clone().unwrap_or_default(),
                                onclick: on_sign_out,
                                "Sign out"
                            }
                        }
                    }
                }
            }
            main { class: "app-main",
                {children}
            }
            footer { class: "app-footer", "{APP_NAME} {version_label()}" }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    rsx! {
        button {
            class: "{theme::nav_button(active)}",
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
