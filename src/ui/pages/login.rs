use dioxus::prelude::*;

use super::error_for;
use crate::app::{persist_user_state, Route};
use crate::domain::{AppState, FieldError, LoginForm, Role};
use crate::infra::{config::StoreHandle, repository::sign_in};
use crate::ui::components::toast::{
    fields_toast, push_toast, sign_in_toast, ToastKind, ToastMessage,
};
use crate::ui::theme;

#[component]
pub fn LoginPage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let store = use_context::<StoreHandle>();
    let nav = use_navigator();

    let mut role = use_signal(|| state.peek().role.unwrap_or(Role::Client));
    let mut identifier = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut errors = use_signal(Vec::<FieldError>::new);
    let mut busy = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let form = LoginForm {
            identifier: identifier(),
            password: password(),
        };
        if let Err(fields) = form.validate() {
            let (kind, text) = fields_toast(&fields);
            push_toast(toasts, kind, text);
            errors.set(fields);
            return;
        }
        errors.set(Vec::new());
        busy.set(true);
        let chosen = role();
        let store = store.clone();
        spawn(async move {
            match sign_in(&*store, &form.identifier, chosen).await {
                Ok(user) => {
                    tracing::info!("[session] {} signed in as {}", user.email, chosen.as_str());
                    let greeting = format!("Welcome, {}.", user.first_name);
                    state.with_mut(|st| st.sign_in(chosen, user));
                    persist_user_state(&state);
                    push_toast(toasts, ToastKind::Success, greeting);
                    nav.push(Route::dashboard_for(chosen));
                }
                Err(err) => {
                    tracing::info!("[session] sign-in refused: {err}");
                    let (kind, text) = sign_in_toast(&err);
                    push_toast(toasts, kind, text);
                }
            }
            busy.set(false);
        });
    };

    let current = role();
    let identifier_error = error_for(&errors.read(), "identifier");
    let password_error = error_for(&errors.read(), "password");

    rsx! {
        div { class: "stack",
            div {
                h2 { class: "page-title", "Sign in" }
                p { class: "page-subtitle", "Pick your space, then enter your credentials." }
            }
            div { class: "role-grid",
                for option in Role::ALL {
                    button {
                        key: "{option.as_str()}",
                        class: "{theme::role_card(option == current)}",
                        onclick: move |_| role.set(option),
                        div { class: "role-emoji", "{option.emoji()}" }
                        h3 { "{option.name()}" }
                        p { class: "muted", "{option.tagline()}" }
                    }
                }
            }
            form { class: "panel", onsubmit: on_submit,
                div { class: "grid-2",
                    div { class: "field",
                        label { class: "field-label", "Email or identifier" }
                        input {
                            class: "{theme::input(identifier_error.is_some())}",
                            value: identifier(),
                            oninput: move |evt| identifier.set(evt.value()),
                        }
                        if let Some(message) = identifier_error {
                            span { class: "field-error", "{message}" }
                        }
                    }
                    div { class: "field",
                        label { class: "field-label", "Password" }
                        input {
                            class: "{theme::input(password_error.is_some())}",
                            r#type: "password",
                            value: password(),
                            oninput: move |evt| password.set(evt.value()),
                        }
                        if let Some(message) = password_error {
                            span { class: "field-error", "{message}" }
                        }
                    }
                }
                div { class: "form-actions",
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: busy(),
                        if busy() { "Signing in…" } else { "Sign in as {current.name()}" }
                    }
                    button {
                        class: "btn btn-ghost",
                        r#type: "button",
                        onclick: move |_| { nav.push(Route::Register {}); },
                        "Create a client account"
                    }
                }
                p { class: "muted",
                    "Demo accounts: ahmed.benali@email.ma, fatima.alaoui@email.ma, admin@parcel-desk.ma."
                }
            }
        }
    }
}

/// Shown in place of a dashboard when the session holds another role.
#[component]
pub fn SignInRequired(role: Role) -> Element {
    let nav = use_navigator();
    rsx! {
        section { class: "panel",
            h3 { class: "panel-title", "{role.emoji()} {role.name()} space" }
            p { class: "muted", "Sign in with a {role.name()} account to continue." }
            button {
                class: "btn btn-primary",
                onclick: move |_| { nav.push(Route::Login {}); },
                "Sign in"
            }
        }
    }
}
