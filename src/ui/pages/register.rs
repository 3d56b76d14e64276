use dioxus::prelude::*;

use super::error_for;
use crate::app::Route;
use crate::domain::{register_client, tracking::today, FieldError, RegistrationForm, CITIES};
use crate::infra::{config::StoreHandle, repository::insert_user};
use crate::ui::components::toast::{fields_toast, push_toast, store_toast, ToastKind, ToastMessage};
use crate::ui::theme;

#[derive(Clone, PartialEq)]
struct Created {
    email: String,
    initial_password: String,
}

#[component]
pub fn RegisterPage() -> Element {
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let store = use_context::<StoreHandle>();
    let nav = use_navigator();

    let mut form = use_signal(RegistrationForm::default);
    let mut errors = use_signal(Vec::<FieldError>::new);
    let mut busy = use_signal(|| false);
    let mut created = use_signal(|| None::<Created>);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let registration = match register_client(&form.read(), today(), &mut rand::thread_rng()) {
            Ok(registration) => registration,
            Err(fields) => {
                let (kind, text) = fields_toast(&fields);
                push_toast(toasts, kind, text);
                errors.set(fields);
                return;
            }
        };
        errors.set(Vec::new());
        busy.set(true);
        let store = store.clone();
        spawn(async move {
            match insert_user(&*store, &registration.user).await {
                Ok(user) => {
                    tracing::info!("[registration] created client {}", user.id);
                    push_toast(
                        toasts,
                        ToastKind::Success,
                        format!("Account created for {}.", user.full_name()),
                    );
                    created.set(Some(Created {
                        email: user.email,
                        initial_password: registration.initial_password,
                    }));
                    form.set(RegistrationForm::default());
                }
                Err(err) => {
                    let (kind, text) = store_toast(&err);
                    push_toast(toasts, kind, text);
                }
            }
            busy.set(false);
        });
    };

    if let Some(account) = created() {
        return rsx! {
            section { class: "panel",
                h3 { class: "panel-title", "Account created" }
                p { "Sign in as a client with " strong { "{account.email}" } "." }
                p { "Initial password: " span { class: "tracking-code", "{account.initial_password}" } }
                p { class: "muted", "It is shown only once. Keep it somewhere safe." }
                div { class: "form-actions",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| { nav.push(Route::Login {}); },
                        "Go to sign in"
                    }
                    button {
                        class: "btn btn-ghost",
                        onclick: move |_| created.set(None),
                        "Register someone else"
                    }
                }
            }
        };
    }

    let current = form();
    let errs = errors();

    rsx! {
        div { class: "stack",
            div {
                h2 { class: "page-title", "Create a client account" }
                p { class: "page-subtitle", "Parcels are picked up from the address you give here." }
            }
            form { class: "panel", onsubmit: on_submit,
                div { class: "grid-2",
                    TextField {
                        label: "Last name",
                        value: current.last_name.clone(),
                        error: error_for(&errs, "last_name"),
                        oninput: move |value| form.with_mut(|f| f.last_name = value),
                    }
                    TextField {
                        label: "First name",
                        value: current.first_name.clone(),
                        error: error_for(&errs, "first_name"),
                        oninput: move |value| form.with_mut(|f| f.first_name = value),
                    }
                    TextField {
                        label: "National ID",
                        value: current.national_id.clone(),
                        placeholder: "AB123456",
                        error: error_for(&errs, "national_id"),
                        oninput: move |value| form.with_mut(|f| f.national_id = value),
                    }
                    TextField {
                        label: "Email",
                        value: current.email.clone(),
                        error: error_for(&errs, "email"),
                        oninput: move |value| form.with_mut(|f| f.email = value),
                    }
                    TextField {
                        label: "Phone",
                        value: current.phone.clone(),
                        placeholder: "+212612345678",
                        error: error_for(&errs, "phone"),
                        oninput: move |value| form.with_mut(|f| f.phone = value),
                    }
                    TextField {
                        label: "Address",
                        value: current.address.clone(),
                        error: error_for(&errs, "address"),
                        oninput: move |value| form.with_mut(|f| f.address = value),
                    }
                    CitySelect {
                        value: current.city.clone(),
                        error: error_for(&errs, "city"),
                        onchange: move |value| form.with_mut(|f| f.city = value),
                    }
                    TextField {
                        label: "District",
                        value: current.district.clone(),
                        error: error_for(&errs, "district"),
                        oninput: move |value| form.with_mut(|f| f.district = value),
                    }
                }
                div { class: "form-actions",
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: busy(),
                        if busy() { "Creating…" } else { "Create account" }
                    }
                }
            }
        }
    }
}

#[component]
pub fn TextField(
    label: &'static str,
    value: String,
    #[props(default)] placeholder: &'static str,
    error: Option<&'static str>,
    oninput: EventHandler<String>,
) -> Element {
    rsx! {
        div { class: "field",
            label { class: "field-label", "{label}" }
            input {
                class: "{theme::input(error.is_some())}",
                value: "{value}",
                placeholder: "{placeholder}",
                oninput: move |evt| oninput.call(evt.value()),
            }
            if let Some(message) = error {
                span { class: "field-error", "{message}" }
            }
        }
    }
}

#[component]
pub fn CitySelect(value: String, error: Option<&'static str>, onchange: EventHandler<String>) -> Element {
    rsx! {
        div { class: "field",
            label { class: "field-label", "City" }
            select {
                class: "{theme::select(error.is_some())}",
                value: "{value}",
                onchange: move |evt| onchange.call(evt.value()),
                option { value: "", "Select a city" }
                for city in CITIES {
                    option { key: "{city}", value: "{city}", selected: city == value, "{city}" }
                }
            }
            if let Some(message) = error {
                span { class: "field-error", "{message}" }
            }
        }
    }
}
