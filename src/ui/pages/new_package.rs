use dioxus::prelude::*;
use time::OffsetDateTime;

use super::error_for;
use super::login::SignInRequired;
use super::register::{CitySelect, TextField};
use crate::app::{persist_user_state, Route};
use crate::domain::{
    estimate_from_input, format_price, prepare_shipment, AppState, FieldError, IntakeError,
    IntakeForm, LinearTariff, PriceEstimator, Role, Shipment,
};
use crate::infra::{config::StoreHandle, repository::insert_shipment};
use crate::ui::components::toast::{intake_toast, push_toast, store_toast, ToastKind, ToastMessage};

#[component]
pub fn NewPackagePage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let store = use_context::<StoreHandle>();
    let nav = use_navigator();

    let mut form = use_signal(IntakeForm::default);
    let mut errors = use_signal(Vec::<FieldError>::new);
    let mut busy = use_signal(|| false);
    let mut created = use_signal(|| None::<Shipment>);
    let tariff = use_hook(LinearTariff::default);

    let sender = state.with(|s| {
        s.user
            .clone()
            .filter(|_| s.role == Some(Role::Client))
    });
    let Some(sender) = sender else {
        return rsx! { SignInRequired { role: Role::Client } };
    };
    let pickup_address = sender.address.clone().unwrap_or_default();

    let on_submit = {
        let tariff = tariff.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if busy() {
                return;
            }
            let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
            let prepared =
                prepare_shipment(&form.read(), &sender, &tariff, now, &mut rand::thread_rng());
            let new_shipment = match prepared {
                Ok(new_shipment) => new_shipment,
                Err(err) => {
                    let (kind, text) = intake_toast(&err);
                    push_toast(toasts, kind, text);
                    if let IntakeError::Invalid(fields) = err {
                        errors.set(fields);
                    }
                    return;
                }
            };
            errors.set(Vec::new());
            busy.set(true);
            let store = store.clone();
            spawn(async move {
                match insert_shipment(&*store, &new_shipment).await {
                    Ok(stored) => {
                        push_toast(
                            toasts,
                            ToastKind::Success,
                            format!("Parcel registered: {}", stored.tracking_code),
                        );
                        state.with_mut(|st| st.remember_code(stored.tracking_code.clone()));
                        persist_user_state(&state);
                        form.set(IntakeForm::default());
                        created.set(Some(stored));
                    }
                    Err(err) => {
                        let (kind, text) = store_toast(&err);
                        push_toast(toasts, kind, text);
                    }
                }
                busy.set(false);
            });
        }
    };

    if let Some(shipment) = created() {
        return rsx! {
            section { class: "panel",
                h3 { class: "panel-title", "Parcel registered" }
                p { "Tracking code" }
                p { class: "tracking-code", "{shipment.tracking_code}" }
                p { class: "muted",
                    "{shipment.recipient.name}, {shipment.destination_label()}: {format_price(shipment.price)}. A courier will pick it up from your address."
                }
                div { class: "form-actions",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| { nav.push(Route::Tracking {}); },
                        "Track it"
                    }
                    button {
                        class: "btn btn-ghost",
                        onclick: move |_| created.set(None),
                        "Register another"
                    }
                }
            }
        };
    }

    let current = form();
    let errs = errors();
    let estimate = estimate_from_input(&tariff, Some(current.weight.as_str()), Some(current.city.as_str()));
    let surcharge_note = tariff
        .is_distant(&current.city)
        .then(|| format!("includes the {} DH distance surcharge", tariff.distant_surcharge));

    rsx! {
        div { class: "stack",
            div {
                h2 { class: "page-title", "New parcel" }
                p { class: "page-subtitle", "Pickup from {pickup_address}" }
            }
            form { class: "panel", onsubmit: on_submit,
                div { class: "grid-2",
                    TextField {
                        label: "Recipient name",
                        value: current.recipient_name.clone(),
                        error: error_for(&errs, "recipient_name"),
                        oninput: move |value| form.with_mut(|f| f.recipient_name = value),
                    }
                    TextField {
                        label: "Recipient phone",
                        value: current.recipient_phone.clone(),
                        placeholder: "0612345678",
                        error: error_for(&errs, "recipient_phone"),
                        oninput: move |value| form.with_mut(|f| f.recipient_phone = value),
                    }
                    TextField {
                        label: "Recipient address",
                        value: current.recipient_address.clone(),
                        error: error_for(&errs, "recipient_address"),
                        oninput: move |value| form.with_mut(|f| f.recipient_address = value),
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
                    TextField {
                        label: "Weight (kg)",
                        value: current.weight.clone(),
                        placeholder: "2.5",
                        error: error_for(&errs, "weight"),
                        oninput: move |value| form.with_mut(|f| f.weight = value),
                    }
                }
                div { class: "field",
                    label { class: "field-label", "Description (optional)" }
                    textarea {
                        class: "textarea",
                        rows: "2",
                        value: "{current.description}",
                        oninput: move |evt| form.with_mut(|f| f.description = evt.value()),
                    }
                }
                div { class: "estimate-box",
                    p { class: "muted", "{tariff.name()} estimate" }
                    match estimate {
                        Some(price) => rsx! {
                            p { class: "estimate-value", "{format_price(price)}" }
                            if let Some(note) = surcharge_note {
                                p { class: "muted", "{note}" }
                            }
                        },
                        None => rsx! {
                            p { class: "muted", "Enter a weight and pick a city." }
                        },
                    }
                }
                div { class: "form-actions",
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: busy(),
                        if busy() { "Registering…" } else { "Register parcel" }
                    }
                }
            }
        }
    }
}
