use dioxus::prelude::*;

use crate::app::persist_user_state;
use crate::domain::{format_price, format_weight, AppState, TrackingInfo};
use crate::infra::{config::StoreHandle, repository::lookup_tracking};
use crate::ui::components::{
    shipment_table::format_timestamp,
    toast::{lookup_toast, push_toast, ToastMessage},
    StatusBadge,
};

#[component]
pub fn TrackingPage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let store = use_context::<StoreHandle>();

    let mut code = use_signal(|| {
        state
            .peek()
            .recent_codes
            .first()
            .map(|code| code.to_string())
            .unwrap_or_default()
    });
    let mut result = use_signal(|| None::<TrackingInfo>);
    let mut busy = use_signal(|| false);

    let search = use_callback(move |raw: String| {
        if busy() {
            return;
        }
        busy.set(true);
        let store = store.clone();
        spawn(async move {
            match lookup_tracking(&*store, &raw).await {
                Ok(info) => {
                    state.with_mut(|st| st.remember_code(info.shipment.tracking_code.clone()));
                    persist_user_state(&state);
                    result.set(Some(info));
                }
                Err(err) => {
                    result.set(None);
                    let (kind, text) = lookup_toast(&err);
                    push_toast(toasts, kind, text);
                }
            }
            busy.set(false);
        });
    });

    let recent = state.with(|st| st.recent_codes.clone());

    rsx! {
        div { class: "stack",
            div {
                h2 { class: "page-title", "Track a parcel" }
                p { class: "page-subtitle", "Enter the code printed on your receipt." }
            }
            form {
                class: "panel",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    search.call(code());
                },
                div { class: "grid-2",
                    div { class: "field",
                        label { class: "field-label", "Tracking code" }
                        input {
                            class: "input mono",
                            placeholder: "PM20250129001234",
                            value: code(),
                            oninput: move |evt| code.set(evt.value()),
                        }
                    }
                }
                div { class: "form-actions",
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: busy(),
                        if busy() { "Searching…" } else { "Track" }
                    }
                    for recent_code in recent {
                        button {
                            key: "{recent_code}",
                            class: "btn btn-ghost btn-small mono",
                            r#type: "button",
                            onclick: {
                                let raw = recent_code.to_string();
                                move |_| {
                                    code.set(raw.clone());
                                    search.call(raw.clone());
                                }
                            },
                            "{recent_code}"
                        }
                    }
                }
            }
            if let Some(info) = result() {
                TrackingResult { info }
            }
        }
    }
}

#[component]
fn TrackingResult(info: TrackingInfo) -> Element {
    let shipment = &info.shipment;
    rsx! {
        div { class: "grid-2",
            section { class: "panel",
                h3 { class: "panel-title", "Parcel" }
                p { class: "tracking-code", "{shipment.tracking_code}" }
                p { StatusBadge { status: shipment.status } }
                p { "To {shipment.recipient.name}, {shipment.destination_label()}" }
                p { class: "muted",
                    "{format_weight(shipment.weight_kg)} · {format_price(shipment.price)} · deposited {format_timestamp(shipment.created_at)}"
                }
                if let Some(delivered) = shipment.delivered_at {
                    p { class: "muted", "Delivered {format_timestamp(delivered)}" }
                }
            }
            section { class: "panel",
                h3 { class: "panel-title", "History" }
                if info.timeline.is_empty() {
                    p { class: "muted", "No scans yet. Current status: {shipment.status.label()}." }
                } else {
                    ul { class: "timeline",
                        for event in info.timeline.iter() {
                            li { class: "timeline-item",
                                span { class: "timeline-dot" }
                                strong { "{event.status.label()}" }
                                p { "{event.description}" }
                                p { class: "timeline-time",
                                    "{format_timestamp(event.occurred_at)}"
                                    if let Some(location) = event.location.as_deref() {
                                        " · {location}"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
