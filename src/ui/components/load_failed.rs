use dioxus::prelude::*;

/// Shown in place of a list whose load failed.
#[component]
pub fn LoadFailed(what: &'static str, reason: String, on_retry: EventHandler<MouseEvent>) -> Element {
    rsx! {
        div { class: "empty",
            p { "Could not load {what}." }
            p { class: "muted", "{reason}" }
            button {
                class: "btn btn-ghost btn-small",
                onclick: move |evt| on_retry.call(evt),
                "Retry"
            }
        }
    }
}
