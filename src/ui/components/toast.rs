use std::time::Duration;

use dioxus::prelude::*;

use crate::domain::{
    FieldError, IntakeError, LifecycleError, LookupError, SignInError, StoreError,
    TrackingCodeError,
};
use crate::util::generate_id;

const TOAST_AUTO_DISMISS: Duration = Duration::from_secs(6);
const TOAST_LIMIT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToastMessage {
    pub id: String,
    pub kind: ToastKind,
    pub text: String,
}

impl ToastMessage {
    pub fn new(kind: ToastKind, text: impl Into<String>) -> Self {
        Self {
            id: generate_id("toast"),
            kind,
            text: text.into(),
        }
    }
}

/// Appends `message`, evicting the oldest entry once the queue is full.
fn enqueue(entries: &mut Vec<ToastMessage>, message: ToastMessage) {
    if entries.len() >= TOAST_LIMIT {
        entries.remove(0);
    }
    entries.push(message);
}

pub fn push_toast(
    mut toasts: Signal<Vec<ToastMessage>>,
    kind: ToastKind,
    message: impl Into<String>,
) {
    let text = message.into();
    match kind {
        ToastKind::Error => tracing::warn!("[toast] {text}"),
        _ => tracing::debug!("[toast] {text}"),
    }
    toasts.with_mut(|entries| enqueue(entries, ToastMessage::new(kind, text)));
}

pub fn store_toast(err: &StoreError) -> (ToastKind, String) {
    let text = match err {
        StoreError::Unavailable | StoreError::Http(_) => {
            "The parcel service is unreachable. Please try again.".to_string()
        }
        StoreError::MissingRecord { table, id } => format!("No {table} record {id} found."),
        StoreError::Decode { table, .. } => format!("The service returned unreadable {table} data."),
        StoreError::InvalidUrl(_) | StoreError::Api(_) => format!("Parcel service error: {err}"),
    };
    (ToastKind::Error, text)
}

pub fn lookup_toast(err: &LookupError) -> (ToastKind, String) {
    match err {
        LookupError::InvalidCode(TrackingCodeError::Empty) => {
            (ToastKind::Warning, "Enter a tracking code.".to_string())
        }
        LookupError::InvalidCode(reason) => (ToastKind::Warning, format!("{reason}.")),
        LookupError::NotFound(code) => (ToastKind::Error, format!("Tracking code {code} not found.")),
        LookupError::Store(inner) => store_toast(inner),
    }
}

pub fn lifecycle_toast(err: &LifecycleError) -> (ToastKind, String) {
    match err {
        LifecycleError::Store(inner) => {
            let (kind, text) = store_toast(inner);
            (kind, format!("Pickup not recorded. {text}"))
        }
        other => (ToastKind::Warning, format!("{other}.")),
    }
}

pub fn intake_toast(err: &IntakeError) -> (ToastKind, String) {
    match err {
        IntakeError::Invalid(fields) => fields_toast(fields),
        IntakeError::Unpriced { .. } => (ToastKind::Warning, format!("{err}.")),
    }
}

pub fn sign_in_toast(err: &SignInError) -> (ToastKind, String) {
    match err {
        SignInError::UnknownAccount { role, .. } => (
            ToastKind::Error,
            format!("No {} account matches these credentials.", role.name()),
        ),
        SignInError::Inactive { .. } => (
            ToastKind::Error,
            "This account is inactive. Contact the administration.".to_string(),
        ),
        SignInError::Store(inner) => store_toast(inner),
    }
}

pub fn fields_toast(fields: &[FieldError]) -> (ToastKind, String) {
    let text = match fields {
        [] => "Please check the form.".to_string(),
        [only] => format!("{}.", only.message),
        [first, rest @ ..] => format!("{} (+{} more).", first.message, rest.len()),
    };
    (ToastKind::Warning, text)
}

#[component]
pub fn Toast() -> Element {
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let views = toasts()
        .into_iter()
        .map(ToastView::from)
        .collect::<Vec<_>>();

    if views.is_empty() {
        return rsx! { Fragment {} };
    }

    rsx! {
        div {
            class: "toast-stack",
            ul {
                for view in views {
                    ToastCard { key: "{view.id}", view, toasts }
                }
            }
        }
    }
}

#[component]
fn ToastCard(view: ToastView, toasts: Signal<Vec<ToastMessage>>) -> Element {
    let toast_id = view.id.clone();
    let _auto_dismiss = use_future(move || {
        let mut toasts = toasts;
        let id = toast_id.clone();
        async move {
            tokio::time::sleep(TOAST_AUTO_DISMISS).await;
            toasts.with_mut(|items| items.retain(|toast| toast.id != id));
        }
    });

    rsx! {
        li {
            class: "toast {view.theme}",
            span { "{view.icon}" }
            p { "{view.text}" }
            button {
                class: "toast-dismiss",
                onclick: move |_| {
                    let target = view.id.clone();
                    toasts.with_mut(|items| items.retain(|toast| toast.id != target));
                },
                "Dismiss"
            }
        }
    }
}

#[derive(Clone, PartialEq)]
struct ToastView {
    id: String,
    text: String,
    theme: &'static str,
    icon: &'static str,
}

impl From<ToastMessage> for ToastView {
    fn from(message: ToastMessage) -> Self {
        let (theme, icon) = match message.kind {
            ToastKind::Info => ("toast-info", "ℹ️"),
            ToastKind::Success => ("toast-success", "✅"),
            ToastKind::Warning => ("toast-warning", "⚠️"),
            ToastKind::Error => ("toast-error", "⛔"),
        };

        ToastView {
            id: message.id,
            text: message.text,
            theme,
            icon,
        }
    }
}
