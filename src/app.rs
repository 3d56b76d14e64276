use dioxus::{prelude::*, signals::Signal};

use crate::{
    domain::{AppState, Role, SignInError},
    infra::{
        config::{AppConfig, StoreHandle},
        memory::MemoryStore,
        repository::restore_session,
    },
    ui::{
        components::toast::{push_toast, sign_in_toast, store_toast, Toast, ToastKind, ToastMessage},
        pages::{
            AdminDashboardPage, ClientDashboardPage, CourierDashboardPage, HomePage, LoginPage,
            NewPackagePage, RegisterPage, TrackingPage,
        },
        shell::Shell,
    },
    util::{
        assets,
        persistence::{load_persisted_state, save_persisted_state},
    },
};

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    Home {},
    #[route("/login")]
    Login {},
    #[route("/register")]
    Register {},
    #[route("/packages/new")]
    NewPackage {},
    #[route("/tracking")]
    Tracking {},
    #[route("/client")]
    ClientDashboard {},
    #[route("/courier")]
    CourierDashboard {},
    #[route("/admin")]
    AdminDashboard {},
}

impl Route {
    /// Landing page for a signed-in role.
    pub fn dashboard_for(role: Role) -> Self {
        match role {
            Role::Client => Route::ClientDashboard {},
            Role::Courier => Route::CourierDashboard {},
            Role::Admin => Route::AdminDashboard {},
        }
    }
}

#[component]
pub fn App() -> Element {
    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts);

    let store = use_hook(|| connect_store(toasts));
    use_context_provider(|| store.clone());

    let state = use_signal(AppState::default);
    use_hook({
        let mut state = state;
        move || {
            if let Some(saved) = load_persisted_state() {
                let user_id = saved.user_id.clone();
                state.with_mut(|st| st.apply_persisted(saved));
                if let Some(user_id) = user_id {
                    spawn(restore_user(state, toasts, store.clone(), user_id));
                } else {
                    state.with_mut(|st| st.sign_out());
                }
            }
        }
    });
    use_context_provider(|| state);

    rsx! {
        document::Style { "{assets::main_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

fn connect_store(toasts: Signal<Vec<ToastMessage>>) -> StoreHandle {
    let config = AppConfig::from_env().unwrap_or_else(|err| {
        push_toast(
            toasts,
            ToastKind::Warning,
            format!("Ignoring configuration: {err}. Using the demo data."),
        );
        AppConfig::default()
    });
    StoreHandle::connect(&config).unwrap_or_else(|err| {
        let (kind, text) = store_toast(&err);
        push_toast(toasts, kind, text);
        StoreHandle::new(MemoryStore::seeded().with_latency(config.demo_latency))
    })
}

/// Re-reads the remembered account. A vanished, role-changed or deactivated
/// account ends the session.
async fn restore_user(
    mut state: Signal<AppState>,
    toasts: Signal<Vec<ToastMessage>>,
    store: StoreHandle,
    user_id: String,
) {
    let Some(role) = state.with(|st| st.role) else {
        state.with_mut(|st| st.sign_out());
        return;
    };
    match restore_session(&*store, &user_id, role).await {
        Ok(user) => {
            tracing::info!("[session] restored {} as {}", user.email, role.as_str());
            state.with_mut(|st| st.sign_in(role, user));
        }
        Err(SignInError::Store(err)) => {
            state.with_mut(|st| st.sign_out());
            let (kind, text) = store_toast(&err);
            push_toast(toasts, kind, text);
        }
        Err(err) => {
            tracing::info!("[session] not restoring {user_id}: {err}");
            state.with_mut(|st| st.sign_out());
            persist_user_state(&state);
            let (kind, text) = sign_in_toast(&err);
            push_toast(toasts, kind, text);
        }
    }
}

pub fn persist_user_state(state: &Signal<AppState>) {
    let snapshot = state.with(|st| st.to_persisted());
    if let Err(err) = save_persisted_state(&snapshot) {
        tracing::warn!("[session] failed to persist user state: {err}");
    }
}

#[component]
pub fn Home() -> Element {
    rsx! { Shell { HomePage {} } }
}

#[component]
pub fn Login() -> Element {
    rsx! { Shell { LoginPage {} } }
}

#[component]
pub fn Register() -> Element {
    rsx! { Shell { RegisterPage {} } }
}

#[component]
pub fn NewPackage() -> Element {
    rsx! { Shell { NewPackagePage {} } }
}

#[component]
pub fn Tracking() -> Element {
    rsx! { Shell { TrackingPage {} } }
}

#[component]
pub fn ClientDashboard() -> Element {
    rsx! { Shell { ClientDashboardPage {} } }
}

#[component]
pub fn CourierDashboard() -> Element {
    rsx! { Shell { CourierDashboardPage {} } }
}

#[component]
pub fn AdminDashboard() -> Element {
    rsx! { Shell { AdminDashboardPage {} } }
}
