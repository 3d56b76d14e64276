use serde::{Deserialize, Serialize};

use super::entities::{Role, User};
use super::tracking::TrackingCode;

const RECENT_CODES_LIMIT: usize = 5;

/// Session state shared across routes.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Role picked at login; `None` until someone signs in.
    pub role: Option<Role>,
    pub user: Option<User>,
    /// Codes issued or looked up in this and earlier sessions, newest first.
    pub recent_codes: Vec<TrackingCode>,
}

impl AppState {
    pub fn sign_in(&mut self, role: Role, user: User) {
        self.role = Some(role);
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        self.role = None;
        self.user = None;
    }

    pub fn remember_code(&mut self, code: TrackingCode) {
        self.recent_codes.retain(|known| known != &code);
        self.recent_codes.insert(0, code);
        self.recent_codes.truncate(RECENT_CODES_LIMIT);
    }

    pub fn apply_persisted(&mut self, persisted: PersistedState) {
        self.role = persisted.role;
        self.recent_codes = persisted.recent_codes;
        self.recent_codes.truncate(RECENT_CODES_LIMIT);
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            role: self.role,
            user_id: self.user.as_ref().map(|user| user.id.clone()),
            recent_codes: self.recent_codes.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub role: Option<Role>,
    /// Restored by re-reading the user from the store at start-up.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub recent_codes: Vec<TrackingCode>,
}
