//! Session state: bearer token(s) and the signed-in user, kept in an injected `SessionStore`.

pub mod store;
pub mod token;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::models::user::{AuthResponse, Role, User};

pub use store::{FileStore, MemoryStore, SessionStore};

pub const TOKEN_KEY: &str = "token";
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

/// Typed view over the session keys. Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persists what `verify-otp` returned. The bearer goes under both
    /// `accessToken` and `token`; a partial write is rolled back.
    pub fn store_auth(&self, auth: &AuthResponse) -> Result<(), ClientError> {
        if let Err(e) = self.write_auth(auth) {
            warn!("Failed to store authentication data: {e}");
            self.clear()?;
            return Err(e);
        }
        Ok(())
    }

    fn write_auth(&self, auth: &AuthResponse) -> Result<(), ClientError> {
        if let Some(bearer) = auth.bearer() {
            self.store.set(ACCESS_TOKEN_KEY, bearer)?;
            self.store.set(TOKEN_KEY, bearer)?;
        }
        if let Some(refresh) = &auth.refresh {
            self.store.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        if let Some(user) = &auth.user {
            self.store.set(USER_KEY, &serde_json::to_string(user)?)?;
        }
        Ok(())
    }

    /// Replaces the bearer after a token refresh.
    pub fn update_access_token(&self, access: &str) -> Result<(), ClientError> {
        self.store.set(ACCESS_TOKEN_KEY, access)?;
        self.store.set(TOKEN_KEY, access)
    }

    pub fn token(&self) -> Option<String> {
        let read = |key: &str| self.store.get(key).unwrap_or_else(|e| {
            warn!("Could not read {key} from session store: {e}");
            None
        });
        read(ACCESS_TOKEN_KEY).or_else(|| read(TOKEN_KEY))
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY).ok().flatten()
    }

    pub fn current_user(&self) -> Option<User> {
        let raw = self.store.get(USER_KEY).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Stored user is not valid JSON: {e}");
                None
            }
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.current_user().map(|u| u.user_type)
    }

    pub fn referral_code(&self) -> Option<String> {
        self.current_user()?.referral_code().map(str::to_string)
    }

    /// True when a bearer is stored and its `exp` has passed. Storage is left alone,
    /// so the refresh token is still there to trade in.
    pub fn token_expired(&self, now: DateTime<Utc>) -> bool {
        self.token()
            .is_some_and(|t| matches!(token::is_expired(&t, now), Ok(true)))
    }

    /// Logged in means a token and a user are stored and the token's `exp`
    /// is not in the past. Expired or unreadable tokens wipe the session.
    pub fn is_logged_in(&self, now: DateTime<Utc>) -> bool {
        let (Some(token), Some(_)) = (self.token(), self.store.get(USER_KEY).ok().flatten()) else {
            return false;
        };

        match token::is_expired(&token, now) {
            Ok(false) => true,
            Ok(true) => {
                debug!("Stored token expired; clearing session");
                self.clear_quietly();
                false
            }
            Err(e) => {
                warn!("Stored token could not be decoded ({e}); clearing session");
                self.clear_quietly();
                false
            }
        }
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.store.clear()
    }

    fn clear_quietly(&self) {
        if let Err(e) = self.clear() {
            warn!("Failed to clear session: {e}");
        }
    }
}
