//! Authentication session.
//!
//! Holds the bearer token, the refresh token and the profile of the
//! signed-in user. The token and the role are persisted so that routing can
//! decide before the profile request returns. Every change is published as
//! a [`SessionSnapshot`] on a watch channel.

use crate::api::ApiClient;
use crate::config::SessionSettings;
use crate::error::AuthError;
use sante_core::{AuthResponse, Credentials, NavigationState, Registration, Role, TokenRefresh, User};
use sante_store::{keys, KeyValueStore};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

const LOGIN_PATH: &str = "/auth/login/";
const REGISTER_PATH: &str = "/auth/register/";
const PROFILE_PATH: &str = "/auth/profile/";
const REFRESH_PATH: &str = "/auth/refresh/";

/// Point-in-time view of the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub loading: bool,
    pub role: Option<Role>,
    pub user: Option<User>,
}

impl SessionSnapshot {
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    /// Guard input for this session
    pub fn navigation(&self, in_clinic: bool) -> NavigationState {
        NavigationState {
            authenticated: self.authenticated,
            loading: self.loading,
            role: self.role,
            in_clinic,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    refresh: Option<String>,
    user: Option<User>,
    role: Option<Role>,
    loading: bool,
    /// Bumped by every logout; replies started under an older value are dropped
    generation: u64,
}

pub struct AuthSession {
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    settings: SessionSettings,
    state: RwLock<SessionState>,
    tx: watch::Sender<SessionSnapshot>,
}

impl AuthSession {
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>, settings: SessionSettings) -> Self {
        let state = SessionState {
            loading: true,
            ..Default::default()
        };
        let (tx, _) = watch::channel(SessionSnapshot {
            loading: true,
            ..Default::default()
        });
        Self {
            api,
            store,
            settings,
            state: RwLock::new(state),
            tx,
        }
    }

    /// Load the persisted token and role cache.
    ///
    /// Without a token the session is settled immediately; with one it stays
    /// loading until [`AuthSession::refresh_profile`] runs.
    pub fn restore(&self) -> Result<SessionSnapshot, AuthError> {
        let token = self.store.get(keys::ACCESS_TOKEN)?.filter(|t| !t.is_empty());
        let refresh = self.store.get(keys::REFRESH_TOKEN)?;
        let role = match self.store.get(keys::USER_ROLE)? {
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring persisted role");
                    None
                }
            },
            None => None,
        };

        self.api.set_token(token.clone());
        {
            let mut state = self.write_state();
            state.loading = token.is_some();
            state.token = token;
            state.refresh = refresh;
            state.role = role;
        }
        tracing::debug!(role = ?role, "Session restored");
        Ok(self.publish())
    }

    /// Sign in and load the profile of the new session.
    ///
    /// A logout that lands while either request is in flight wins: the
    /// replies are dropped and `SessionEnded` is returned.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let generation = self.generation();
        let reply: AuthResponse = self
            .api
            .post(LOGIN_PATH, credentials)
            .await
            .map_err(AuthError::from_login)?;

        let token = reply
            .access_token()
            .ok_or(AuthError::MissingToken)?
            .to_string();
        self.start_session(generation, token, reply.refresh.clone())?;

        let user = match self.api.get::<User>(PROFILE_PATH).await {
            Ok(user) => user,
            Err(err) => match reply.user {
                Some(user) => {
                    tracing::warn!(error = %err, "Profile fetch failed, using login reply");
                    user
                }
                None => {
                    if self.generation() == generation {
                        self.logout();
                    }
                    return Err(err.into());
                }
            },
        };

        self.set_user(generation, user.clone())?;
        tracing::info!(username = %user.username, role = %user.role, "Signed in");
        Ok(user)
    }

    /// Create the account, then sign in with it
    pub async fn register(&self, registration: &Registration) -> Result<User, AuthError> {
        let _: serde_json::Value = self
            .api
            .post(REGISTER_PATH, registration)
            .await
            .map_err(AuthError::from_login)?;
        tracing::info!(username = %registration.username, "Account registered");
        self.login(&registration.credentials()).await
    }

    /// Forget the session locally. The server is not contacted.
    pub fn logout(&self) {
        let username = {
            let mut state = self.write_state();
            let username = state.user.take().map(|u| u.username);
            *state = SessionState {
                generation: state.generation + 1,
                ..Default::default()
            };
            for key in keys::SESSION_KEYS {
                if let Err(e) = self.store.remove(key) {
                    tracing::warn!(key, error = %e, "Failed to clear session key");
                }
            }
            self.api.set_token(None);
            username
        };
        tracing::info!(username = ?username, "Signed out");
        self.publish();
    }

    /// Re-fetch the profile for the current token.
    ///
    /// Returns `Ok(None)` when there is no token, or when the session ended
    /// while the request was in flight. A 401 ends the session when
    /// `logout_on_unauthorized` is set; other failures keep it.
    pub async fn refresh_profile(&self) -> Result<Option<User>, AuthError> {
        if self.token().is_none() {
            self.write_state().loading = false;
            self.publish();
            return Ok(None);
        }

        let generation = self.generation();
        let result = self.api.get::<User>(PROFILE_PATH).await;
        if self.generation() != generation {
            tracing::debug!("Session ended during profile refresh, dropping reply");
            return Ok(None);
        }

        match result {
            Ok(user) => match self.set_user(generation, user.clone()) {
                Ok(()) => Ok(Some(user)),
                Err(AuthError::SessionEnded) => Ok(None),
                Err(e) => Err(e),
            },
            Err(err) => {
                if err.is_unauthorized() && self.settings.logout_on_unauthorized {
                    tracing::info!("Profile rejected the stored token, signing out");
                    self.logout();
                } else {
                    tracing::warn!(error = %err, "Profile refresh failed, keeping session");
                    self.write_state().loading = false;
                    self.publish();
                }
                Err(err.into())
            }
        }
    }

    /// Trade the stored refresh token for a new access token
    pub async fn refresh_access_token(&self) -> Result<(), AuthError> {
        let refresh = self
            .read_state()
            .refresh
            .clone()
            .ok_or(AuthError::MissingRefreshToken)?;
        let generation = self.generation();

        #[derive(Serialize)]
        struct RefreshRequest<'a> {
            refresh: &'a str,
        }

        let reply: TokenRefresh = self
            .api
            .post(REFRESH_PATH, &RefreshRequest { refresh: &refresh })
            .await?;

        {
            let mut state = self.write_state();
            if state.generation != generation {
                return Err(AuthError::SessionEnded);
            }
            self.store.set(keys::ACCESS_TOKEN, &reply.access)?;
            if let Some(rotated) = reply.refresh.as_deref() {
                self.store.set(keys::REFRESH_TOKEN, rotated)?;
            }
            self.api.set_token(Some(reply.access.clone()));
            state.token = Some(reply.access);
            if reply.refresh.is_some() {
                state.refresh = reply.refresh;
            }
        }
        tracing::debug!("Access token refreshed");
        self.publish();
        Ok(())
    }

    /// Patch the profile and keep the server's answer
    pub async fn update_profile<B>(&self, patch: &B) -> Result<User, AuthError>
    where
        B: Serialize + ?Sized,
    {
        if self.token().is_none() {
            return Err(AuthError::MissingToken);
        }
        let generation = self.generation();
        let user: User = self.api.patch(PROFILE_PATH, patch).await?;
        self.set_user(generation, user.clone())?;
        Ok(user)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.read_state().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read_state().user.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.read_state().role
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().token.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().loading
    }

    /// Logouts seen so far; compared before applying a reply
    fn generation(&self) -> u64 {
        self.read_state().generation
    }

    fn start_session(
        &self,
        generation: u64,
        token: String,
        refresh: Option<String>,
    ) -> Result<(), AuthError> {
        {
            let mut state = self.write_state();
            if state.generation != generation {
                return Err(AuthError::SessionEnded);
            }
            self.store.set(keys::ACCESS_TOKEN, &token)?;
            match refresh.as_deref() {
                Some(refresh) => self.store.set(keys::REFRESH_TOKEN, refresh)?,
                None => {
                    self.store.remove(keys::REFRESH_TOKEN)?;
                }
            }
            self.api.set_token(Some(token.clone()));
            state.token = Some(token);
            state.refresh = refresh;
            state.loading = true;
        }
        self.publish();
        Ok(())
    }

    fn set_user(&self, generation: u64, user: User) -> Result<(), AuthError> {
        {
            let mut state = self.write_state();
            if state.generation != generation {
                tracing::debug!(username = %user.username, "Dropping profile of an ended session");
                return Err(AuthError::SessionEnded);
            }
            self.store.set(keys::USER_ROLE, user.role.as_str())?;
            state.role = Some(user.role);
            state.user = Some(user);
            state.loading = false;
        }
        self.publish();
        Ok(())
    }

    fn publish(&self) -> SessionSnapshot {
        let snapshot = {
            let state = self.read_state();
            SessionSnapshot {
                authenticated: state.token.is_some(),
                loading: state.loading,
                role: state.role,
                user: state.user.clone(),
            }
        };
        self.tx.send_replace(snapshot.clone());
        snapshot
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
