//! Auth slice: registration, login, session restoration, logout
//!
//! Registration opens an auth session, inserts a profile row keyed by the
//! session's user id, then loads that profile. Login opens a session and
//! loads the profile. Session restoration asks the auth service who the
//! current session belongs to; an absent session is a normal outcome, not
//! an error.

use crate::environment::AppEnvironment;
use crate::types::{NewUser, User, UserId, UserRole};
use boxoffice_core::effect::Effect;
use boxoffice_core::reducer::Reducer;
use boxoffice_core::{Effects, smallvec};
use boxoffice_gateway::GatewayError;

/// Auth slice state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    /// Profile of the signed-in user
    pub user: Option<User>,
    /// Whether a session is currently held
    pub is_authenticated: bool,
    /// An auth operation is in flight
    pub loading: bool,
    /// Last auth failure, user-facing
    pub error: Option<String>,
}

/// Auth slice actions
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// Register a new account and open a session
    Register {
        /// Login email
        email: String,
        /// Password
        password: String,
        /// Display name for the profile row
        name: String,
        /// Role for the profile row
        user_type: UserRole,
    },
    /// Open a session with existing credentials
    Login {
        /// Login email
        email: String,
        /// Password
        password: String,
    },
    /// Restore the session held by the auth service, if any
    LoadSession,
    /// Close the current session
    Logout,

    /// Registration or login finished with a loaded profile
    LoggedIn(User),
    /// Session restoration finished; `None` means no session was held
    SessionLoaded(Option<User>),
    /// Logout finished
    LoggedOut,
    /// Registration or login failed
    AuthFailed(String),
    /// Session restoration failed
    SessionFailed(String),
    /// Logout failed
    LogoutFailed(String),

    /// Dismiss the stored error
    ClearError,
}

/// Reducer for the auth slice
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthReducer;

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut AuthState,
        action: AuthAction,
        env: &AppEnvironment,
    ) -> Effects<AuthAction> {
        match action {
            AuthAction::Register {
                email,
                password,
                name,
                user_type,
            } => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    let result = async {
                        let session = gateway.sign_up(email.clone(), password).await?;
                        let id = UserId(session.user.id);
                        gateway
                            .insert_profile(NewUser {
                                id,
                                email,
                                name,
                                user_type,
                            })
                            .await?;
                        gateway.fetch_profile(id).await
                    }
                    .await;

                    Some(match result {
                        Ok(user) => AuthAction::LoggedIn(user),
                        Err(e) => AuthAction::AuthFailed(e.to_string()),
                    })
                }))]
            },

            AuthAction::Login { email, password } => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    let result = async {
                        let session = gateway.sign_in(email, password).await?;
                        gateway.fetch_profile(UserId(session.user.id)).await
                    }
                    .await;

                    Some(match result {
                        Ok(user) => AuthAction::LoggedIn(user),
                        Err(e) => AuthAction::AuthFailed(e.to_string()),
                    })
                }))]
            },

            AuthAction::LoadSession => {
                state.loading = true;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    let result = async {
                        match gateway.current_user().await? {
                            Some(auth_user) => {
                                let user =
                                    gateway.fetch_profile(UserId(auth_user.id)).await?;
                                Ok(Some(user))
                            },
                            None => Ok::<_, GatewayError>(None),
                        }
                    }
                    .await;

                    Some(match result {
                        Ok(user) => AuthAction::SessionLoaded(user),
                        Err(e) => AuthAction::SessionFailed(e.to_string()),
                    })
                }))]
            },

            AuthAction::Logout => {
                state.loading = true;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.sign_out().await {
                        Ok(()) => AuthAction::LoggedOut,
                        Err(e) => AuthAction::LogoutFailed(e.to_string()),
                    })
                }))]
            },

            AuthAction::LoggedIn(user) => {
                state.loading = false;
                state.user = Some(user);
                state.is_authenticated = true;
                state.error = None;
                smallvec![]
            },

            AuthAction::SessionLoaded(user) => {
                state.loading = false;
                state.is_authenticated = user.is_some();
                state.user = user;
                smallvec![]
            },

            AuthAction::LoggedOut => {
                state.loading = false;
                state.user = None;
                state.is_authenticated = false;
                smallvec![]
            },

            AuthAction::AuthFailed(message) | AuthAction::LogoutFailed(message) => {
                tracing::warn!(error = %message, "Auth operation failed");
                state.loading = false;
                state.error = Some(message);
                smallvec![]
            },

            AuthAction::SessionFailed(message) => {
                tracing::warn!(error = %message, "Session restoration failed");
                state.loading = false;
                state.user = None;
                state.is_authenticated = false;
                state.error = Some(message);
                smallvec![]
            },

            AuthAction::ClearError => {
                state.error = None;
                smallvec![]
            },
        }
    }
}
