//! Supabase GoTrue auth client.

use std::fmt;
use std::sync::{Arc, Mutex};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::unix_millis_now;

const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed: bool,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    /// Account created; the provider sent a confirmation email first
    ConfirmationRequired(AuthUser),
}

impl SignUpOutcome {
    pub const fn user(&self) -> &AuthUser {
        match self {
            Self::SignedIn(session) => &session.user,
            Self::ConfirmationRequired(user) => user,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Supabase auth is not configured for this build.")]
    NotConfigured,
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth API error: {message} ({status})")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("{0}")]
    Validation(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

impl AuthError {
    fn response(message: &str) -> Self {
        Self::Api {
            status: 200,
            code: None,
            message: message.to_string(),
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "Network error. Check your connection and try again.".to_string(),
            Self::Validation(message) => message.clone(),
            Self::Api { code, message, .. } => {
                if let Some(mapped) = code.as_deref().and_then(message_for_code) {
                    return mapped.to_string();
                }
                if message.to_ascii_lowercase().contains("redirect") {
                    return REDIRECT_REJECTED.to_string();
                }
                if message.trim().is_empty() {
                    "Authentication failed.".to_string()
                } else {
                    message.clone()
                }
            }
            other => other.to_string(),
        }
    }
}

const REDIRECT_REJECTED: &str =
    "Password reset link configuration is invalid. Check the auth redirect allow-list.";

fn message_for_code(code: &str) -> Option<&'static str> {
    let message = match code {
        "invalid_credentials" | "invalid_grant" => "Incorrect email or password.",
        "user_not_found" => "No account found with that email.",
        "email_address_invalid" | "validation_failed" => "Please enter a valid email address.",
        "email_exists" | "user_already_exists" => "That email is already in use.",
        "weak_password" => "Password is too weak (min 6 characters).",
        "over_request_rate_limit" | "over_email_send_rate_limit" => {
            "Too many attempts. Please wait and try again."
        }
        "user_banned" => "This account has been disabled.",
        "email_provider_disabled" | "signup_disabled" => {
            "Email/password sign-in is not enabled for this project."
        }
        "bad_redirect_url" => REDIRECT_REJECTED,
        _ => return None,
    };
    Some(message)
}

pub type AuthResult<T> = Result<T, AuthError>;

pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Process-local session store
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: Arc<Mutex<Option<AuthSession>>>,
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        let guard = self
            .session
            .lock()
            .map_err(|_| AuthError::SecureStorage("session store poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| AuthError::SecureStorage("session store poisoned".to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> AuthResult<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| AuthError::SecureStorage("session store poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SupabaseAuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>, store: S) -> AuthResult<Self> {
        let auth_url = normalize_auth_url(url.as_ref())?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            auth_url,
            anon_key,
            client: Client::builder().build()?,
            store,
        })
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored_session) = self.store.load_session()? else {
            return Ok(None);
        };

        if !stored_session.is_expired() {
            return Ok(Some(stored_session));
        }

        match self.refresh_session(&stored_session.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        validate_credentials(email, password)?;

        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });
        let request = self.public_request(
            self.client
                .post(format!("{}/signup", self.auth_url))
                .json(&payload),
        );
        let response: SupabaseAuthResponse = self.send_json(request).await?;
        let fallback_user = response.top_level_user();
        match response.into_session()? {
            Some(session) => {
                self.store.save_session(&session)?;
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => fallback_user
                .map(SignUpOutcome::ConfirmationRequired)
                .ok_or_else(|| AuthError::response("Sign-up response did not include a user")),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        validate_credentials(email, password)?;

        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });
        let request = self.public_request(
            self.client
                .post(format!("{}/token", self.auth_url))
                .query(&[("grant_type", "password")])
                .json(&payload),
        );

        let response: SupabaseAuthResponse = self.send_json(request).await?;
        let session = response.into_session()?.ok_or_else(|| {
            AuthError::response("Sign-in response did not include an active session")
        })?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Refresh token must not be empty",
            ));
        }

        let payload = serde_json::json!({
            "refresh_token": refresh_token,
        });
        let request = self.public_request(
            self.client
                .post(format!("{}/token", self.auth_url))
                .query(&[("grant_type", "refresh_token")])
                .json(&payload),
        );
        let response: SupabaseAuthResponse = self.send_json(request).await?;
        let session = response.into_session()?.ok_or_else(|| {
            AuthError::response("Refresh response did not include an active session")
        })?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    pub async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let request = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token);

        let response = request.send().await?;
        if !(response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED) {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_api_error(status, &body));
        }

        self.store.clear_session()?;
        Ok(())
    }

    /// Send a password-reset email, optionally redirecting to `redirect_to`.
    pub async fn recover(&self, email: &str, redirect_to: Option<&str>) -> AuthResult<()> {
        if email.trim().is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }

        let mut request = self
            .client
            .post(format!("{}/recover", self.auth_url))
            .json(&serde_json::json!({ "email": email }));
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }
        self.send_empty(self.public_request(request)).await
    }

    /// Resend the sign-up confirmation email.
    pub async fn resend_confirmation(&self, email: &str) -> AuthResult<()> {
        let request = self.public_request(
            self.client
                .post(format!("{}/resend", self.auth_url))
                .json(&serde_json::json!({ "type": "signup", "email": email })),
        );
        self.send_empty(request).await
    }

    /// Fetch the current user, including email-confirmation state.
    pub async fn get_user(&self, access_token: &str) -> AuthResult<AuthUser> {
        let request = self
            .client
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token);
        let user: SupabaseUser = self.send_json(request).await?;
        Ok(user.into())
    }

    fn public_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> AuthResult<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_api_error(status, &body));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> AuthResult<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_api_error(status, &body));
        }
        Ok(())
    }
}

pub fn normalize_auth_url(url: &str) -> AuthResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(AuthError::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }
    if trimmed.ends_with("/auth/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/auth/v1"))
    }
}

fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SupabaseAuthResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<SupabaseUser>,
    session: Option<SupabaseAuthResponseSession>,
    // Sign-up with confirmation pending returns the bare user object.
    id: Option<String>,
    email: Option<String>,
    email_confirmed_at: Option<String>,
}

impl SupabaseAuthResponse {
    fn top_level_user(&self) -> Option<AuthUser> {
        let user = self.user.as_ref().map(|user| AuthUser::from(user.clone()));
        user.or_else(|| {
            self.id.clone().map(|id| AuthUser {
                id,
                email: self.email.clone(),
                email_confirmed: self.email_confirmed_at.is_some(),
            })
        })
    }

    fn into_session(self) -> AuthResult<Option<AuthSession>> {
        let nested_session = self.session;
        let access_token = self.access_token.or_else(|| {
            nested_session
                .as_ref()
                .and_then(|session| session.access_token.clone())
        });
        let refresh_token = self.refresh_token.or_else(|| {
            nested_session
                .as_ref()
                .and_then(|session| session.refresh_token.clone())
        });
        let expires_at = self
            .expires_at
            .or_else(|| {
                nested_session
                    .as_ref()
                    .and_then(|session| session.expires_at)
            })
            .or_else(|| {
                self.expires_in
                    .or_else(|| {
                        nested_session
                            .as_ref()
                            .and_then(|session| session.expires_in)
                    })
                    .map(|expires_in| unix_timestamp_now().saturating_add(expires_in))
            });
        let user = self
            .user
            .or_else(|| nested_session.and_then(|session| session.user))
            .map(Into::into);

        match (access_token, refresh_token, expires_at, user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user,
                }))
            }
            (None, None, None, _) => Ok(None),
            _ => Err(AuthError::response(
                "Auth response did not include enough session fields",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseAuthResponseSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<SupabaseUser>,
}

#[derive(Debug, Clone, Deserialize)]
struct SupabaseUser {
    id: String,
    email: Option<String>,
    email_confirmed_at: Option<String>,
}

impl From<SupabaseUser> for AuthUser {
    fn from(value: SupabaseUser) -> Self {
        Self {
            id: value.id,
            email: value.email,
            email_confirmed: value.email_confirmed_at.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseErrorResponse {
    error_code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> AuthError {
    if let Ok(payload) = serde_json::from_str::<SupabaseErrorResponse>(body) {
        let code = payload.error_code.or_else(|| payload.error.clone());
        if let Some(message) = payload
            .message
            .or(payload.msg)
            .or(payload.error_description)
            .or(payload.error)
        {
            return AuthError::Api {
                status: status.as_u16(),
                code,
                message: message.trim().to_string(),
            };
        }
    }

    let trimmed = body.trim();
    AuthError::Api {
        status: status.as_u16(),
        code: None,
        message: if trimmed.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            trimmed.to_string()
        },
    }
}

fn unix_timestamp_now() -> i64 {
    unix_millis_now() / 1000
}
