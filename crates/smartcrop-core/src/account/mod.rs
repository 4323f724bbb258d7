//! Session and profile state on top of the auth provider and local store.

use thiserror::Error;

use crate::auth::{AuthError, AuthSession, SessionPersistence, SignUpOutcome, SupabaseAuthClient};
use crate::models::{Profile, ProfileUpdate, SoilType};
use crate::services::LocalStore;
use crate::util::normalize_email;

const MIN_PASSWORD_CHARS: usize = 6;

const MISSING_FIELDS: &str = "All fields are required.";
const SHORT_PASSWORD: &str = "Password must be at least 6 characters.";
const PASSWORD_MISMATCH: &str = "Passwords do not match.";
const TERMS_NOT_ACCEPTED: &str = "Please accept the terms to continue.";
const MISSING_CREDENTIALS: &str = "Email and password are required.";
const MISSING_RESET_EMAIL: &str = "Enter your email to reset your password.";

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Sign in to continue.")]
    SignInRequired,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] crate::Error),
}

impl AccountError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

pub type AccountResult<T> = Result<T, AccountError>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated {
        session: AuthSession,
        profile: Profile,
    },
}

/// Fields of the sign-up form
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
}

impl SignUpForm {
    fn validate(&self) -> AccountResult<()> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(AccountError::Validation(MISSING_FIELDS));
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AccountError::Validation(SHORT_PASSWORD));
        }
        if self.password != self.confirm_password {
            return Err(AccountError::Validation(PASSWORD_MISMATCH));
        }
        if !self.accepted_terms {
            return Err(AccountError::Validation(TERMS_NOT_ACCEPTED));
        }
        Ok(())
    }
}

pub struct AccountService<S: SessionPersistence> {
    auth: SupabaseAuthClient<S>,
    store: LocalStore,
    reset_redirect: Option<String>,
    state: SessionState,
}

impl<S: SessionPersistence> AccountService<S> {
    pub const fn new(
        auth: SupabaseAuthClient<S>,
        store: LocalStore,
        reset_redirect: Option<String>,
    ) -> Self {
        Self {
            auth,
            store,
            reset_redirect,
            state: SessionState::Unauthenticated,
        }
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub const fn is_signed_in(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    pub const fn session(&self) -> Option<&AuthSession> {
        match &self.state {
            SessionState::Authenticated { session, .. } => Some(session),
            SessionState::Unauthenticated => None,
        }
    }

    pub const fn profile(&self) -> Option<&Profile> {
        match &self.state {
            SessionState::Authenticated { profile, .. } => Some(profile),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn current_user_id(&self) -> Option<&str> {
        self.session().map(|session| session.user.id.as_str())
    }

    /// Soil type used for refresh inputs.
    pub fn default_soil(&self) -> SoilType {
        self.profile()
            .map_or(SoilType::Loam, |profile| profile.soil_type)
    }

    /// Restore a persisted session, if any.
    pub async fn start(&mut self) -> AccountResult<&SessionState> {
        match self.auth.restore_session().await? {
            Some(session) => self.enter(session).await?,
            None => self.state = SessionState::Unauthenticated,
        }
        Ok(&self.state)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> AccountResult<&Profile> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AccountError::Validation(MISSING_CREDENTIALS));
        }

        let session = self.auth.sign_in(&email, password).await?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.enter(session).await?;
        self.profile().ok_or(AccountError::SignInRequired)
    }

    /// Create an account and its profile.
    pub async fn sign_up(&mut self, form: &SignUpForm) -> AccountResult<SignUpOutcome> {
        form.validate()?;
        let email = normalize_email(&form.email);

        let outcome = self.auth.sign_up(&email, &form.password).await?;
        let profile = Profile::new(form.name.trim());
        self.store.save_profile(&outcome.user().id, &profile).await?;
        tracing::info!(user_id = %outcome.user().id, "Account created");

        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.state = SessionState::Authenticated {
                session: session.clone(),
                profile,
            };
        }
        Ok(outcome)
    }

    /// End the session locally even when the provider cannot be reached.
    pub async fn sign_out(&mut self) -> AccountResult<()> {
        if let Some(session) = self.session() {
            if let Err(error) = self.auth.sign_out(&session.access_token).await {
                tracing::warn!("Remote sign-out failed: {error}");
            }
        }
        self.auth.store().clear_session()?;
        self.state = SessionState::Unauthenticated;
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> AccountResult<()> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AccountError::Validation(MISSING_RESET_EMAIL));
        }
        self.auth
            .recover(&email, self.reset_redirect.as_deref())
            .await?;
        Ok(())
    }

    /// Merge `update` into the profile and persist it.
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> AccountResult<&Profile> {
        let SessionState::Authenticated { session, profile } = &mut self.state else {
            return Err(AccountError::SignInRequired);
        };
        let merged = profile.clone().merged(update);
        self.store.save_profile(&session.user.id, &merged).await?;
        *profile = merged;
        Ok(profile)
    }

    /// Exchange the refresh token. A rejected token ends the session.
    pub async fn refresh_session(&mut self) -> AccountResult<()> {
        let SessionState::Authenticated { session, .. } = &mut self.state else {
            return Err(AccountError::SignInRequired);
        };
        match self.auth.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                *session = refreshed;
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Session refresh failed; signing out: {error}");
                self.auth.store().clear_session()?;
                self.state = SessionState::Unauthenticated;
                Err(error.into())
            }
        }
    }

    /// Re-read the user from the provider. Returns whether the email is verified.
    pub async fn reload_user(&mut self) -> AccountResult<bool> {
        let SessionState::Authenticated { session, .. } = &mut self.state else {
            return Err(AccountError::SignInRequired);
        };
        let user = self.auth.get_user(&session.access_token).await?;
        let confirmed = user.email_confirmed;
        session.user = user;
        self.auth.store().save_session(session)?;
        Ok(confirmed)
    }

    pub async fn resend_verification(&self) -> AccountResult<()> {
        let email = self
            .session()
            .and_then(|session| session.user.email.clone())
            .ok_or(AccountError::SignInRequired)?;
        self.auth.resend_confirmation(&email).await?;
        Ok(())
    }

    async fn enter(&mut self, session: AuthSession) -> AccountResult<()> {
        let profile = match self.store.load_profile(&session.user.id).await? {
            Some(profile) => profile,
            None => Profile::default_for_email(session.user.email.as_deref()),
        };
        self.state = SessionState::Authenticated { session, profile };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::MemorySessionStore;
    use crate::models::{DEFAULT_REGION, ProfileUpdate};

    async fn service(server: &MockServer) -> (AccountService<MemorySessionStore>, LocalStore) {
        let store = LocalStore::open_in_memory().await.unwrap();
        let auth = SupabaseAuthClient::new(server.uri(), "anon", MemorySessionStore::default())
            .unwrap();
        let service = AccountService::new(
            auth,
            store.clone(),
            Some("https://smartcrop.ug/reset".to_string()),
        );
        (service, store)
    }

    fn session_body(user_id: &str, email: &str) -> serde_json::Value {
        serde_json::json!({
            "access_token": "access",
            "refresh_token": "refresh",
            "expires_in": 3600,
            "user": {"id": user_id, "email": email}
        })
    }

    async fn mount_sign_in(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(session_body("user-1", "amina@farm.ug")),
            )
            .mount(server)
            .await;
    }

    fn form() -> SignUpForm {
        SignUpForm {
            name: "Amina".to_string(),
            email: " Amina@Farm.UG ".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            accepted_terms: true,
        }
    }

    #[test]
    fn sign_up_validation_order() {
        let mut missing = form();
        missing.name = " ".to_string();
        let mut short = form();
        short.password = "abc".to_string();
        short.confirm_password = "abc".to_string();
        let mut mismatch = form();
        mismatch.confirm_password = "secret2".to_string();
        let mut terms = form();
        terms.accepted_terms = false;

        let messages: Vec<String> = [missing, short, mismatch, terms]
            .iter()
            .map(|form| form.validate().unwrap_err().user_message())
            .collect();
        assert_eq!(
            messages,
            vec![
                "All fields are required.",
                "Password must be at least 6 characters.",
                "Passwords do not match.",
                "Please accept the terms to continue.",
            ]
        );
        assert!(form().validate().is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sign_in_synthesizes_profile_without_persisting() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        let (mut service, store) = service(&server).await;

        let profile = service.sign_in("Amina@Farm.UG", "secret1").await.unwrap().clone();

        assert_eq!(profile.name, "amina");
        assert_eq!(profile.region, DEFAULT_REGION);
        assert_eq!(service.current_user_id(), Some("user-1"));
        assert_eq!(service.default_soil(), SoilType::Loam);
        assert_eq!(store.load_profile("user-1").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sign_in_requires_both_fields() {
        let server = MockServer::start().await;
        let (mut service, _) = service(&server).await;

        let error = service.sign_in("  ", "secret").await.unwrap_err();
        assert_eq!(error.user_message(), "Email and password are required.");
        assert!(!service.is_signed_in());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn wrong_password_maps_to_friendly_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error_code": "invalid_credentials",
                "msg": "Invalid login credentials"
            })))
            .mount(&server)
            .await;
        let (mut service, _) = service(&server).await;

        let error = service.sign_in("amina@farm.ug", "wrong").await.unwrap_err();
        assert_eq!(error.user_message(), "Incorrect email or password.");
        assert_eq!(service.state(), &SessionState::Unauthenticated);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sign_up_creates_loam_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user-9",
                "email": "amina@farm.ug"
            })))
            .mount(&server)
            .await;
        let (mut service, store) = service(&server).await;

        let outcome = service.sign_up(&form()).await.unwrap();

        assert!(matches!(outcome, SignUpOutcome::ConfirmationRequired(_)));
        assert!(!service.is_signed_in());
        let profile = store.load_profile("user-9").await.unwrap().unwrap();
        assert_eq!(profile.name, "Amina");
        assert_eq!(profile.soil_type, SoilType::Loam);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_profile_merges_and_persists() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        let (mut service, store) = service(&server).await;
        service.sign_in("amina@farm.ug", "secret1").await.unwrap();

        let update = ProfileUpdate {
            soil_type: Some(SoilType::Clay),
            region: Some("Nakaseke".to_string()),
            ..ProfileUpdate::default()
        };
        let profile = service.update_profile(&update).await.unwrap().clone();

        assert_eq!(profile.name, "amina");
        assert_eq!(profile.soil_type, SoilType::Clay);
        assert_eq!(store.load_profile("user-1").await.unwrap(), Some(profile));
        assert_eq!(service.default_soil(), SoilType::Clay);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_profile_requires_session() {
        let server = MockServer::start().await;
        let (mut service, _) = service(&server).await;
        assert!(matches!(
            service.update_profile(&ProfileUpdate::default()).await,
            Err(AccountError::SignInRequired)
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn start_restores_stored_profile() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        let (mut first, store) = service(&server).await;
        first.sign_in("amina@farm.ug", "secret1").await.unwrap();
        store
            .save_profile("user-1", &Profile::new("Amina N."))
            .await
            .unwrap();

        let auth = SupabaseAuthClient::new(server.uri(), "anon", first.auth.store().clone())
            .unwrap();
        let mut restored = AccountService::new(auth, store, None);
        restored.start().await.unwrap();

        assert_eq!(restored.profile().map(|p| p.name.as_str()), Some("Amina N."));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_refresh_signs_out() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error_code": "refresh_token_not_found",
                "msg": "Invalid Refresh Token"
            })))
            .mount(&server)
            .await;
        let (mut service, _) = service(&server).await;
        service.sign_in("amina@farm.ug", "secret1").await.unwrap();

        assert!(service.refresh_session().await.is_err());
        assert!(!service.is_signed_in());
        assert_eq!(service.auth.store().load_session().unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sign_out_clears_even_when_provider_fails() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let (mut service, _) = service(&server).await;
        service.sign_in("amina@farm.ug", "secret1").await.unwrap();

        service.sign_out().await.unwrap();
        assert!(!service.is_signed_in());
        assert_eq!(service.auth.store().load_session().unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn password_reset_requires_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .and(query_param("redirect_to", "https://smartcrop.ug/reset"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;
        let (service, _) = service(&server).await;

        let error = service.request_password_reset(" ").await.unwrap_err();
        assert_eq!(
            error.user_message(),
            "Enter your email to reset your password."
        );
        service
            .request_password_reset("Amina@farm.ug")
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reload_user_reports_verification() {
        let server = MockServer::start().await;
        mount_sign_in(&server).await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user-1",
                "email": "amina@farm.ug",
                "email_confirmed_at": "2024-03-01T08:00:00Z"
            })))
            .mount(&server)
            .await;
        let (mut service, _) = service(&server).await;
        service.sign_in("amina@farm.ug", "secret1").await.unwrap();

        assert!(service.reload_user().await.unwrap());
        assert!(service.session().unwrap().user.email_confirmed);
    }
}
