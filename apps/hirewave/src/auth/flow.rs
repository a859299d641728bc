use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api_client::HireWaveClient;
use crate::auth::otp_input::OtpInput;
use crate::errors::ClientError;
use crate::models::user::{Ack, AuthResponse};
use crate::routing::{landing_route, AppRoute};
use crate::session::Session;

pub const RESEND_COOLDOWN: Duration = Duration::from_secs(60);

pub const INCOMPLETE_CODE_MESSAGE: &str = "Please enter all 6 digits of the verification code";
pub const RESENT_MESSAGE: &str = "OTP resent successfully! Check your email.";

/// The three OTP endpoints the flow talks to.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn request_otp(&self, email: &str) -> Result<Ack, ClientError>;

    async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        referral_code: Option<&str>,
    ) -> Result<AuthResponse, ClientError>;

    async fn resend_otp(&self, email: &str) -> Result<Ack, ClientError>;
}

#[async_trait]
impl AuthBackend for HireWaveClient {
    async fn request_otp(&self, email: &str) -> Result<Ack, ClientError> {
        HireWaveClient::request_otp(self, email).await
    }

    async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        referral_code: Option<&str>,
    ) -> Result<AuthResponse, ClientError> {
        HireWaveClient::verify_otp(self, email, otp, referral_code).await
    }

    async fn resend_otp(&self, email: &str) -> Result<Ack, ClientError> {
        HireWaveClient::resend_otp(self, email).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    EnteringEmail,
    CodeSent,
    Verifying,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    CodeSent,
    /// The backend has no account for this email; offer signup instead.
    NoAccount { message: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResendCooldown {
    until: Option<Instant>,
}

impl ResendCooldown {
    pub fn start(&mut self, now: Instant) {
        self.until = Some(now + RESEND_COOLDOWN);
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.until
            .map(|until| until.saturating_duration_since(now))
            .filter(|left| !left.is_zero())
    }
}

/// Email-then-code sign-in.
pub struct OtpFlow {
    backend: Arc<dyn AuthBackend>,
    session: Session,
    state: FlowState,
    email: String,
    referral_code: Option<String>,
    input: OtpInput,
    error: Option<String>,
    notice: Option<String>,
    cooldown: ResendCooldown,
}

impl OtpFlow {
    pub fn new(backend: Arc<dyn AuthBackend>, session: Session) -> Self {
        Self {
            backend,
            session,
            state: FlowState::EnteringEmail,
            email: String::new(),
            referral_code: None,
            input: OtpInput::new(),
            error: None,
            notice: None,
            cooldown: ResendCooldown::default(),
        }
    }

    /// Forwarded to verify-otp so the new account is credited to the referrer.
    pub fn with_referral_code(mut self, code: Option<String>) -> Self {
        self.referral_code = code.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn input(&self) -> &OtpInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut OtpInput {
        &mut self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn resend_available_in(&self) -> Option<Duration> {
        self.cooldown.remaining(Instant::now())
    }

    /// `EnteringEmail → CodeSent` once the backend has mailed a code.
    pub async fn submit_email(&mut self, email: &str) -> Result<EmailOutcome, ClientError> {
        if self.state != FlowState::EnteringEmail {
            return Err(self.fail(ClientError::Validation(
                "A code has already been sent. Go back to change the email.".to_string(),
            )));
        }

        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(self.fail(ClientError::Validation(
                "Please enter a valid email address".to_string(),
            )));
        }

        self.error = None;
        match self.backend.request_otp(email).await {
            Ok(ack) => {
                info!("Verification code sent to {email}");
                self.enter_code_sent(email, ack.message);
                Ok(EmailOutcome::CodeSent)
            }
            Err(e) if e.is_not_found() => {
                let message = e.user_message();
                debug!("No account for {email}");
                self.error = Some(message.clone());
                Ok(EmailOutcome::NoAccount { message })
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Enters `CodeSent` directly, for signup flows where registering
    /// already mailed the code.
    pub fn code_already_sent(&mut self, email: &str, notice: Option<String>) {
        self.enter_code_sent(email.trim(), notice);
    }

    fn enter_code_sent(&mut self, email: &str, notice: Option<String>) {
        self.email = email.to_string();
        self.input.clear();
        self.error = None;
        self.notice = notice;
        self.state = FlowState::CodeSent;
    }

    /// `CodeSent → Authenticated`. On success the session is persisted and
    /// the role's landing route returned. On failure the boxes are wiped,
    /// focus returns to the first one and the flow stays in `CodeSent`.
    pub async fn submit_code(&mut self) -> Result<AppRoute, ClientError> {
        if self.state != FlowState::CodeSent {
            return Err(self.fail(ClientError::Validation(
                "Request a verification code first".to_string(),
            )));
        }
        if !self.input.is_complete() {
            return Err(self.fail(ClientError::Validation(INCOMPLETE_CODE_MESSAGE.to_string())));
        }

        self.error = None;
        self.notice = None;
        self.state = FlowState::Verifying;

        let code = self.input.code();
        let result = self
            .backend
            .verify_otp(&self.email, &code, self.referral_code.as_deref())
            .await
            .and_then(|auth| self.persist(&auth).map(|()| auth));

        match result {
            Ok(auth) => {
                self.state = FlowState::Authenticated;
                let role = auth.user.map(|u| u.user_type).unwrap_or_default();
                let route = landing_route(role);
                info!("Signed in as {} ({}), landing on {route}", self.email, role.as_str());
                Ok(route)
            }
            Err(e) => {
                warn!("Verification failed for {}: {e}", self.email);
                self.input.clear();
                self.state = FlowState::CodeSent;
                Err(self.fail(e))
            }
        }
    }

    fn persist(&self, auth: &AuthResponse) -> Result<(), ClientError> {
        if auth.bearer().is_none() {
            return Err(ClientError::Validation(
                "Verification succeeded but no token was issued".to_string(),
            ));
        }
        self.session.store_auth(auth)
    }

    /// `CodeSent → EnteringEmail`; typed digits are discarded.
    pub fn back(&mut self) {
        if self.state == FlowState::CodeSent {
            self.input.clear();
            self.error = None;
            self.notice = None;
            self.state = FlowState::EnteringEmail;
        }
    }

    /// Asks for a fresh code. Refused while the cooldown from the previous
    /// resend is running.
    pub async fn resend(&mut self) -> Result<(), ClientError> {
        if self.state != FlowState::CodeSent {
            return Err(self.fail(ClientError::Validation(
                "Request a verification code first".to_string(),
            )));
        }
        if let Some(left) = self.cooldown.remaining(Instant::now()) {
            return Err(self.fail(ClientError::Validation(format!(
                "Please wait {}s before requesting a new code",
                left.as_secs().max(1)
            ))));
        }

        self.error = None;
        self.notice = None;
        match self.backend.resend_otp(&self.email).await {
            Ok(_) => {
                self.input.clear();
                self.cooldown.start(Instant::now());
                self.notice = Some(RESENT_MESSAGE.to_string());
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Auth endpoints answer a wrong code with 401 too, so the backend's own
    /// wording wins over the generic session-expired text.
    fn fail(&mut self, e: ClientError) -> ClientError {
        self.error = Some(
            e.backend_message()
                .map(str::to_string)
                .unwrap_or_else(|| e.user_message()),
        );
        e
    }
}
