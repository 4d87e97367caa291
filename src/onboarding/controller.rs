//! WorkflowController: owns the onboarding state and enforces the gates
//! between stages.
//!
//! The controller is plain synchronous state. It never performs I/O itself:
//! operations that need a collaborator return an [`Effect`] for the caller
//! to dispatch. Callers sharing a controller across tasks must serialize
//! access (see `OnboardingSession`).

use std::sync::Arc;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{FlowError, ValidationError};

use super::images::ImageStore;
use super::model::{ImageFile, ImageRef, UserProfile};
use super::otp::OtpGenerator;
use super::rules;
use super::state::{OTP_LENGTH, OnboardingStage, WorkflowState};

/// Side effect produced by a successful operation.
#[derive(Debug)]
pub enum Effect {
    /// Send `code` to `email` through the notification channel.
    DeliverOtp { email: String, code: SecretString },
    /// Hand the finalized profile to the identity holder.
    PublishProfile(UserProfile),
}

/// Where the host should move input focus after a digit edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusHint {
    Next(usize),
    Previous(usize),
    Stay,
}

/// Read-only view of the workflow for hosts and the status endpoint.
///
/// Never carries the passcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowSnapshot {
    pub stage: OnboardingStage,
    pub title: &'static str,
    pub email: String,
    /// One flag per OTP box, true when the box holds a digit.
    pub digits_filled: [bool; OTP_LENGTH],
    pub cooldown_seconds: u32,
    pub can_resend: bool,
    pub otp_issued_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<ImageRef>,
    pub image_selected: bool,
}

/// Drives one onboarding session through its four stages.
pub struct WorkflowController {
    state: WorkflowState,
    cooldown_secs: u32,
    generator: Arc<dyn OtpGenerator>,
    images: Arc<dyn ImageStore>,
    finish_pending: bool,
}

impl WorkflowController {
    pub fn new(
        cooldown_secs: u32,
        generator: Arc<dyn OtpGenerator>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            state: WorkflowState::default(),
            cooldown_secs,
            generator,
            images,
            finish_pending: false,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn stage(&self) -> OnboardingStage {
        self.state.stage
    }

    /// Capture and validate the email address, then issue the first code.
    pub fn submit_email(&mut self, raw: &str) -> Result<Effect, FlowError> {
        self.require_stage(OnboardingStage::EmailEntry)?;
        self.state.error = None;

        let email = rules::validate_email(raw).map_err(|e| self.reject(e))?;
        self.state.email = email;

        let effect = self.issue_otp();
        self.advance();
        Ok(effect)
    }

    /// Generate a fresh code, clear the digit boxes, restart the cooldown.
    fn issue_otp(&mut self) -> Effect {
        let code = self.generator.generate();
        // The state keeps its own copy; the effect carries one to the notifier.
        let delivered = SecretString::from(code.expose_secret().to_owned());
        self.state.otp.reissue(code, self.cooldown_secs);

        info!(
            email = %self.state.email,
            issued = self.state.otp.issued_count,
            cooldown = self.cooldown_secs,
            "Issued OTP"
        );

        Effect::DeliverOtp {
            email: self.state.email.clone(),
            code: delivered,
        }
    }

    /// Count the resend cooldown down by one second.
    ///
    /// Returns the remaining seconds, or `None` when nothing was counted
    /// (wrong stage or already at zero).
    pub fn tick_cooldown(&mut self) -> Option<u32> {
        let otp = &mut self.state.otp;
        if self.state.stage != OnboardingStage::OtpVerification || otp.cooldown_seconds == 0 {
            return None;
        }
        otp.cooldown_seconds -= 1;
        Some(otp.cooldown_seconds)
    }

    /// Write one OTP box. An empty value clears it.
    ///
    /// Rejected input leaves the state untouched and is not recorded as the
    /// workflow error.
    pub fn set_otp_digit(&mut self, index: usize, value: &str) -> Result<FocusHint, FlowError> {
        self.require_stage(OnboardingStage::OtpVerification)?;
        if index >= OTP_LENGTH {
            return Err(FlowError::SlotOutOfRange { index });
        }
        let digit = rules::validate_otp_digit(value)?;
        self.state.otp.entered[index] = digit;

        Ok(match digit {
            Some(_) if index + 1 < OTP_LENGTH => FocusHint::Next(index + 1),
            None if index > 0 => FocusHint::Previous(index - 1),
            _ => FocusHint::Stay,
        })
    }

    /// Issue a new code once the cooldown has run out.
    pub fn resend_otp(&mut self) -> Result<Effect, FlowError> {
        self.require_stage(OnboardingStage::OtpVerification)?;
        let remaining = self.state.otp.cooldown_seconds;
        if remaining > 0 {
            debug!(remaining, "Resend requested during cooldown");
            return Err(FlowError::ResendNotReady { remaining });
        }
        Ok(self.issue_otp())
    }

    /// Check the six typed digits against the active code.
    pub fn submit_otp(&mut self) -> Result<(), FlowError> {
        self.require_stage(OnboardingStage::OtpVerification)?;
        self.state.error = None;

        if !self.state.otp.entered_matches() {
            return Err(self.reject(ValidationError::OtpMismatch).into());
        }
        self.advance();
        Ok(())
    }

    /// Accept an image from the picker ahead of the profile submit.
    pub fn select_image(&mut self, file: ImageFile) -> Result<ImageRef, FlowError> {
        self.require_stage(OnboardingStage::ProfileCapture)?;
        if let Err(e) = rules::validate_image(Some(&file)) {
            return Err(self.reject(e).into());
        }
        self.state.error = None;
        Ok(self.adopt_image(file))
    }

    /// Validate the name and image and finish onboarding.
    ///
    /// A valid `image` is kept as the current selection even when the name
    /// is rejected, so the user does not have to pick it again. Passing
    /// `None` reuses an earlier selection.
    pub fn submit_profile(
        &mut self,
        full_name: &str,
        image: Option<ImageFile>,
    ) -> Result<Effect, FlowError> {
        self.require_stage(OnboardingStage::ProfileCapture)?;
        self.state.error = None;

        let image_error = match image {
            Some(file) => match rules::validate_image(Some(&file)) {
                Ok(()) => {
                    self.adopt_image(file);
                    None
                }
                Err(e) => Some(e),
            },
            None => None,
        };

        rules::validate_full_name(full_name).map_err(|e| self.reject(e))?;
        if let Some(e) = image_error {
            return Err(self.reject(e).into());
        }
        let Some(image_ref) = self.state.profile.selected_image.clone() else {
            return Err(self.reject(ValidationError::NoFileSelected).into());
        };

        self.state.profile.full_name = Some(full_name.to_string());
        self.state.profile.image_ref = Some(image_ref.clone());
        self.advance();
        self.finish_pending = true;

        Ok(Effect::PublishProfile(UserProfile {
            email: self.state.email.clone(),
            full_name: full_name.to_string(),
            image_ref: image_ref.to_string(),
            completed_at: Some(Utc::now()),
        }))
    }

    /// Returns `true` exactly once, after the flow reaches `Complete`.
    pub fn take_flow_finished(&mut self) -> bool {
        std::mem::take(&mut self.finish_pending)
    }

    /// Serializable view of the current state.
    pub fn snapshot(&self) -> WorkflowSnapshot {
        let state = &self.state;
        WorkflowSnapshot {
            stage: state.stage,
            title: state.stage.title(),
            email: state.email.clone(),
            digits_filled: state.otp.entered.map(|d| d.is_some()),
            cooldown_seconds: state.otp.cooldown_seconds,
            can_resend: state.stage == OnboardingStage::OtpVerification
                && state.otp.cooldown_seconds == 0,
            otp_issued_count: state.otp.issued_count,
            error: state.error.as_ref().map(ToString::to_string),
            full_name: state.profile.full_name.clone(),
            image_ref: state.profile.image_ref.clone(),
            image_selected: state.profile.selected_image.is_some(),
        }
    }

    fn require_stage(&self, expected: OnboardingStage) -> Result<(), FlowError> {
        if self.state.stage == expected {
            Ok(())
        } else {
            if self.state.stage.is_terminal() {
                debug!(expected = %expected, "Onboarding already complete, call ignored");
            }
            Err(FlowError::WrongStage {
                expected,
                actual: self.state.stage,
            })
        }
    }

    /// Record a validation failure and hand it back for propagation.
    fn reject(&mut self, error: ValidationError) -> ValidationError {
        debug!(stage = %self.state.stage, error = ?error, "Input rejected");
        self.state.error = Some(error.clone());
        error
    }

    /// Move to the next stage. Callers have already passed `require_stage`,
    /// so a failure here is a controller bug.
    fn advance(&mut self) {
        let from = self.state.stage;
        let advanced = from
            .next()
            .ok_or_else(|| format!("{from} is terminal"))
            .and_then(|to| self.state.transition(to).map(|()| to));
        match advanced {
            Ok(to) => info!(from = %from, to = %to, "Onboarding stage advanced"),
            Err(e) => {
                warn!(error = %e, "Failed to advance onboarding stage");
                debug_assert!(false, "stage advanced out of order: {e}");
            }
        }
    }

    /// Swap in a newly accepted image and release the one it replaces.
    fn adopt_image(&mut self, file: ImageFile) -> ImageRef {
        let image_ref = self.images.register(file);
        if let Some(previous) = self.state.profile.selected_image.replace(image_ref.clone()) {
            self.images.release(&previous);
        }
        image_ref
    }
}

impl Drop for WorkflowController {
    fn drop(&mut self) {
        // A selection that never made it into a finished profile is dead.
        if self.state.profile.image_ref.is_none() {
            if let Some(selected) = self.state.profile.selected_image.take() {
                self.images.release(&selected);
            }
        }
    }
}
