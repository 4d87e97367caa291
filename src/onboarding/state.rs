//! Onboarding state machine: tracks which stage the user is in and what has
//! been captured so far.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::model::ImageRef;

/// Number of digits in a one-time passcode.
pub const OTP_LENGTH: usize = 6;

/// The stages of the onboarding form.
///
/// Progresses linearly: EmailEntry → OtpVerification → ProfileCapture →
/// Complete.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStage {
    #[default]
    EmailEntry,
    OtpVerification,
    ProfileCapture,
    Complete,
}

impl OnboardingStage {
    /// Check if a transition from `self` to `target` is valid.
    ///
    /// The OTP stage may loop onto itself (resend); every other edge moves
    /// forward by exactly one stage.
    pub fn can_transition_to(&self, target: OnboardingStage) -> bool {
        use OnboardingStage::*;
        matches!(
            (self, target),
            (EmailEntry, OtpVerification)
                | (OtpVerification, OtpVerification)
                | (OtpVerification, ProfileCapture)
                | (ProfileCapture, Complete)
        )
    }

    /// Whether this stage is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Get the next stage in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingStage> {
        use OnboardingStage::*;
        match self {
            EmailEntry => Some(OtpVerification),
            OtpVerification => Some(ProfileCapture),
            ProfileCapture => Some(Complete),
            Complete => None,
        }
    }

    /// Position in the progression, starting at 0.
    pub fn index(&self) -> u8 {
        match self {
            Self::EmailEntry => 0,
            Self::OtpVerification => 1,
            Self::ProfileCapture => 2,
            Self::Complete => 3,
        }
    }

    /// Heading the form shows for this stage.
    pub fn title(&self) -> &'static str {
        match self {
            Self::EmailEntry => "Welcome",
            Self::OtpVerification => "Verify OTP",
            Self::ProfileCapture => "Profile Info",
            Self::Complete => "All Set!",
        }
    }
}

impl std::fmt::Display for OnboardingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EmailEntry => "email_entry",
            Self::OtpVerification => "otp_verification",
            Self::ProfileCapture => "profile_capture",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// The active passcode, the digits typed so far, and the resend countdown.
#[derive(Debug, Default)]
pub struct OtpState {
    code: Option<SecretString>,
    /// One slot per digit box; `None` means the box is empty.
    pub entered: [Option<char>; OTP_LENGTH],
    /// Seconds until resend is allowed.
    pub cooldown_seconds: u32,
    /// How many codes have been issued this session.
    pub issued_count: u32,
}

impl OtpState {
    /// Replace the active code, clear the digit boxes, and restart the cooldown.
    pub(crate) fn reissue(&mut self, code: SecretString, cooldown_seconds: u32) {
        self.code = Some(code);
        self.entered = [None; OTP_LENGTH];
        self.cooldown_seconds = cooldown_seconds;
        self.issued_count += 1;
    }

    /// Whether a code has been issued.
    pub fn is_issued(&self) -> bool {
        self.code.is_some()
    }

    /// All six digits joined, or `None` while any box is empty.
    pub fn entered_code(&self) -> Option<String> {
        self.entered.iter().copied().collect()
    }

    /// Number of boxes currently holding a digit.
    pub fn filled_slots(&self) -> usize {
        self.entered.iter().filter(|d| d.is_some()).count()
    }

    /// Whether the typed digits equal the active code.
    pub fn entered_matches(&self) -> bool {
        match (&self.code, self.entered_code()) {
            (Some(code), Some(entered)) => code.expose_secret() == entered,
            _ => false,
        }
    }
}

/// Profile fields captured in the last stage.
#[derive(Debug, Default, Clone)]
pub struct ProfileDraft {
    /// Set only once the whole profile is accepted.
    pub full_name: Option<String>,
    /// Set only once the whole profile is accepted.
    pub image_ref: Option<ImageRef>,
    /// Most recently accepted image selection, kept across name failures.
    pub selected_image: Option<ImageRef>,
}

/// The single mutable record of one onboarding session.
#[derive(Debug, Default)]
pub struct WorkflowState {
    pub stage: OnboardingStage,
    /// Normalized email; empty until the email stage passes.
    pub email: String,
    pub otp: OtpState,
    pub profile: ProfileDraft,
    /// Last validation failure, cleared at the start of every submit.
    pub error: Option<ValidationError>,
}

impl WorkflowState {
    /// Move to `target`. Returns an error if the edge is not in the state
    /// machine.
    pub(crate) fn transition(&mut self, target: OnboardingStage) -> Result<(), String> {
        if !self.stage.can_transition_to(target) {
            return Err(format!("Cannot transition from {} to {}", self.stage, target));
        }
        self.stage = target;
        Ok(())
    }
}
