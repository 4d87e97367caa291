//! Error types for the onboarding flow.

use crate::onboarding::state::OnboardingStage;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// A rejected input. The `Display` text is what the host shows the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Email field cannot be empty.")]
    EmptyInput,

    #[error("Please enter a valid email address.")]
    FormatInvalid,

    #[error("Each OTP box takes a single digit.")]
    DigitInvalid,

    #[error("Invalid OTP. Please try again.")]
    OtpMismatch,

    #[error("Please enter a valid full name.")]
    NameInvalid,

    #[error("Please upload a valid image file.")]
    NotAnImage,

    #[error("Please select a profile image.")]
    NoFileSelected,
}

/// Errors returned by workflow operations.
///
/// Only `Validation` is ever recorded in the workflow's `error` field; the
/// other variants describe calls the controller ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Resend available in {remaining}s")]
    ResendNotReady { remaining: u32 },

    #[error("Operation requires stage {expected}, current stage is {actual}")]
    WrongStage {
        expected: OnboardingStage,
        actual: OnboardingStage,
    },

    #[error("OTP slot {index} is out of range")]
    SlotOutOfRange { index: usize },
}

/// Collaborator errors (notification, identity holder).
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to deliver on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Failed to publish profile: {0}")]
    PublishFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_mismatch_message_matches_form_copy() {
        assert_eq!(
            ValidationError::OtpMismatch.to_string(),
            "Invalid OTP. Please try again."
        );
    }

    #[test]
    fn validation_error_is_transparent_inside_flow_error() {
        let err: FlowError = ValidationError::NameInvalid.into();
        assert_eq!(err.to_string(), "Please enter a valid full name.");
    }

    #[test]
    fn wrong_stage_names_both_stages() {
        let err = FlowError::WrongStage {
            expected: OnboardingStage::ProfileCapture,
            actual: OnboardingStage::Complete,
        };
        let msg = err.to_string();
        assert!(msg.contains("profile_capture"));
        assert!(msg.contains("complete"));
    }
}
