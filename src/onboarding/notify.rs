//! OTP delivery channel.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::error::ChannelError;

/// Delivers a freshly issued passcode to the user.
///
/// Delivery is fire-and-forget from the workflow's point of view: a failure
/// is logged by the caller and never rolls back the stage change.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    async fn deliver_otp(&self, email: &str, code: &SecretString) -> Result<(), ChannelError>;
}

/// Development notifier: writes the delivery to the log instead of sending it.
///
/// The code itself only shows up at `debug` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver_otp(&self, email: &str, code: &SecretString) -> Result<(), ChannelError> {
        info!(email = %email, "OTP sent");
        debug!(email = %email, code = %code.expose_secret(), "OTP contents");
        Ok(())
    }
}
