//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Onboarding flow configuration.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Seconds a freshly issued OTP blocks resend.
    pub resend_cooldown_secs: u32,
    /// How often the cooldown countdown ticks (one second per tick).
    pub tick_interval: Duration,
    /// How long the host waits on the completion screen before navigating away.
    pub redirect_delay: Duration,
    /// Port for the status HTTP surface.
    pub http_port: u16,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            resend_cooldown_secs: 30,
            tick_interval: Duration::from_secs(1),
            redirect_delay: Duration::from_secs(3),
            http_port: 8080,
        }
    }
}

impl OnboardingConfig {
    /// Build config from environment variables, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let resend_cooldown_secs = parse_var(&lookup, "ONBOARD_RESEND_COOLDOWN_SECS")?
            .unwrap_or(defaults.resend_cooldown_secs);

        let tick_interval = match parse_var::<u64, _>(&lookup, "ONBOARD_TICK_MILLIS")? {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: "ONBOARD_TICK_MILLIS".into(),
                    message: "must be greater than zero".into(),
                });
            }
            Some(ms) => Duration::from_millis(ms),
            None => defaults.tick_interval,
        };

        let redirect_delay = parse_var(&lookup, "ONBOARD_REDIRECT_DELAY_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.redirect_delay);

        let http_port = parse_var(&lookup, "ONBOARD_HTTP_PORT")?.unwrap_or(defaults.http_port);

        Ok(Self {
            resend_cooldown_secs,
            tick_interval,
            redirect_delay,
            http_port,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?}: {e}"),
            }),
        None => Ok(None),
    }
}
