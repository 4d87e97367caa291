//! Onboard Flow: guided email, passcode, and profile onboarding.

pub mod config;
pub mod error;
pub mod onboarding;
