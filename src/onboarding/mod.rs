//! Onboarding flow: email, one-time passcode, profile, done.
//!
//! The `WorkflowController` owns the stage machine and its validation gates.
//! `OnboardingSession` wraps it for async hosts: it serializes mutations,
//! runs the resend countdown, and hands finished work to the notification
//! channel and the identity holder.

pub mod context;
pub mod controller;
pub mod countdown;
pub mod images;
pub mod model;
pub mod notify;
pub mod otp;
pub mod routes;
pub mod rules;
pub mod session;
pub mod state;

pub use context::{IdentityHolder, SessionContext};
pub use controller::{Effect, FocusHint, WorkflowController, WorkflowSnapshot};
pub use images::{ImageStore, ObjectUrlRegistry};
pub use model::{ImageFile, ImageRef, UserProfile};
pub use notify::{LogNotifier, OtpNotifier};
pub use otp::{OtpGenerator, RandomOtpGenerator};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use session::{OnboardingSession, SessionEvent};
pub use state::{OnboardingStage, WorkflowState};
