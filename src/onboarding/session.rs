//! OnboardingSession: async front of the workflow controller.
//!
//! Serializes every mutation behind one lock, runs the resend countdown,
//! and dispatches controller effects to the notification channel and the
//! identity holder.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use crate::config::OnboardingConfig;
use crate::error::FlowError;

use super::context::IdentityHolder;
use super::controller::{Effect, FocusHint, WorkflowController, WorkflowSnapshot};
use super::countdown::CooldownTimer;
use super::images::ImageStore;
use super::model::{ImageFile, ImageRef};
use super::notify::OtpNotifier;
use super::otp::{OtpGenerator, RandomOtpGenerator};
use super::state::OnboardingStage;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Events pushed to hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The workflow moved to a new stage.
    StageChanged { stage: OnboardingStage },
    /// A code was issued and handed to the notification channel.
    OtpIssued { email: String, cooldown_seconds: u32 },
    /// One second of the resend cooldown elapsed.
    CooldownTick { remaining: u32 },
    /// Onboarding is done; the host should leave the flow after the delay.
    FlowFinished { redirect_after_secs: u64 },
}

/// One user's pass through the onboarding form.
pub struct OnboardingSession {
    controller: Arc<Mutex<WorkflowController>>,
    notifier: Arc<dyn OtpNotifier>,
    identity: Arc<dyn IdentityHolder>,
    countdown: CooldownTimer,
    events: broadcast::Sender<SessionEvent>,
    config: OnboardingConfig,
}

impl OnboardingSession {
    pub fn new(
        config: OnboardingConfig,
        notifier: Arc<dyn OtpNotifier>,
        identity: Arc<dyn IdentityHolder>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self::with_generator(config, notifier, identity, images, Arc::new(RandomOtpGenerator))
    }

    /// Like `new`, with a custom passcode source.
    pub fn with_generator(
        config: OnboardingConfig,
        notifier: Arc<dyn OtpNotifier>,
        identity: Arc<dyn IdentityHolder>,
        images: Arc<dyn ImageStore>,
        generator: Arc<dyn OtpGenerator>,
    ) -> Self {
        let controller = WorkflowController::new(config.resend_cooldown_secs, generator, images);
        let (events, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            controller: Arc::new(Mutex::new(controller)),
            notifier,
            identity,
            countdown: CooldownTimer::new(),
            events,
            config,
        }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn stage(&self) -> OnboardingStage {
        self.controller.lock().await.stage()
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        self.controller.lock().await.snapshot()
    }

    /// Whether the resend countdown task is running.
    pub fn countdown_active(&self) -> bool {
        self.countdown.is_running()
    }

    pub async fn submit_email(&self, raw: &str) -> Result<(), FlowError> {
        let effect = self.controller.lock().await.submit_email(raw)?;
        self.emit(SessionEvent::StageChanged {
            stage: OnboardingStage::OtpVerification,
        });
        self.dispatch(effect).await;
        Ok(())
    }

    pub async fn set_otp_digit(&self, index: usize, value: &str) -> Result<FocusHint, FlowError> {
        self.controller.lock().await.set_otp_digit(index, value)
    }

    /// Request a new code. A request during the cooldown is ignored and
    /// reported as `Ok(false)`.
    pub async fn resend_otp(&self) -> Result<bool, FlowError> {
        let result = self.controller.lock().await.resend_otp();
        match result {
            Ok(effect) => {
                self.dispatch(effect).await;
                Ok(true)
            }
            Err(FlowError::ResendNotReady { remaining }) => {
                debug!(remaining, "Ignoring early resend");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn submit_otp(&self) -> Result<(), FlowError> {
        self.controller.lock().await.submit_otp()?;
        self.countdown.cancel();
        self.emit(SessionEvent::StageChanged {
            stage: OnboardingStage::ProfileCapture,
        });
        Ok(())
    }

    pub async fn select_image(&self, file: ImageFile) -> Result<ImageRef, FlowError> {
        self.controller.lock().await.select_image(file)
    }

    pub async fn submit_profile(
        &self,
        full_name: &str,
        image: Option<ImageFile>,
    ) -> Result<(), FlowError> {
        let (effect, finished) = {
            let mut controller = self.controller.lock().await;
            let effect = controller.submit_profile(full_name, image)?;
            (effect, controller.take_flow_finished())
        };
        self.emit(SessionEvent::StageChanged {
            stage: OnboardingStage::Complete,
        });
        self.dispatch(effect).await;

        if finished {
            info!(
                redirect_after_secs = self.config.redirect_delay.as_secs(),
                "Onboarding finished"
            );
            self.emit(SessionEvent::FlowFinished {
                redirect_after_secs: self.config.redirect_delay.as_secs(),
            });
        }
        Ok(())
    }

    async fn dispatch(&self, effect: Effect) {
        match effect {
            Effect::DeliverOtp { email, code } => {
                self.countdown.restart(
                    Arc::downgrade(&self.controller),
                    self.config.tick_interval,
                    self.events.clone(),
                );
                if let Err(e) = self.notifier.deliver_otp(&email, &code).await {
                    warn!(
                        channel = %self.notifier.name(),
                        email = %email,
                        error = %e,
                        "OTP delivery failed"
                    );
                }
                self.emit(SessionEvent::OtpIssued {
                    email,
                    cooldown_seconds: self.config.resend_cooldown_secs,
                });
            }
            Effect::PublishProfile(profile) => {
                if let Err(e) = self.identity.publish_profile(profile).await {
                    warn!(error = %e, "Failed to publish onboarding profile");
                }
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        // Ok if no host is subscribed
        let _ = self.events.send(event);
    }
}
