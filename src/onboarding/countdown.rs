//! Resend cooldown countdown: a cancellable background task.
//!
//! One task per issued code. Restarting aborts the previous task first, so
//! two countdowns never race on the same cooldown counter.

use std::sync::{Mutex, Weak};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tokio::task::JoinHandle;
use tracing::debug;

use super::controller::WorkflowController;
use super::session::SessionEvent;

/// Owns the running countdown task, if any.
#[derive(Debug, Default)]
pub struct CooldownTimer {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CooldownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort any running countdown and start a new one.
    ///
    /// The task ticks the controller every `period` until the controller
    /// stops counting (zero reached or stage left) or the controller is
    /// dropped.
    pub fn restart(
        &self,
        controller: Weak<AsyncMutex<WorkflowController>>,
        period: Duration,
        events: broadcast::Sender<SessionEvent>,
    ) {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await; // Skip immediate first tick
            loop {
                ticker.tick().await;
                let Some(controller) = controller.upgrade() else {
                    debug!("Countdown stopped: session dropped");
                    break;
                };
                let remaining = controller.lock().await.tick_cooldown();
                match remaining {
                    Some(remaining) => {
                        // Ok if no host is listening
                        let _ = events.send(SessionEvent::CooldownTick { remaining });
                        if remaining == 0 {
                            debug!("Countdown finished");
                            break;
                        }
                    }
                    None => break,
                }
            }
        });

        if let Some(previous) = self.slot().replace(task) {
            previous.abort();
        }
    }

    /// Abort the running countdown, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.slot().take() {
            handle.abort();
        }
    }

    /// Whether a countdown task is still running.
    pub fn is_running(&self) -> bool {
        self.slot().as_ref().is_some_and(|h| !h.is_finished())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for CooldownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
