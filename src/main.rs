use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use onboard_flow::config::OnboardingConfig;
use onboard_flow::error::FlowError;
use onboard_flow::onboarding::state::OTP_LENGTH;
use onboard_flow::onboarding::{
    ImageFile, LogNotifier, ObjectUrlRegistry, OnboardingRouteState, OnboardingSession,
    OnboardingStage, SessionContext, SessionEvent, onboarding_routes,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = OnboardingConfig::from_env()?;

    eprintln!("Onboard Flow v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Status API: http://0.0.0.0:{}/api/onboarding/status", config.http_port);
    eprintln!("   Resend cooldown: {}s", config.resend_cooldown_secs);
    eprintln!("   Set RUST_LOG=debug to see issued codes.\n");

    let context = SessionContext::new();
    let session = Arc::new(OnboardingSession::new(
        config.clone(),
        Arc::new(LogNotifier),
        Arc::new(context.clone()),
        Arc::new(ObjectUrlRegistry::new()),
    ));

    // Status server
    let app = onboarding_routes(OnboardingRouteState {
        session: Arc::clone(&session),
        context: context.clone(),
    });
    let port = config.http_port;
    tokio::spawn(async move {
        match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => {
                tracing::info!(port, "Onboarding status server started");
                axum::serve(listener, app).await.ok();
            }
            Err(e) => tracing::warn!(port, error = %e, "Status server not started"),
        }
    });

    // Countdown notices
    let mut events = session.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::CooldownTick { remaining: 0 }) => {
                    eprintln!("\n   You can now type 'resend' for a new code.");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending_name: Option<String> = None;

    loop {
        let snapshot = session.snapshot().await;
        if snapshot.stage == OnboardingStage::Complete {
            break;
        }
        eprintln!("== {} ==", snapshot.title);
        match (snapshot.stage, &pending_name) {
            (OnboardingStage::EmailEntry, _) => eprint!("Email address: "),
            (OnboardingStage::OtpVerification, _) if snapshot.can_resend => {
                eprint!("{OTP_LENGTH}-digit code (or 'resend'): ")
            }
            (OnboardingStage::OtpVerification, _) => eprint!(
                "{OTP_LENGTH}-digit code (resend in {}s): ",
                snapshot.cooldown_seconds
            ),
            (OnboardingStage::ProfileCapture, None) => eprint!("Full name: "),
            (OnboardingStage::ProfileCapture, Some(_)) if snapshot.image_selected => {
                eprint!("Profile image path (blank keeps current): ")
            }
            (OnboardingStage::ProfileCapture, Some(_)) => eprint!("Profile image path: "),
            (OnboardingStage::Complete, _) => {}
        }

        let Some(line) = lines.next_line().await? else {
            eprintln!();
            return Ok(());
        };
        let line = line.trim();

        let result = match snapshot.stage {
            OnboardingStage::EmailEntry => session.submit_email(line).await,
            OnboardingStage::OtpVerification if line.eq_ignore_ascii_case("resend") => {
                match session.resend_otp().await {
                    Ok(true) => {
                        eprintln!("   A new code is on its way.");
                        Ok(())
                    }
                    Ok(false) => {
                        eprintln!("   Please wait for the countdown.");
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            OnboardingStage::OtpVerification => enter_code(&session, line).await,
            OnboardingStage::ProfileCapture => match pending_name.take() {
                None => {
                    pending_name = Some(line.to_string());
                    Ok(())
                }
                Some(name) => {
                    let image = if line.is_empty() {
                        None
                    } else {
                        match read_image(Path::new(line)).await {
                            Ok(file) => Some(file),
                            Err(e) => {
                                eprintln!("   Could not read {line}: {e}");
                                pending_name = Some(name);
                                continue;
                            }
                        }
                    };
                    session.submit_profile(&name, image).await
                }
            },
            OnboardingStage::Complete => Ok(()),
        };

        if let Err(e) = result {
            eprintln!("   {e}");
        }
    }

    let user = context.current().await;
    eprintln!("\nRegistration Complete! Redirecting...");
    tokio::time::sleep(config.redirect_delay).await;
    eprintln!("\nWelcome back, {}!", user.full_name);
    eprintln!("   Email: {}", user.email);
    eprintln!("   Image: {}", user.image_ref);

    Ok(())
}

/// Type `code` into the digit boxes one by one, then submit.
///
/// Input longer than the box count is refused before any box is written.
async fn enter_code(session: &OnboardingSession, code: &str) -> Result<(), FlowError> {
    if code.chars().count() > OTP_LENGTH {
        return Err(FlowError::SlotOutOfRange { index: OTP_LENGTH });
    }
    let mut digits = code.chars();
    for index in 0..OTP_LENGTH {
        let value = digits.next().map(String::from).unwrap_or_default();
        session.set_otp_digit(index, &value).await?;
    }
    session.submit_otp().await
}

async fn read_image(path: &Path) -> std::io::Result<ImageFile> {
    let data = tokio::fs::read(path).await?;
    Ok(ImageFile::from_path(path, data))
}
