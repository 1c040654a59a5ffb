//! Application shell: wires intake, session, and the vision model together.
//!
//! State sits behind one async mutex. The lock is taken to start and to
//! finish an attempt, never across the model request, so the selection can
//! change while a request is in flight (that completion then arrives stale).

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use dropcheck_core::{
    Attempt, ChecklistItem, Session, SessionError, SessionStatus, VerificationResult, VisionModel,
};
use dropcheck_logging::{VerificationEvent, VerificationEventLogger};
use dropcheck_media::{ImageFile, ImageIntake, IntakeOutcome, IntakeSource, MediaError, PreviewRegistry};
use dropcheck_understanding::{analyze_delivery_images, VerifyOptions};

struct ShellState {
    intake: ImageIntake,
    session: Session<ImageFile>,
}

#[derive(Clone)]
pub struct AppShell {
    state: Arc<Mutex<ShellState>>,
    model: Arc<dyn VisionModel>,
    options: VerifyOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub name: String,
    pub media_type: String,
    pub preview_url: String,
}

/// Everything a surface needs to draw the current state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub busy: bool,
    pub can_verify: bool,
    pub images: Vec<ImageSummary>,
    pub result: Option<VerificationResult>,
    pub overall_passed: Option<bool>,
    pub banner: Option<&'static str>,
    pub checklist: Option<Vec<ChecklistItem>>,
    pub error: Option<String>,
}

impl AppShell {
    pub fn new(
        model: Arc<dyn VisionModel>,
        options: VerifyOptions,
        registry: PreviewRegistry,
        max_images: usize,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ShellState {
                intake: ImageIntake::new(registry, max_images),
                session: Session::new(),
            })),
            model,
            options,
        }
    }

    /// Offer a batch to the intake. An accepted batch replaces the session's
    /// selection and discards any displayed outcome.
    pub async fn select(
        &self,
        files: Vec<ImageFile>,
        source: IntakeSource,
    ) -> Result<IntakeOutcome, MediaError> {
        let mut state = self.state.lock().await;
        let outcome = state.intake.select(files, source)?;
        if outcome.accepted {
            let files = state.intake.files();
            state.session.select_images(files);
        }
        Ok(outcome)
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.intake.clear();
        state.session.clear();
    }

    /// Run one verification attempt to completion.
    ///
    /// Returns the session status afterwards. Only a re-trigger while busy is
    /// an error; validation and analysis failures are recorded in the session.
    /// The attempt runs on its own task, so dropping this future (a client
    /// hanging up) neither aborts the model request nor leaves the session
    /// busy.
    pub async fn verify(&self) -> Result<SessionStatus, SessionError> {
        let attempt = {
            let mut state = self.state.lock().await;
            match state.session.begin_verification() {
                Ok(attempt) => attempt,
                Err(SessionError::NothingSelected) => {
                    info!("Verification triggered with no images selected");
                    return Ok(state.session.status());
                }
                Err(e) => return Err(e),
            }
        };

        let shell = self.clone();
        match tokio::spawn(async move { shell.run_attempt(attempt).await }).await {
            Ok(status) => status,
            Err(e) => {
                error!(error = %e, "Verification task did not finish");
                Ok(self.state.lock().await.session.status())
            }
        }
    }

    async fn run_attempt(&self, attempt: Attempt<ImageFile>) -> Result<SessionStatus, SessionError> {
        let generation = attempt.generation();
        VerificationEventLogger::log_event(
            generation,
            VerificationEvent::Started {
                images: attempt.files().len(),
                model: self.options.model.clone(),
            },
        );

        let outcome =
            analyze_delivery_images(self.model.as_ref(), attempt.files(), &self.options).await;

        let event = match &outcome {
            Ok(result) => VerificationEvent::Succeeded {
                passed: result.overall_passed(),
                failing: result.failing().iter().map(|c| c.key().to_string()).collect(),
            },
            Err(e) => VerificationEvent::Failed {
                error_msg: e.to_string(),
            },
        };

        let mut state = self.state.lock().await;
        match state.session.complete(attempt, outcome) {
            Ok(status) => {
                VerificationEventLogger::log_event(generation, event);
                Ok(status)
            }
            Err(SessionError::Stale { attempt, current }) => {
                warn!(attempt, current, "Discarding verification for a superseded selection");
                VerificationEventLogger::log_event(generation, VerificationEvent::Stale { attempt });
                Ok(state.session.status())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        let session = &state.session;
        let result = session.last_result().cloned();
        SessionSnapshot {
            status: session.status(),
            busy: session.is_busy(),
            can_verify: session.can_verify(),
            images: state
                .intake
                .selected()
                .iter()
                .map(|s| ImageSummary {
                    name: s.file().name().to_string(),
                    media_type: s.file().media_type().to_string(),
                    preview_url: s.preview().url(),
                })
                .collect(),
            overall_passed: result.as_ref().map(VerificationResult::overall_passed),
            banner: result.as_ref().map(VerificationResult::banner),
            checklist: result.as_ref().map(VerificationResult::checklist),
            error: session.last_error().map(str::to_string),
            result,
        }
    }
}
