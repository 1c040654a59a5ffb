//! Application state for one verification workflow.
//!
//! `Session` is the state machine behind every surface: `Idle` until an
//! attempt starts, `Busy` while the model request is outstanding, then
//! `Succeeded` or `Failed`. A new selection or a clear always returns it to
//! `Idle`. Result and error are never both set.

use serde::Serialize;
use thiserror::Error;

use crate::error::{user_message, SELECT_IMAGES_MESSAGE};
use crate::types::VerificationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Busy,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a verification is already in progress")]
    AlreadyBusy,

    #[error("Please select images to verify.")]
    NothingSelected,

    #[error("verification attempt {attempt} was superseded (current generation {current})")]
    Stale { attempt: u64, current: u64 },
}

/// Ticket for one in-flight attempt: the generation it belongs to and a
/// snapshot of the files selected when it started.
#[derive(Debug, Clone)]
pub struct Attempt<F> {
    generation: u64,
    files: Vec<F>,
}

impl<F> Attempt<F> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn files(&self) -> &[F] {
        &self.files
    }
}

#[derive(Debug)]
pub struct Session<F> {
    images: Vec<F>,
    last_result: Option<VerificationResult>,
    last_error: Option<String>,
    busy: bool,
    generation: u64,
}

impl<F> Default for Session<F> {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            last_result: None,
            last_error: None,
            busy: false,
            generation: 0,
        }
    }
}

impl<F: Clone> Session<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        if self.busy {
            SessionStatus::Busy
        } else if self.last_result.is_some() {
            SessionStatus::Succeeded
        } else if self.last_error.is_some() {
            SessionStatus::Failed
        } else {
            SessionStatus::Idle
        }
    }

    pub fn images(&self) -> &[F] {
        &self.images
    }

    pub fn last_result(&self) -> Option<&VerificationResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the verify action is enabled.
    pub fn can_verify(&self) -> bool {
        !self.busy && !self.images.is_empty()
    }

    /// Replace the selection and discard any prior outcome.
    ///
    /// Bumps the generation, so a request still in flight for the old
    /// selection completes as stale.
    pub fn select_images(&mut self, files: Vec<F>) {
        self.images = files;
        self.reset();
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.reset();
    }

    fn reset(&mut self) {
        self.last_result = None;
        self.last_error = None;
        self.busy = false;
        self.generation += 1;
    }

    /// Start an attempt. With nothing selected this fails locally and records
    /// the validation message; the model is never contacted.
    pub fn begin_verification(&mut self) -> Result<Attempt<F>, SessionError> {
        if self.busy {
            return Err(SessionError::AlreadyBusy);
        }
        if self.images.is_empty() {
            self.last_result = None;
            self.last_error = Some(SELECT_IMAGES_MESSAGE.to_string());
            return Err(SessionError::NothingSelected);
        }

        self.generation += 1;
        self.busy = true;
        self.last_result = None;
        self.last_error = None;
        Ok(Attempt {
            generation: self.generation,
            files: self.images.clone(),
        })
    }

    /// Record the outcome of `attempt`, consuming its ticket.
    pub fn complete<E>(
        &mut self,
        attempt: Attempt<F>,
        outcome: Result<VerificationResult, E>,
    ) -> Result<SessionStatus, SessionError>
    where
        E: std::error::Error,
    {
        let generation = attempt.generation;
        if !self.busy || generation != self.generation {
            return Err(SessionError::Stale {
                attempt: generation,
                current: self.generation,
            });
        }

        self.busy = false;
        match outcome {
            Ok(result) => {
                self.last_result = Some(result);
                self.last_error = None;
            }
            Err(err) => {
                self.last_result = None;
                self.last_error = Some(user_message(&err));
            }
        }
        Ok(self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{VerifyError, UNKNOWN_ERROR_MESSAGE};

    fn result(invoice: bool) -> VerificationResult {
        VerificationResult {
            vehicle_plate_visible: true,
            goods_being_unloaded: true,
            vehicle_fully_loaded: true,
            vehicle_empty: true,
            receipt_memo_present: true,
            invoice_present: invoice,
            summary: "ok".into(),
        }
    }

    #[derive(Debug, Error)]
    #[error("")]
    struct Silent;

    #[test]
    fn starts_idle_and_disabled() {
        let s: Session<&str> = Session::new();
        assert_eq!(s.status(), SessionStatus::Idle);
        assert!(!s.can_verify());
    }

    #[test]
    fn empty_selection_fails_without_attempt() {
        let mut s: Session<&str> = Session::new();
        assert_eq!(s.begin_verification().unwrap_err(), SessionError::NothingSelected);
        assert_eq!(s.status(), SessionStatus::Failed);
        assert_eq!(s.last_error(), Some(SELECT_IMAGES_MESSAGE));
        assert!(!s.is_busy());
    }

    #[test]
    fn success_path() {
        let mut s = Session::new();
        s.select_images(vec!["a.jpg", "b.jpg"]);
        let attempt = s.begin_verification().unwrap();
        assert_eq!(attempt.files().len(), 2);
        assert!(s.is_busy());
        assert!(!s.can_verify());

        let status = s
            .complete::<VerifyError>(attempt, Ok(result(true)))
            .unwrap();
        assert_eq!(status, SessionStatus::Succeeded);
        assert!(!s.is_busy());
        assert!(s.last_error().is_none());
    }

    #[test]
    fn failure_clears_busy_and_keeps_modes_exclusive() {
        let mut s = Session::new();
        s.select_images(vec!["a.jpg"]);
        let first = s.begin_verification().unwrap();
        s.complete::<VerifyError>(first, Ok(result(true))).unwrap();

        let second = s.begin_verification().unwrap();
        assert!(s.last_result().is_none());
        s.complete(second, Err(VerifyError::AnalysisFailed))
            .unwrap();
        assert_eq!(s.status(), SessionStatus::Failed);
        assert!(s.last_result().is_none());
        assert_eq!(
            s.last_error(),
            Some("Failed to analyze images. The AI model could not process the request.")
        );
        assert!(!s.is_busy());
    }

    #[test]
    fn blank_error_uses_fallback() {
        let mut s = Session::new();
        s.select_images(vec!["a.jpg"]);
        let a = s.begin_verification().unwrap();
        s.complete(a, Err(Silent)).unwrap();
        assert_eq!(s.last_error(), Some(UNKNOWN_ERROR_MESSAGE));
    }

    #[test]
    fn cannot_retrigger_while_busy() {
        let mut s = Session::new();
        s.select_images(vec!["a.jpg"]);
        let _a = s.begin_verification().unwrap();
        assert_eq!(s.begin_verification().unwrap_err(), SessionError::AlreadyBusy);
    }

    #[test]
    fn new_selection_discards_result() {
        let mut s = Session::new();
        s.select_images(vec!["a.jpg"]);
        let a = s.begin_verification().unwrap();
        s.complete::<VerifyError>(a, Ok(result(false))).unwrap();
        assert!(s.last_result().is_some());

        s.select_images(vec!["b.jpg"]);
        assert!(s.last_result().is_none());
        assert_eq!(s.status(), SessionStatus::Idle);
    }

    #[test]
    fn clear_resets_to_disabled_idle() {
        let mut s = Session::new();
        s.select_images(vec!["a.jpg"]);
        let a = s.begin_verification().unwrap();
        s.complete::<VerifyError>(a, Ok(result(true))).unwrap();

        s.clear();
        assert_eq!(s.status(), SessionStatus::Idle);
        assert!(s.last_result().is_none());
        assert!(!s.can_verify());
    }

    #[test]
    fn completion_after_reselect_is_stale() {
        let mut s = Session::new();
        s.select_images(vec!["a.jpg"]);
        let a = s.begin_verification().unwrap();
        s.select_images(vec!["b.jpg"]);

        let err = s
            .complete::<VerifyError>(a, Ok(result(true)))
            .unwrap_err();
        assert!(matches!(err, SessionError::Stale { .. }));
        assert_eq!(s.status(), SessionStatus::Idle);
        assert!(s.last_result().is_none());
    }
}
