use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use course_core::model::{AnswerValue, CourseId, LessonId, ModuleId, QuestionId, QuizId};

/// Errors surfaced by the remote submission boundary.
///
/// These are the only errors expected during normal operation; local state
/// stays authoritative and the host retries where `is_retryable` says so.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl GatewayError {
    /// True when the host should retry the same call later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Connection(_))
    }
}

/// Payload pushed to the remote store after a quiz attempt is submitted.
///
/// `answers` is sparse: unanswered questions are simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResultUpload {
    pub quiz_id: QuizId,
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub answers: BTreeMap<QuestionId, AnswerValue>,
    pub score_percent: u8,
    pub time_spent_secs: u32,
}

/// Remote persistence contract for completion and quiz results.
///
/// Implemented by the surrounding application; this engine only consumes it,
/// always after the local mutation has already succeeded.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// Persist a lesson completion remotely.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on rejection or transport failure. The caller
    /// must not revert local completion on failure.
    async fn complete_lesson(&self, lesson_id: LessonId) -> Result<(), GatewayError>;

    /// Persist one quiz attempt's result remotely.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on rejection or transport failure.
    async fn submit_quiz_result(&self, upload: &QuizResultUpload) -> Result<(), GatewayError>;
}

/// In-memory gateway recording every call, for tests and prototyping.
///
/// Failures can be injected to exercise the optimistic local-first policy.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    completed: Arc<Mutex<Vec<LessonId>>>,
    results: Arc<Mutex<Vec<QuizResultUpload>>>,
    fail_next: Arc<Mutex<Option<GatewayError>>>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next gateway call fail with the given error.
    pub fn fail_next(&self, error: GatewayError) {
        *self.fail_next.lock().expect("gateway mutex poisoned") = Some(error);
    }

    /// Lesson ids pushed through `complete_lesson`, in call order.
    #[must_use]
    pub fn completed_lessons(&self) -> Vec<LessonId> {
        self.completed.lock().expect("gateway mutex poisoned").clone()
    }

    /// Uploads pushed through `submit_quiz_result`, in call order.
    #[must_use]
    pub fn submitted_results(&self) -> Vec<QuizResultUpload> {
        self.results.lock().expect("gateway mutex poisoned").clone()
    }

    fn take_injected_failure(&self) -> Option<GatewayError> {
        self.fail_next.lock().expect("gateway mutex poisoned").take()
    }
}

#[async_trait]
impl SubmissionGateway for InMemoryGateway {
    async fn complete_lesson(&self, lesson_id: LessonId) -> Result<(), GatewayError> {
        if let Some(error) = self.take_injected_failure() {
            return Err(error);
        }
        self.completed
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?
            .push(lesson_id);
        Ok(())
    }

    async fn submit_quiz_result(&self, upload: &QuizResultUpload) -> Result<(), GatewayError> {
        if let Some(error) = self.take_injected_failure() {
            return Err(error);
        }
        self.results
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?
            .push(upload.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_upload(score: u8) -> QuizResultUpload {
        QuizResultUpload {
            quiz_id: QuizId::new(1),
            course_id: CourseId::new(1),
            module_id: ModuleId::new(1),
            answers: BTreeMap::new(),
            score_percent: score,
            time_spent_secs: 45,
        }
    }

    #[tokio::test]
    async fn records_completions_in_order() {
        let gateway = InMemoryGateway::new();
        gateway.complete_lesson(LessonId::new(1)).await.unwrap();
        gateway.complete_lesson(LessonId::new(2)).await.unwrap();

        assert_eq!(
            gateway.completed_lessons(),
            vec![LessonId::new(1), LessonId::new(2)]
        );
    }

    #[tokio::test]
    async fn records_result_uploads() {
        let gateway = InMemoryGateway::new();
        gateway.submit_quiz_result(&build_upload(80)).await.unwrap();

        let results = gateway.submitted_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score_percent, 80);
    }

    #[tokio::test]
    async fn injected_failure_hits_exactly_one_call() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next(GatewayError::Connection("offline".into()));

        let err = gateway.complete_lesson(LessonId::new(1)).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(gateway.completed_lessons().is_empty());

        gateway.complete_lesson(LessonId::new(1)).await.unwrap();
        assert_eq!(gateway.completed_lessons(), vec![LessonId::new(1)]);
    }

    #[test]
    fn rejection_is_not_retryable() {
        assert!(!GatewayError::Rejected("bad payload".into()).is_retryable());
        assert!(GatewayError::Connection("timeout".into()).is_retryable());
    }
}
