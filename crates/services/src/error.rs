//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{CourseError, LessonId, OptionId, QuestionId, QuizId};

/// State-machine and lookup errors from an assessment session.
///
/// These indicate host-integration bugs (calling an operation in the wrong
/// phase) or unknown ids, never expected runtime conditions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("session not started")]
    NotStarted,

    #[error("session already completed")]
    AlreadyCompleted,

    #[error("session not completed yet")]
    NotCompleted,

    #[error("question {0} not found in quiz")]
    QuestionNotFound(QuestionId),

    #[error("option {option} not found on question {question}")]
    UnknownOption {
        question: QuestionId,
        option: OptionId,
    },

    #[error("answer shape does not match question {0}")]
    AnswerShapeMismatch(QuestionId),

    #[error("passed attempts have no retake path")]
    RetakeAfterPass,
}

/// Errors emitted by `LearningFlowService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error("lesson {0} is not a quiz")]
    NotAQuiz(LessonId),

    #[error("session quiz {session} does not belong to lesson quiz {lesson}")]
    QuizMismatch { lesson: QuizId, session: QuizId },

    #[error(transparent)]
    Course(#[from] CourseError),

    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}
