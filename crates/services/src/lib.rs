#![forbid(unsafe_code)]

pub mod assessment;
pub mod error;
pub mod navigator;
pub mod progress;
pub mod workflow;

pub use course_core::Clock;

pub use assessment::{
    AnswerInput, AssessmentSession, CountdownHandle, QuizOutcome, SessionPhase, SessionSnapshot,
    TickStatus,
};
pub use error::{AssessmentError, FlowError};
pub use navigator::LessonNavigator;
pub use progress::{CourseProgress, ModuleProgress, ProgressAggregator};
pub use workflow::{AssessmentReport, LearningFlowService, SyncStatus};
