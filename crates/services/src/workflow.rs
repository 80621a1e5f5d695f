use std::sync::Arc;

use course_core::model::{Course, LessonId};
use course_core::Clock;
use gateway::{GatewayError, QuizResultUpload, SubmissionGateway};

use crate::assessment::{AssessmentSession, QuizOutcome};
use crate::error::FlowError;

/// Outcome of one remote push under the optimistic local-first policy.
///
/// Local state is already mutated by the time this exists; `Pending` means
/// the host owns retry/backoff and a "sync pending" indication.
#[derive(Debug, Clone)]
pub enum SyncStatus {
    Synced,
    Pending(GatewayError),
}

impl SyncStatus {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, SyncStatus::Pending(_))
    }
}

/// Result of submitting an assessment through the flow service.
#[derive(Debug, Clone)]
pub struct AssessmentReport {
    pub outcome: QuizOutcome,
    /// True when the pass newly completed the quiz lesson.
    pub lesson_completed: bool,
    pub result_sync: SyncStatus,
    /// Present only when a pass triggered a completion push.
    pub completion_sync: Option<SyncStatus>,
}

/// Orchestrates local progression mutations and their remote pushes.
///
/// Every operation mutates the local tree or session first and contacts the
/// gateway after; a gateway failure never reverts local state.
#[derive(Clone)]
pub struct LearningFlowService {
    clock: Clock,
    gateway: Arc<dyn SubmissionGateway>,
}

impl LearningFlowService {
    #[must_use]
    pub fn new(clock: Clock, gateway: Arc<dyn SubmissionGateway>) -> Self {
        Self { clock, gateway }
    }

    /// Creates a fresh assessment session for a quiz lesson.
    ///
    /// The caller starts the session (arming the countdown) when the learner
    /// actually begins.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NotAQuiz` for non-quiz lessons and propagates
    /// `CourseError::LessonNotFound` for unknown ids.
    pub fn start_assessment(
        &self,
        course: &Course,
        lesson_id: LessonId,
    ) -> Result<AssessmentSession, FlowError> {
        let lesson = course.find_lesson(lesson_id)?;
        let quiz = lesson.quiz().ok_or(FlowError::NotAQuiz(lesson_id))?;
        Ok(AssessmentSession::new(quiz.clone()))
    }

    /// Marks a lesson complete locally, then pushes the completion.
    ///
    /// Idempotent: re-completing an already complete lesson skips the push
    /// and reports `Synced`.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::LessonNotFound` for unknown ids. Gateway
    /// failures are not errors; they surface as `SyncStatus::Pending`.
    pub async fn complete_lesson(
        &self,
        course: &mut Course,
        lesson_id: LessonId,
    ) -> Result<SyncStatus, FlowError> {
        let newly_completed = course.mark_lesson_complete(lesson_id)?;
        if !newly_completed {
            return Ok(SyncStatus::Synced);
        }
        Ok(self.push_completion(lesson_id).await)
    }

    /// Submits an assessment, uploads the result, and on a pass completes
    /// the quiz lesson (locally then remotely).
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NotAQuiz` / `QuizMismatch` when the session does
    /// not belong to the lesson, and propagates session phase errors from
    /// `submit`. Gateway failures surface as `Pending` statuses, never as
    /// errors.
    pub async fn submit_assessment(
        &self,
        course: &mut Course,
        lesson_id: LessonId,
        session: &mut AssessmentSession,
    ) -> Result<AssessmentReport, FlowError> {
        let (module_id, lesson_quiz_id) = {
            let (module, lesson) = course.locate_lesson(lesson_id)?;
            let quiz = lesson.quiz().ok_or(FlowError::NotAQuiz(lesson_id))?;
            (module.id(), quiz.id())
        };
        if lesson_quiz_id != session.quiz().id() {
            return Err(FlowError::QuizMismatch {
                lesson: lesson_quiz_id,
                session: session.quiz().id(),
            });
        }

        let outcome = session.submit(self.clock.now())?.clone();

        let upload = QuizResultUpload {
            quiz_id: lesson_quiz_id,
            course_id: course.id(),
            module_id,
            answers: session.answers().clone(),
            score_percent: outcome.score_percent,
            time_spent_secs: session.time_spent_secs().unwrap_or(0),
        };
        let result_sync = match self.gateway.submit_quiz_result(&upload).await {
            Ok(()) => SyncStatus::Synced,
            Err(error) => SyncStatus::Pending(error),
        };

        let mut lesson_completed = false;
        let mut completion_sync = None;
        if outcome.passed {
            lesson_completed = course.mark_lesson_complete(lesson_id)?;
            if lesson_completed {
                completion_sync = Some(self.push_completion(lesson_id).await);
            }
        }

        Ok(AssessmentReport {
            outcome,
            lesson_completed,
            result_sync,
            completion_sync,
        })
    }

    async fn push_completion(&self, lesson_id: LessonId) -> SyncStatus {
        match self.gateway.complete_lesson(lesson_id).await {
            Ok(()) => SyncStatus::Synced,
            Err(error) => SyncStatus::Pending(error),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{
        AnswerOption, Course, CourseId, Lesson, LessonContent, Module, ModuleId, OptionId,
        QuestionBody, QuestionId, QuizDefinition, QuizId, QuizQuestion, VideoContent,
    };
    use course_core::time::fixed_clock;
    use gateway::InMemoryGateway;

    use crate::assessment::AnswerInput;
    use crate::navigator::LessonNavigator;
    use crate::progress::ProgressAggregator;

    fn video_lesson(id: u64, completed: bool) -> Lesson {
        let video = VideoContent::new("https://cdn.example.com/v.mp4", None).unwrap();
        Lesson::from_parts(
            LessonId::new(id),
            format!("Lesson {id}"),
            completed,
            LessonContent::Video(video),
        )
        .unwrap()
    }

    fn quiz_lesson(id: u64) -> Lesson {
        let question = QuizQuestion::new(
            QuestionId::new(1),
            "Pick A",
            QuestionBody::MultipleChoice {
                options: vec![
                    AnswerOption::new(OptionId::new(1), "A"),
                    AnswerOption::new(OptionId::new(2), "B"),
                ],
                correct: OptionId::new(1),
            },
        )
        .unwrap();
        let quiz = QuizDefinition::new(QuizId::new(7), "Checkpoint", None, vec![question]).unwrap();
        Lesson::new(LessonId::new(id), "Checkpoint", LessonContent::Quiz(quiz)).unwrap()
    }

    // the end-to-end course of spec'd shape: M1 [video done, quiz], M2 [video]
    fn build_course() -> Course {
        let m1 = Module::new(
            ModuleId::new(1),
            "Basics",
            vec![video_lesson(1, true), quiz_lesson(2)],
        )
        .unwrap();
        let m2 = Module::new(ModuleId::new(2), "Advanced", vec![video_lesson(3, false)]).unwrap();
        Course::new(CourseId::new(1), "Rust 101", vec![m1, m2]).unwrap()
    }

    fn build_service(gateway: &InMemoryGateway) -> LearningFlowService {
        LearningFlowService::new(fixed_clock(), Arc::new(gateway.clone()))
    }

    #[tokio::test]
    async fn passing_a_quiz_advances_progress_and_navigation() {
        let mut course = build_course();
        let gateway = InMemoryGateway::new();
        let service = build_service(&gateway);

        assert_eq!(
            LessonNavigator::new(&course).first_incomplete().unwrap().id(),
            LessonId::new(2)
        );
        assert_eq!(ProgressAggregator::new(&course).course_percent(), 33);

        let mut session = service.start_assessment(&course, LessonId::new(2)).unwrap();
        session.start(fixed_clock().now()).unwrap();
        session
            .answer(QuestionId::new(1), AnswerInput::Choose(OptionId::new(1)))
            .unwrap();

        let report = service
            .submit_assessment(&mut course, LessonId::new(2), &mut session)
            .await
            .unwrap();

        assert!(report.outcome.passed);
        assert!(report.lesson_completed);
        assert!(!report.result_sync.is_pending());
        assert!(matches!(report.completion_sync, Some(SyncStatus::Synced)));

        assert_eq!(
            LessonNavigator::new(&course).first_incomplete().unwrap().id(),
            LessonId::new(3)
        );
        assert_eq!(ProgressAggregator::new(&course).course_percent(), 67);

        assert_eq!(gateway.completed_lessons(), vec![LessonId::new(2)]);
        let uploads = gateway.submitted_results();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].quiz_id, QuizId::new(7));
        assert_eq!(uploads[0].module_id, ModuleId::new(1));
        assert_eq!(uploads[0].score_percent, 100);
    }

    #[tokio::test]
    async fn failing_a_quiz_leaves_the_lesson_incomplete() {
        let mut course = build_course();
        let gateway = InMemoryGateway::new();
        let service = build_service(&gateway);

        let mut session = service.start_assessment(&course, LessonId::new(2)).unwrap();
        session.start(fixed_clock().now()).unwrap();
        session
            .answer(QuestionId::new(1), AnswerInput::Choose(OptionId::new(2)))
            .unwrap();

        let report = service
            .submit_assessment(&mut course, LessonId::new(2), &mut session)
            .await
            .unwrap();

        assert!(!report.outcome.passed);
        assert!(!report.lesson_completed);
        assert!(report.completion_sync.is_none());
        assert!(!course.find_lesson(LessonId::new(2)).unwrap().is_completed());
        assert!(gateway.completed_lessons().is_empty());
        // the failed result is still uploaded
        assert_eq!(gateway.submitted_results().len(), 1);

        // and the learner can retake from a fresh session
        let retaken = session.retake().unwrap();
        assert!(retaken.answers().is_empty());
    }

    #[tokio::test]
    async fn gateway_failure_keeps_local_completion() {
        let mut course = build_course();
        let gateway = InMemoryGateway::new();
        let service = build_service(&gateway);

        gateway.fail_next(GatewayError::Connection("offline".into()));
        let status = service
            .complete_lesson(&mut course, LessonId::new(3))
            .await
            .unwrap();

        assert!(status.is_pending());
        if let SyncStatus::Pending(error) = status {
            assert!(error.is_retryable());
        }
        // local state is authoritative despite the failed push
        assert!(course.find_lesson(LessonId::new(3)).unwrap().is_completed());
        assert!(gateway.completed_lessons().is_empty());
    }

    #[tokio::test]
    async fn recompleting_a_lesson_skips_the_push() {
        let mut course = build_course();
        let gateway = InMemoryGateway::new();
        let service = build_service(&gateway);

        let status = service
            .complete_lesson(&mut course, LessonId::new(1))
            .await
            .unwrap();
        assert!(!status.is_pending());
        assert!(gateway.completed_lessons().is_empty());
    }

    #[tokio::test]
    async fn starting_an_assessment_on_a_video_lesson_fails() {
        let course = build_course();
        let gateway = InMemoryGateway::new();
        let service = build_service(&gateway);

        let err = service
            .start_assessment(&course, LessonId::new(1))
            .unwrap_err();
        assert!(matches!(err, FlowError::NotAQuiz(id) if id == LessonId::new(1)));
    }

    #[tokio::test]
    async fn submitting_against_the_wrong_lesson_is_rejected() {
        let mut course = build_course();
        let gateway = InMemoryGateway::new();
        let service = build_service(&gateway);

        let other_quiz = QuizDefinition::new(
            QuizId::new(99),
            "Other",
            None,
            vec![QuizQuestion::new(
                QuestionId::new(1),
                "Pick A",
                QuestionBody::MultipleChoice {
                    options: vec![
                        AnswerOption::new(OptionId::new(1), "A"),
                        AnswerOption::new(OptionId::new(2), "B"),
                    ],
                    correct: OptionId::new(1),
                },
            )
            .unwrap()],
        )
        .unwrap();
        let mut session = crate::assessment::AssessmentSession::new(other_quiz);
        session.start(fixed_clock().now()).unwrap();

        let err = service
            .submit_assessment(&mut course, LessonId::new(2), &mut session)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::QuizMismatch { .. }));
    }

    #[tokio::test]
    async fn pending_result_upload_does_not_block_completion_push() {
        let mut course = build_course();
        let gateway = InMemoryGateway::new();
        let service = build_service(&gateway);

        let mut session = service.start_assessment(&course, LessonId::new(2)).unwrap();
        session.start(fixed_clock().now()).unwrap();
        session
            .answer(QuestionId::new(1), AnswerInput::Choose(OptionId::new(1)))
            .unwrap();

        gateway.fail_next(GatewayError::Connection("offline".into()));
        let report = service
            .submit_assessment(&mut course, LessonId::new(2), &mut session)
            .await
            .unwrap();

        assert!(report.result_sync.is_pending());
        // the injected failure consumed itself; the completion push went out
        assert!(matches!(report.completion_sync, Some(SyncStatus::Synced)));
        assert!(course.find_lesson(LessonId::new(2)).unwrap().is_completed());
        assert_eq!(gateway.completed_lessons(), vec![LessonId::new(2)]);
    }
}
