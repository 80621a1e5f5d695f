use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use course_core::model::{
    AnswerValue, OptionId, QuestionBody, QuestionId, QuizDefinition, PASS_THRESHOLD_PERCENT,
};

use super::timer::CountdownHandle;
use crate::error::AssessmentError;
use crate::progress::rounded_percent;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of one quiz attempt.
///
/// The only transitions are `NotStarted → InProgress → Completed`; a retake
/// is a brand-new session, never a resumed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Completed,
}

/// A learner-facing answer mutation.
///
/// `Choose` and `Text` overwrite the current answer; `ToggleOption` flips one
/// option in the current selected set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    Choose(OptionId),
    ToggleOption(OptionId),
    Text(String),
}

/// Outcome of a tick delivered to the session.
///
/// Ticks are total: delivering one to an untimed, not-started, or completed
/// session is a silent `Idle`, since cancellation races at teardown are
/// expected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickStatus<'a> {
    /// Tick ignored: session is not in progress or has no time limit.
    Idle,
    /// Counter decremented, time still remaining.
    Running { remaining_secs: u32 },
    /// Counter hit zero; the session auto-submitted with this result.
    Expired(&'a QuizOutcome),
}

/// Immutable result of a completed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub score_percent: u8,
    pub passed: bool,
    pub per_question: BTreeMap<QuestionId, bool>,
}

/// Serializable record of a session's mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub answers: BTreeMap<QuestionId, AnswerValue>,
    pub flagged: BTreeSet<QuestionId>,
    pub remaining_secs: Option<u32>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a quiz's question set.
///
/// Owns all attempt state explicitly (answers, flags, countdown) so the
/// machine is testable without any rendering layer. Timestamps are injected
/// by the caller so a services-layer clock keeps time deterministic.
pub struct AssessmentSession {
    quiz: QuizDefinition,
    phase: SessionPhase,
    answers: BTreeMap<QuestionId, AnswerValue>,
    flagged: BTreeSet<QuestionId>,
    remaining_secs: Option<u32>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    outcome: Option<QuizOutcome>,
    countdown: Option<CountdownHandle>,
}

impl AssessmentSession {
    /// Creates a fresh, not-yet-started session over a validated definition.
    #[must_use]
    pub fn new(quiz: QuizDefinition) -> Self {
        Self {
            quiz,
            phase: SessionPhase::NotStarted,
            answers: BTreeMap::new(),
            flagged: BTreeSet::new(),
            remaining_secs: None,
            started_at: None,
            completed_at: None,
            outcome: None,
            countdown: None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizDefinition {
        &self.quiz
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<QuestionId, AnswerValue> {
        &self.answers
    }

    #[must_use]
    pub fn flagged(&self) -> &BTreeSet<QuestionId> {
        &self.flagged
    }

    /// Seconds left on the countdown, `None` for untimed or unstarted.
    #[must_use]
    pub fn remaining_secs(&self) -> Option<u32> {
        self.remaining_secs
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    /// Number of questions with a recorded answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Wall time between start and completion, once both exist.
    #[must_use]
    pub fn time_spent_secs(&self) -> Option<u32> {
        let (started, completed) = (self.started_at?, self.completed_at?);
        let secs = (completed - started).num_seconds().max(0);
        Some(u32::try_from(secs).unwrap_or(u32::MAX))
    }

    /// Serializable copy of the mutable attempt state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            answers: self.answers.clone(),
            flagged: self.flagged.clone(),
            remaining_secs: self.remaining_secs,
        }
    }

    /// Starts the attempt, arming the countdown when the quiz is timed.
    ///
    /// Returns a cancellation handle for the host's tick source on timed
    /// quizzes; the host must cancel it on teardown, and the session cancels
    /// it itself on completion.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::AlreadyStarted` or `AlreadyCompleted` when
    /// called out of phase.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Option<CountdownHandle>, AssessmentError> {
        match self.phase {
            SessionPhase::NotStarted => {}
            SessionPhase::InProgress => return Err(AssessmentError::AlreadyStarted),
            SessionPhase::Completed => return Err(AssessmentError::AlreadyCompleted),
        }

        self.phase = SessionPhase::InProgress;
        self.started_at = Some(now);
        self.remaining_secs = self.quiz.time_limit_secs();

        if self.remaining_secs.is_some() {
            let handle = CountdownHandle::new();
            self.countdown = Some(handle.clone());
            Ok(Some(handle))
        } else {
            Ok(None)
        }
    }

    /// Records or updates the answer to one question.
    ///
    /// # Errors
    ///
    /// Returns a phase error outside `InProgress`,
    /// `AssessmentError::QuestionNotFound` for an unknown question,
    /// `AssessmentError::UnknownOption` for an option off the question, and
    /// `AssessmentError::AnswerShapeMismatch` when the input variant does not
    /// fit the question type.
    pub fn answer(
        &mut self,
        question_id: QuestionId,
        input: AnswerInput,
    ) -> Result<(), AssessmentError> {
        self.ensure_in_progress()?;
        let question = self
            .quiz
            .question(question_id)
            .ok_or(AssessmentError::QuestionNotFound(question_id))?;

        match (question.body(), input) {
            (QuestionBody::MultipleChoice { options, .. }, AnswerInput::Choose(option)) => {
                ensure_known_option(question_id, options.iter().map(|o| o.id), option)?;
                self.answers.insert(question_id, AnswerValue::Choice(option));
            }
            (QuestionBody::MultipleSelect { options, .. }, AnswerInput::ToggleOption(option)) => {
                ensure_known_option(question_id, options.iter().map(|o| o.id), option)?;
                let mut selected = match self.answers.remove(&question_id) {
                    Some(AnswerValue::Selection(set)) => set,
                    _ => BTreeSet::new(),
                };
                if !selected.remove(&option) {
                    selected.insert(option);
                }
                // an emptied selection leaves the record sparse again
                if !selected.is_empty() {
                    self.answers
                        .insert(question_id, AnswerValue::Selection(selected));
                }
            }
            (QuestionBody::Text { .. }, AnswerInput::Text(entered)) => {
                self.answers.insert(question_id, AnswerValue::Text(entered));
            }
            _ => return Err(AssessmentError::AnswerShapeMismatch(question_id)),
        }

        Ok(())
    }

    /// Flips the advisory review flag on one question.
    ///
    /// Returns whether the question is flagged afterwards. Flags never affect
    /// scoring.
    ///
    /// # Errors
    ///
    /// Returns a phase error outside `InProgress`, or
    /// `AssessmentError::QuestionNotFound` for an unknown question.
    pub fn toggle_flag(&mut self, question_id: QuestionId) -> Result<bool, AssessmentError> {
        self.ensure_in_progress()?;
        if self.quiz.question(question_id).is_none() {
            return Err(AssessmentError::QuestionNotFound(question_id));
        }
        if self.flagged.remove(&question_id) {
            Ok(false)
        } else {
            self.flagged.insert(question_id);
            Ok(true)
        }
    }

    /// Applies one second of countdown.
    ///
    /// Total by contract: ticks landing on an untimed, unstarted, or already
    /// completed session are `Idle` no-ops. When the counter reaches zero the
    /// session submits itself, exactly once, and reports `Expired`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickStatus<'_> {
        if self.phase != SessionPhase::InProgress {
            return TickStatus::Idle;
        }
        let Some(remaining) = self.remaining_secs else {
            return TickStatus::Idle;
        };

        let remaining = remaining.saturating_sub(1);
        self.remaining_secs = Some(remaining);

        if remaining == 0 {
            let outcome = self.complete(now);
            return TickStatus::Expired(outcome);
        }
        TickStatus::Running {
            remaining_secs: remaining,
        }
    }

    /// Submits the attempt and freezes its result.
    ///
    /// Unanswered questions count as incorrect. Submitting an already
    /// completed session is a no-op returning the existing result.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::NotStarted` when the session never started.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<&QuizOutcome, AssessmentError> {
        match self.phase {
            SessionPhase::NotStarted => Err(AssessmentError::NotStarted),
            SessionPhase::InProgress => Ok(self.complete(now)),
            SessionPhase::Completed => self
                .outcome
                .as_ref()
                .ok_or(AssessmentError::NotCompleted),
        }
    }

    /// Produces a fresh session over the same quiz after a failed attempt.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::NotCompleted` before submission and
    /// `AssessmentError::RetakeAfterPass` once the attempt passed; the pass
    /// case has no retake path.
    pub fn retake(&self) -> Result<AssessmentSession, AssessmentError> {
        match &self.outcome {
            None => Err(AssessmentError::NotCompleted),
            Some(outcome) if outcome.passed => Err(AssessmentError::RetakeAfterPass),
            Some(_) => Ok(AssessmentSession::new(self.quiz.clone())),
        }
    }

    fn complete(&mut self, now: DateTime<Utc>) -> &QuizOutcome {
        let per_question: BTreeMap<QuestionId, bool> = self
            .quiz
            .questions()
            .iter()
            .map(|question| {
                let correct = question.body().grade(self.answers.get(&question.id()));
                (question.id(), correct)
            })
            .collect();

        let correct_count = per_question.values().filter(|c| **c).count();
        let score_percent = rounded_percent(correct_count, self.quiz.question_count());

        self.phase = SessionPhase::Completed;
        self.completed_at = Some(now);
        if let Some(handle) = self.countdown.take() {
            handle.cancel();
        }

        self.outcome.insert(QuizOutcome {
            score_percent,
            passed: score_percent >= PASS_THRESHOLD_PERCENT,
            per_question,
        })
    }

    fn ensure_in_progress(&self) -> Result<(), AssessmentError> {
        match self.phase {
            SessionPhase::InProgress => Ok(()),
            SessionPhase::NotStarted => Err(AssessmentError::NotStarted),
            SessionPhase::Completed => Err(AssessmentError::AlreadyCompleted),
        }
    }
}

fn ensure_known_option(
    question: QuestionId,
    mut known: impl Iterator<Item = OptionId>,
    option: OptionId,
) -> Result<(), AssessmentError> {
    if known.any(|id| id == option) {
        Ok(())
    } else {
        Err(AssessmentError::UnknownOption { question, option })
    }
}

impl fmt::Debug for AssessmentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentSession")
            .field("quiz_id", &self.quiz.id())
            .field("phase", &self.phase)
            .field("answered", &self.answers.len())
            .field("flagged", &self.flagged.len())
            .field("remaining_secs", &self.remaining_secs)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
