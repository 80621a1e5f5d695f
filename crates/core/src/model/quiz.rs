use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId, QuizId};

/// Score (percent) a learner must reach for an attempt to pass.
///
/// Fixed across all quizzes; per-quiz thresholds are not supported.
pub const PASS_THRESHOLD_PERCENT: u8 = 70;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Malformed-definition errors, rejected when a quiz is constructed.
///
/// A definition that would grade every attempt to a silently wrong score is
/// refused up front rather than detected at submit time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz has no questions")]
    NoQuestions,

    #[error("time limit must be > 0 seconds when set")]
    ZeroTimeLimit,

    #[error("duplicate question id {0} in quiz")]
    DuplicateQuestionId(QuestionId),

    #[error("question {0} prompt cannot be empty")]
    EmptyPrompt(QuestionId),

    #[error("question {0} needs at least two options")]
    TooFewOptions(QuestionId),

    #[error("duplicate option id {option} on question {question}")]
    DuplicateOptionId {
        question: QuestionId,
        option: OptionId,
    },

    #[error("question {question} marks unknown option {option} as correct")]
    UnknownCorrectOption {
        question: QuestionId,
        option: OptionId,
    },

    #[error("question {0} has an empty correct-answer set")]
    EmptyCorrectSelection(QuestionId),

    #[error("question {0} has a blank correct-answer text")]
    BlankCorrectText(QuestionId),
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// A selectable option on a choice-type question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub id: OptionId,
    pub text: String,
}

impl AnswerOption {
    #[must_use]
    pub fn new(id: OptionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Type-specific payload of a question, carrying its correct-answer spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionBody {
    /// Exactly one option is correct.
    MultipleChoice {
        options: Vec<AnswerOption>,
        correct: OptionId,
    },
    /// A set of options is correct; the selection must match it exactly.
    MultipleSelect {
        options: Vec<AnswerOption>,
        correct: BTreeSet<OptionId>,
    },
    /// Free text, compared after trimming and case folding.
    Text { correct: String },
}

impl QuestionBody {
    /// Grades an answer against this question's correct-answer spec.
    ///
    /// Absent answers and answers of the wrong shape are incorrect.
    #[must_use]
    pub fn grade(&self, answer: Option<&AnswerValue>) -> bool {
        match (self, answer) {
            (QuestionBody::MultipleChoice { correct, .. }, Some(AnswerValue::Choice(picked))) => {
                picked == correct
            }
            (
                QuestionBody::MultipleSelect { correct, .. },
                Some(AnswerValue::Selection(picked)),
            ) => picked == correct,
            (QuestionBody::Text { correct }, Some(AnswerValue::Text(entered))) => {
                normalize_text(entered) == normalize_text(correct)
            }
            _ => false,
        }
    }

    /// Returns the option list for choice-type questions.
    #[must_use]
    pub fn options(&self) -> Option<&[AnswerOption]> {
        match self {
            QuestionBody::MultipleChoice { options, .. }
            | QuestionBody::MultipleSelect { options, .. } => Some(options),
            QuestionBody::Text { .. } => None,
        }
    }
}

/// A single quiz question: prompt plus typed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    id: QuestionId,
    prompt: String,
    body: QuestionBody,
}

impl QuizQuestion {
    /// Creates a question, validating its body.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the prompt is blank, a choice body has fewer
    /// than two options or a correct id outside its options, a select body
    /// has an empty correct set, or a text body has a blank correct answer.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        body: QuestionBody,
    ) -> Result<Self, QuizError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuizError::EmptyPrompt(id));
        }

        match &body {
            QuestionBody::MultipleChoice { options, correct } => {
                let known = validate_options(id, options)?;
                if !known.contains(correct) {
                    return Err(QuizError::UnknownCorrectOption {
                        question: id,
                        option: *correct,
                    });
                }
            }
            QuestionBody::MultipleSelect { options, correct } => {
                let known = validate_options(id, options)?;
                if correct.is_empty() {
                    return Err(QuizError::EmptyCorrectSelection(id));
                }
                for option in correct {
                    if !known.contains(option) {
                        return Err(QuizError::UnknownCorrectOption {
                            question: id,
                            option: *option,
                        });
                    }
                }
            }
            QuestionBody::Text { correct } => {
                if correct.trim().is_empty() {
                    return Err(QuizError::BlankCorrectText(id));
                }
            }
        }

        Ok(Self { id, prompt, body })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn body(&self) -> &QuestionBody {
        &self.body
    }
}

fn validate_options(
    question: QuestionId,
    options: &[AnswerOption],
) -> Result<HashSet<OptionId>, QuizError> {
    if options.len() < 2 {
        return Err(QuizError::TooFewOptions(question));
    }
    let mut seen = HashSet::with_capacity(options.len());
    for option in options {
        if !seen.insert(option.id) {
            return Err(QuizError::DuplicateOptionId {
                question,
                option: option.id,
            });
        }
    }
    Ok(seen)
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// A learner's current answer to one question.
///
/// Serializable so a session's answer record can be snapshotted or uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerValue {
    Choice(OptionId),
    Selection(BTreeSet<OptionId>),
    Text(String),
}

/// Trims surrounding whitespace and case-folds for text comparison.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    raw.trim().to_lowercase()
}

//
// ─── DEFINITION ────────────────────────────────────────────────────────────────
//

/// A validated quiz: ordered questions plus an optional time limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDefinition {
    id: QuizId,
    title: String,
    time_limit_secs: Option<u32>,
    questions: Vec<QuizQuestion>,
}

impl QuizDefinition {
    /// Creates a quiz definition, failing fast on malformed input.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty question list,
    /// `QuizError::DuplicateQuestionId` for repeated ids,
    /// `QuizError::ZeroTimeLimit` for a declared zero-second limit, and
    /// `QuizError::EmptyTitle` for a blank title.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        time_limit_secs: Option<u32>,
        questions: Vec<QuizQuestion>,
    ) -> Result<Self, QuizError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        if time_limit_secs == Some(0) {
            return Err(QuizError::ZeroTimeLimit);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(QuizError::DuplicateQuestionId(question.id()));
            }
        }

        Ok(Self {
            id,
            title,
            time_limit_secs,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Time limit in seconds, or `None` for an untimed quiz.
    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u32> {
        self.time_limit_secs
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}
