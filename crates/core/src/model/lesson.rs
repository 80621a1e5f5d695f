use thiserror::Error;
use url::Url;

use crate::model::ids::LessonId;
use crate::model::quiz::QuizDefinition;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("invalid video source url: {0}")]
    InvalidVideoUrl(String),

    #[error("video duration must be > 0 seconds when set")]
    ZeroVideoDuration,

    #[error("assignment instructions cannot be empty")]
    EmptyInstructions,
}

//
// ─── CONTENT ───────────────────────────────────────────────────────────────────
//

/// Playable video payload for a video lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoContent {
    source: Url,
    duration_secs: Option<u32>,
}

impl VideoContent {
    /// Creates video content from a source url string.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::InvalidVideoUrl` if the source does not parse,
    /// or `LessonError::ZeroVideoDuration` for a declared zero duration.
    pub fn new(source: &str, duration_secs: Option<u32>) -> Result<Self, LessonError> {
        let source =
            Url::parse(source).map_err(|_| LessonError::InvalidVideoUrl(source.to_owned()))?;
        if duration_secs == Some(0) {
            return Err(LessonError::ZeroVideoDuration);
        }
        Ok(Self {
            source,
            duration_secs,
        })
    }

    #[must_use]
    pub fn source(&self) -> &Url {
        &self.source
    }

    #[must_use]
    pub fn duration_secs(&self) -> Option<u32> {
        self.duration_secs
    }
}

/// Instructions payload for an assignment lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentBrief {
    instructions: String,
}

impl AssignmentBrief {
    /// Creates an assignment brief.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyInstructions` for blank instructions.
    pub fn new(instructions: impl Into<String>) -> Result<Self, LessonError> {
        let instructions = instructions.into();
        if instructions.trim().is_empty() {
            return Err(LessonError::EmptyInstructions);
        }
        Ok(Self { instructions })
    }

    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

/// Type-specific payload of a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonContent {
    Video(VideoContent),
    Quiz(QuizDefinition),
    Assignment(AssignmentBrief),
}

/// Discriminant of a lesson's content, for cheap type queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonKind {
    Video,
    Quiz,
    Assignment,
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Atomic unit of course content.
///
/// The completion flag is monotonic: once set it cannot be reverted through
/// this type, and re-marking is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    completed: bool,
    content: LessonContent,
}

impl Lesson {
    /// Creates an incomplete lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` for a blank title.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        content: LessonContent,
    ) -> Result<Self, LessonError> {
        Self::from_parts(id, title, false, content)
    }

    /// Rehydrates a lesson with a known completion flag, e.g. from a course
    /// payload the host fetched.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` for a blank title.
    pub fn from_parts(
        id: LessonId,
        title: impl Into<String>,
        completed: bool,
        content: LessonContent,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            completed,
            content,
        })
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn content(&self) -> &LessonContent {
        &self.content
    }

    #[must_use]
    pub fn kind(&self) -> LessonKind {
        match self.content {
            LessonContent::Video(_) => LessonKind::Video,
            LessonContent::Quiz(_) => LessonKind::Quiz,
            LessonContent::Assignment(_) => LessonKind::Assignment,
        }
    }

    /// Returns the quiz definition for quiz lessons.
    #[must_use]
    pub fn quiz(&self) -> Option<&QuizDefinition> {
        match &self.content {
            LessonContent::Quiz(quiz) => Some(quiz),
            _ => None,
        }
    }

    /// Sets the completion flag. Idempotent; returns whether it changed.
    pub(crate) fn mark_complete(&mut self) -> bool {
        let changed = !self.completed;
        self.completed = true;
        changed
    }
}
