use thiserror::Error;

use crate::model::{CourseError, LessonError, QuizError};

/// Aggregate error for hosts assembling a whole course tree, where lesson,
/// quiz, and course construction failures mix in one load path.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Course, CourseId, QuizDefinition, QuizId, VideoContent};

    fn load_empty_course() -> Result<Course, Error> {
        let _video = VideoContent::new("https://cdn.example.com/v.mp4", None)?;
        let _quiz = QuizDefinition::new(QuizId::new(1), "Checkpoint", None, Vec::new())?;
        Ok(Course::new(CourseId::new(1), "Rust 101", Vec::new())?)
    }

    #[test]
    fn construction_failures_converge_on_one_error() {
        let err = load_empty_course().unwrap_err();
        assert!(matches!(err, Error::Quiz(QuizError::NoQuestions)));
    }
}
