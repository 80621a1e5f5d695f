mod course;
mod ids;
mod lesson;
mod quiz;

pub use ids::{CourseId, LessonId, ModuleId, OptionId, ParseIdError, QuestionId, QuizId};

pub use course::{Course, CourseError, Module};
pub use lesson::{
    AssignmentBrief, Lesson, LessonContent, LessonError, LessonKind, VideoContent,
};
pub use quiz::{
    normalize_text, AnswerOption, AnswerValue, QuestionBody, QuizDefinition, QuizError,
    QuizQuestion, PASS_THRESHOLD_PERCENT,
};
