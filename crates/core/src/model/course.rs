use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{CourseId, LessonId, ModuleId};
use crate::model::lesson::Lesson;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyCourseTitle,

    #[error("module title cannot be empty")]
    EmptyModuleTitle,

    #[error("duplicate module id {0} in course")]
    DuplicateModuleId(ModuleId),

    #[error("duplicate lesson id {0} in course")]
    DuplicateLessonId(LessonId),

    #[error("lesson {0} not found")]
    LessonNotFound(LessonId),

    #[error("module {0} not found")]
    ModuleNotFound(ModuleId),
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// Ordered grouping of lessons within a course.
///
/// Lesson order is significant and stable; traversal and progress both rely
/// on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    title: String,
    lessons: Vec<Lesson>,
}

impl Module {
    /// Creates a module.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyModuleTitle` for a blank title.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        lessons: Vec<Lesson>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyModuleTitle);
        }
        Ok(Self { id, title, lessons })
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.lessons.iter().filter(|l| l.is_completed()).count()
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// In-memory course tree: ordered modules, each with ordered lessons.
///
/// Built once per course load; the only field mutated afterwards is each
/// lesson's completion flag, through `mark_lesson_complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    modules: Vec<Module>,
}

impl Course {
    /// Creates a course, validating id uniqueness across the whole tree.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::DuplicateModuleId` or
    /// `CourseError::DuplicateLessonId` when ids repeat, and
    /// `CourseError::EmptyCourseTitle` for a blank title.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        modules: Vec<Module>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyCourseTitle);
        }

        let mut module_ids = HashSet::with_capacity(modules.len());
        let mut lesson_ids = HashSet::new();
        for module in &modules {
            if !module_ids.insert(module.id()) {
                return Err(CourseError::DuplicateModuleId(module.id()));
            }
            for lesson in module.lessons() {
                if !lesson_ids.insert(lesson.id()) {
                    return Err(CourseError::DuplicateLessonId(lesson.id()));
                }
            }
        }

        Ok(Self { id, title, modules })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Flattens the tree into its ordered lesson sequence.
    ///
    /// Pure and deterministic; recomputed on every call, the tree is small.
    #[must_use]
    pub fn linearize(&self) -> Vec<&Lesson> {
        self.modules
            .iter()
            .flat_map(|module| module.lessons().iter())
            .collect()
    }

    /// Looks up a lesson by id across all modules.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::LessonNotFound` for an unknown id.
    pub fn find_lesson(&self, id: LessonId) -> Result<&Lesson, CourseError> {
        self.linearize()
            .into_iter()
            .find(|lesson| lesson.id() == id)
            .ok_or(CourseError::LessonNotFound(id))
    }

    /// Looks up a lesson and the module that owns it.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::LessonNotFound` for an unknown id.
    pub fn locate_lesson(&self, id: LessonId) -> Result<(&Module, &Lesson), CourseError> {
        for module in &self.modules {
            if let Some(lesson) = module.lessons().iter().find(|l| l.id() == id) {
                return Ok((module, lesson));
            }
        }
        Err(CourseError::LessonNotFound(id))
    }

    /// Looks up a module by id.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::ModuleNotFound` for an unknown id.
    pub fn module(&self, id: ModuleId) -> Result<&Module, CourseError> {
        self.modules
            .iter()
            .find(|module| module.id() == id)
            .ok_or(CourseError::ModuleNotFound(id))
    }

    /// Marks a lesson complete. Idempotent; completion never reverts.
    ///
    /// Returns `Ok(true)` only on the first transition to complete.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::LessonNotFound` for an unknown id.
    pub fn mark_lesson_complete(&mut self, id: LessonId) -> Result<bool, CourseError> {
        for module in &mut self.modules {
            if let Some(lesson) = module.lessons.iter_mut().find(|l| l.id() == id) {
                return Ok(lesson.mark_complete());
            }
        }
        Err(CourseError::LessonNotFound(id))
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(Module::lesson_count).sum()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.modules.iter().map(Module::completed_count).sum()
    }
}
