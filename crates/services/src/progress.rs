use course_core::model::{Course, CourseError, ModuleId};

/// Aggregated completion view of a whole course, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseProgress {
    pub total: usize,
    pub completed: usize,
    pub percent: u8,
    pub is_complete: bool,
}

/// Aggregated completion view of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleProgress {
    pub module_id: ModuleId,
    pub total: usize,
    pub completed: usize,
    pub percent: u8,
    pub is_complete: bool,
}

/// Read-side progress computation over a course tree.
///
/// Every value is recomputed from current tree state on demand; no cached
/// copies exist that could go stale after a completion.
#[derive(Debug, Clone, Copy)]
pub struct ProgressAggregator<'a> {
    course: &'a Course,
}

impl<'a> ProgressAggregator<'a> {
    #[must_use]
    pub fn new(course: &'a Course) -> Self {
        Self { course }
    }

    /// Completion percent across the whole course, 0 for an empty course.
    #[must_use]
    pub fn course_percent(&self) -> u8 {
        rounded_percent(self.course.completed_count(), self.course.lesson_count())
    }

    /// Completion percent scoped to one module.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::ModuleNotFound` for an unknown module id.
    pub fn module_percent(&self, module_id: ModuleId) -> Result<u8, CourseError> {
        let module = self.course.module(module_id)?;
        Ok(rounded_percent(module.completed_count(), module.lesson_count()))
    }

    /// Full course summary for display.
    #[must_use]
    pub fn course_summary(&self) -> CourseProgress {
        let total = self.course.lesson_count();
        let completed = self.course.completed_count();
        CourseProgress {
            total,
            completed,
            percent: rounded_percent(completed, total),
            is_complete: total > 0 && completed == total,
        }
    }

    /// Summary for one module.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::ModuleNotFound` for an unknown module id.
    pub fn module_summary(&self, module_id: ModuleId) -> Result<ModuleProgress, CourseError> {
        let module = self.course.module(module_id)?;
        let total = module.lesson_count();
        let completed = module.completed_count();
        Ok(ModuleProgress {
            module_id,
            total,
            completed,
            percent: rounded_percent(completed, total),
            is_complete: total > 0 && completed == total,
        })
    }
}

/// Integer percent, rounded half-up; 0 when `whole` is zero.
pub(crate) fn rounded_percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part * 200 + whole) / (whole * 2);
    u8::try_from(rounded).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{
        CourseId, Lesson, LessonContent, LessonId, Module, VideoContent,
    };

    fn video_lesson(id: u64) -> Lesson {
        let video = VideoContent::new("https://cdn.example.com/v.mp4", None).unwrap();
        Lesson::new(LessonId::new(id), format!("Lesson {id}"), LessonContent::Video(video))
            .unwrap()
    }

    fn build_course() -> Course {
        let m1 = Module::new(
            ModuleId::new(1),
            "Basics",
            vec![video_lesson(1), video_lesson(2)],
        )
        .unwrap();
        let m2 = Module::new(ModuleId::new(2), "Advanced", vec![video_lesson(3)]).unwrap();
        Course::new(CourseId::new(1), "Rust 101", vec![m1, m2]).unwrap()
    }

    #[test]
    fn empty_course_is_zero_percent() {
        let course = Course::new(CourseId::new(1), "Empty", Vec::new()).unwrap();
        let progress = ProgressAggregator::new(&course);
        assert_eq!(progress.course_percent(), 0);
        assert!(!progress.course_summary().is_complete);
    }

    #[test]
    fn course_percent_rounds_to_nearest() {
        let mut course = build_course();
        let progress_percent = |course: &Course| ProgressAggregator::new(course).course_percent();

        assert_eq!(progress_percent(&course), 0);
        course.mark_lesson_complete(LessonId::new(1)).unwrap();
        assert_eq!(progress_percent(&course), 33);
        course.mark_lesson_complete(LessonId::new(2)).unwrap();
        assert_eq!(progress_percent(&course), 67);
        course.mark_lesson_complete(LessonId::new(3)).unwrap();
        assert_eq!(progress_percent(&course), 100);
    }

    #[test]
    fn module_percent_is_scoped() {
        let mut course = build_course();
        course.mark_lesson_complete(LessonId::new(1)).unwrap();

        let progress = ProgressAggregator::new(&course);
        assert_eq!(progress.module_percent(ModuleId::new(1)).unwrap(), 50);
        assert_eq!(progress.module_percent(ModuleId::new(2)).unwrap(), 0);
    }

    #[test]
    fn unknown_module_is_an_error() {
        let course = build_course();
        let progress = ProgressAggregator::new(&course);
        let err = progress.module_percent(ModuleId::new(99)).unwrap_err();
        assert_eq!(err, CourseError::ModuleNotFound(ModuleId::new(99)));
    }

    #[test]
    fn summaries_reflect_tree_state_without_caching() {
        let mut course = build_course();
        course.mark_lesson_complete(LessonId::new(3)).unwrap();

        let summary = ProgressAggregator::new(&course).course_summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.percent, 33);

        let module = ProgressAggregator::new(&course)
            .module_summary(ModuleId::new(2))
            .unwrap();
        assert!(module.is_complete);
        assert_eq!(module.percent, 100);
    }

    #[test]
    fn rounded_percent_half_up() {
        assert_eq!(rounded_percent(0, 0), 0);
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 2), 50);
        assert_eq!(rounded_percent(7, 10), 70);
        assert_eq!(rounded_percent(10, 10), 100);
    }
}
