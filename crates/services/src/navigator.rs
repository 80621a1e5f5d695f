use course_core::model::{Course, CourseError, Lesson, LessonId};

/// Sequential navigation over a course's linearized lesson sequence.
///
/// Flattens the tree per query; courses are small and the tree is the single
/// source of truth, so nothing is cached here.
#[derive(Debug, Clone, Copy)]
pub struct LessonNavigator<'a> {
    course: &'a Course,
}

impl<'a> LessonNavigator<'a> {
    #[must_use]
    pub fn new(course: &'a Course) -> Self {
        Self { course }
    }

    /// Lesson immediately after `current` in sequence, `None` at the end.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::LessonNotFound` if `current` is unknown.
    pub fn next(&self, current: LessonId) -> Result<Option<&'a Lesson>, CourseError> {
        let sequence = self.course.linearize();
        let position = Self::position(&sequence, current)?;
        Ok(sequence.get(position + 1).copied())
    }

    /// Lesson immediately before `current` in sequence, `None` at the start.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::LessonNotFound` if `current` is unknown.
    pub fn previous(&self, current: LessonId) -> Result<Option<&'a Lesson>, CourseError> {
        let sequence = self.course.linearize();
        let position = Self::position(&sequence, current)?;
        if position == 0 {
            return Ok(None);
        }
        Ok(sequence.get(position - 1).copied())
    }

    /// First lesson in sequence that is not yet complete.
    ///
    /// When every lesson is complete, falls back to the first lesson so the
    /// learner is never left without an active one; `None` only for an empty
    /// course.
    #[must_use]
    pub fn first_incomplete(&self) -> Option<&'a Lesson> {
        let sequence = self.course.linearize();
        sequence
            .iter()
            .find(|lesson| !lesson.is_completed())
            .or_else(|| sequence.first())
            .copied()
    }

    fn position(sequence: &[&Lesson], id: LessonId) -> Result<usize, CourseError> {
        sequence
            .iter()
            .position(|lesson| lesson.id() == id)
            .ok_or(CourseError::LessonNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{
        CourseId, Lesson, LessonContent, Module, ModuleId, VideoContent,
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
    fn next_crosses_module_boundary() {
        let course = build_course();
        let navigator = LessonNavigator::new(&course);
        let next = navigator.next(LessonId::new(2)).unwrap().unwrap();
        assert_eq!(next.id(), LessonId::new(3));
    }

    #[test]
    fn boundaries_return_none() {
        let course = build_course();
        let navigator = LessonNavigator::new(&course);
        assert!(navigator.previous(LessonId::new(1)).unwrap().is_none());
        assert!(navigator.next(LessonId::new(3)).unwrap().is_none());
    }

    #[test]
    fn unknown_lesson_is_an_error() {
        let course = build_course();
        let navigator = LessonNavigator::new(&course);
        let err = navigator.next(LessonId::new(99)).unwrap_err();
        assert_eq!(err, CourseError::LessonNotFound(LessonId::new(99)));
    }

    #[test]
    fn next_and_previous_are_symmetric_off_boundary() {
        let course = build_course();
        let navigator = LessonNavigator::new(&course);

        // lesson 2 is interior: previous(next(2)) == 2 and next(previous(2)) == 2
        let forward = navigator.next(LessonId::new(2)).unwrap().unwrap();
        let back = navigator.previous(forward.id()).unwrap().unwrap();
        assert_eq!(back.id(), LessonId::new(2));

        let backward = navigator.previous(LessonId::new(2)).unwrap().unwrap();
        let ahead = navigator.next(backward.id()).unwrap().unwrap();
        assert_eq!(ahead.id(), LessonId::new(2));
    }

    #[test]
    fn first_incomplete_scans_in_order() {
        let mut course = build_course();
        course.mark_lesson_complete(LessonId::new(1)).unwrap();

        let navigator = LessonNavigator::new(&course);
        assert_eq!(navigator.first_incomplete().unwrap().id(), LessonId::new(2));
    }

    #[test]
    fn all_complete_falls_back_to_first_lesson() {
        let mut course = build_course();
        for id in [1, 2, 3] {
            course.mark_lesson_complete(LessonId::new(id)).unwrap();
        }

        let navigator = LessonNavigator::new(&course);
        assert_eq!(navigator.first_incomplete().unwrap().id(), LessonId::new(1));
    }

    #[test]
    fn empty_course_has_no_active_lesson() {
        let course = Course::new(CourseId::new(1), "Empty", Vec::new()).unwrap();
        let navigator = LessonNavigator::new(&course);
        assert!(navigator.first_incomplete().is_none());
    }
}
