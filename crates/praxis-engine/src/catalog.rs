//! Catalog operations the progress engine needs: lesson create/fetch/list/
//! delete with ownership checks, and course creation.
//!
//! Deleting a lesson cascades its progress and video-history rows; the
//! aggregate percentages of affected learners lazily correct on their next
//! recompute, since the denominator is always read fresh.

use praxis_core::{
  catalog::{Course, Lesson, NewCourse, NewLesson},
  identity::{Identity, Role},
  store::LearningStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
  pub title: String,
}

/// Create a course owned by the calling instructor.
pub async fn create_course<S: LearningStore>(
  store: &S,
  caller: &Identity,
  req: CreateCourseRequest,
) -> Result<Course> {
  if caller.role == Role::Student {
    return Err(Error::Forbidden("students cannot create courses"));
  }
  store
    .add_course(NewCourse {
      title:         req.title,
      instructor_id: caller.learner_id,
    })
    .await
    .map_err(Error::store)
}

async fn owned_course<S: LearningStore>(
  store: &S,
  caller: &Identity,
  course_id: Uuid,
) -> Result<Course> {
  let course = store
    .get_course(course_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CourseNotFound(course_id))?;

  if course.instructor_id != caller.learner_id && !caller.is_admin() {
    return Err(Error::Forbidden("not the course instructor"));
  }

  Ok(course)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLessonRequest {
  pub title:    String,
  #[serde(default)]
  pub is_free:  bool,
  #[serde(default)]
  pub sequence: u32,
}

/// Add a lesson to a course the caller owns (or any course, for admins).
pub async fn create_lesson<S: LearningStore>(
  store: &S,
  caller: &Identity,
  course_id: Uuid,
  req: CreateLessonRequest,
) -> Result<Lesson> {
  owned_course(store, caller, course_id).await?;

  store
    .add_lesson(NewLesson {
      course_id,
      title: req.title,
      is_free: req.is_free,
      sequence: req.sequence,
    })
    .await
    .map_err(Error::store)
}

/// Fetch a lesson. Paid lessons are visible to enrolled learners,
/// instructors, and admins only.
pub async fn get_lesson<S: LearningStore>(
  store: &S,
  caller: &Identity,
  lesson_id: Uuid,
) -> Result<Lesson> {
  let lesson = store
    .get_lesson(lesson_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::LessonNotFound(lesson_id))?;

  if !lesson.is_free && caller.role == Role::Student {
    let enrolled = store
      .find_enrollment(caller.learner_id, lesson.course_id)
      .await
      .map_err(Error::store)?
      .is_some();
    if !enrolled {
      return Err(Error::Forbidden("enroll to access this lesson"));
    }
  }

  Ok(lesson)
}

/// The lesson listing a learner sees: everything when enrolled, free
/// lessons otherwise.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LessonListing {
  pub lessons:     Vec<Lesson>,
  pub is_enrolled: bool,
}

pub async fn list_lessons<S: LearningStore>(
  store: &S,
  caller: &Identity,
  course_id: Uuid,
) -> Result<LessonListing> {
  store
    .get_course(course_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CourseNotFound(course_id))?;

  let is_enrolled = store
    .find_enrollment(caller.learner_id, course_id)
    .await
    .map_err(Error::store)?
    .is_some();

  // Instructors and admins always get the full listing.
  let free_only = !is_enrolled && caller.role == Role::Student;
  let lessons = store
    .list_lessons(course_id, free_only)
    .await
    .map_err(Error::store)?;

  Ok(LessonListing { lessons, is_enrolled })
}

/// Delete a lesson the caller owns, cascading progress and history rows.
pub async fn delete_lesson<S: LearningStore>(
  store: &S,
  caller: &Identity,
  lesson_id: Uuid,
) -> Result<()> {
  let lesson = store
    .get_lesson(lesson_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::LessonNotFound(lesson_id))?;

  owned_course(store, caller, lesson.course_id).await?;

  let deleted = store.delete_lesson(lesson_id).await.map_err(Error::store)?;
  if !deleted {
    return Err(Error::LessonNotFound(lesson_id));
  }
  Ok(())
}
