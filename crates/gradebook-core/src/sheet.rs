//! The grade sheet: one group's students against one subject's lessons.
//!
//! This is the read model behind a grading grid. It is assembled from the
//! store on demand and never persisted.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
  grade::GradeValue,
  group::{Group, Student},
  ids::{GroupId, LessonId, SubjectId},
  metrics::{self, GroupMetrics, StudentSummary},
  store::RecordsStore,
  subject::{Lesson, Subject},
};

/// One student's marks, keyed by lesson. Lessons without a stored grade map
/// to [`GradeValue::NoData`].
#[derive(Debug, Clone, Serialize)]
pub struct GradeRow {
  pub student: Student,
  pub grades:  BTreeMap<LessonId, GradeValue>,
}

impl GradeRow {
  pub fn grade_for(&self, lesson_id: LessonId) -> GradeValue {
    self.grades.get(&lesson_id).copied().unwrap_or_default()
  }

  pub fn values(&self) -> impl Iterator<Item = GradeValue> + '_ {
    self.grades.values().copied()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeSheet {
  pub group:   Group,
  pub subject: Subject,
  /// In id order.
  pub lessons: Vec<Lesson>,
  /// Sorted by full name, case-insensitively.
  pub rows:    Vec<GradeRow>,
}

impl GradeSheet {
  pub fn summaries(&self) -> Vec<StudentSummary> {
    self.rows.iter().map(metrics::summarize).collect()
  }

  pub fn group_metrics(&self) -> GroupMetrics { metrics::group_metrics(&self.rows) }
}

/// Assemble the sheet for `group_id` × `subject_id`.
///
/// Returns `Ok(None)` when either the group or the subject does not exist.
pub async fn load_sheet<S: RecordsStore>(
  store: &S,
  group_id: GroupId,
  subject_id: SubjectId,
) -> Result<Option<GradeSheet>, S::Error> {
  let Some(group) = store.get_group(group_id).await? else {
    return Ok(None);
  };
  let Some(subject) = store.get_subject(subject_id).await? else {
    return Ok(None);
  };

  let mut lessons = store.lessons_for_subject(subject_id).await?;
  lessons.sort_by_key(|l| l.id);

  let mut students = store.students_in_group(group_id).await?;
  students.sort_by_cached_key(|s| s.full_name.to_lowercase());

  let mut rows = Vec::with_capacity(students.len());
  for student in students {
    // Ascending id order, so a later duplicate row overwrites an earlier one.
    let mut stored = store.grades_for_student(student.id).await?;
    stored.sort_by_key(|g| g.id);
    let by_lesson: HashMap<LessonId, GradeValue> =
      stored.into_iter().map(|g| (g.lesson_id, g.value)).collect();

    let grades = lessons
      .iter()
      .map(|l| (l.id, by_lesson.get(&l.id).copied().unwrap_or_default()))
      .collect();
    rows.push(GradeRow { student, grades });
  }

  Ok(Some(GradeSheet { group, subject, lessons, rows }))
}
