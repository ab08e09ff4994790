//! The `RecordsStore` trait.
//!
//! Implemented by storage backends (e.g. `gradebook-store-sqlite`). The
//! grade sheet, import workflows and the CLI depend on this abstraction, not
//! on a concrete backend.
//!
//! Conventions shared by every backend:
//!
//! - `add_*` assigns a fresh identity and returns the stored entity.
//! - `get_*` returns `Ok(None)` for a missing row; it never errors on absence.
//! - `update_*` and `delete_*` keyed by identity fail with
//!   [`ErrorKind::NotFound`](crate::ErrorKind::NotFound) when no row matched.
//! - Bulk deletes keyed by a parent return the number of rows removed.
//! - Deleting a parent cascades to its dependents atomically: group →
//!   students, links; subject → lessons, links; student and lesson → grades.

use std::future::Future;

use crate::{
  error::StoreError,
  grade::{Grade, GradeValue, NewGrade},
  group::{Group, NewGroup, NewStudent, Student},
  ids::{GradeId, GroupId, LessonId, LinkId, StudentId, SubjectId},
  subject::{Lesson, NewLesson, NewLink, NewSubject, Subject, SubjectGroupLink},
};

/// Abstraction over a records store backend.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait RecordsStore: Send + Sync {
  type Error: StoreError;

  // ── Groups ────────────────────────────────────────────────────────────

  fn add_group(
    &self,
    group: NewGroup,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  fn get_group(
    &self,
    id: GroupId,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  fn list_groups(
    &self,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  fn update_group(
    &self,
    group: Group,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a group together with its students, their grades, and every
  /// link that offers a subject to it.
  fn delete_group(
    &self,
    id: GroupId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  fn add_subject(
    &self,
    subject: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// First subject whose name matches `name` exactly.
  fn find_subject_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  fn update_subject(
    &self,
    subject: Subject,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a subject together with its lessons, their grades, and its links.
  fn delete_subject(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Lessons ───────────────────────────────────────────────────────────

  fn add_lesson(
    &self,
    lesson: NewLesson,
  ) -> impl Future<Output = Result<Lesson, Self::Error>> + Send + '_;

  fn get_lesson(
    &self,
    id: LessonId,
  ) -> impl Future<Output = Result<Option<Lesson>, Self::Error>> + Send + '_;

  fn list_lessons(
    &self,
  ) -> impl Future<Output = Result<Vec<Lesson>, Self::Error>> + Send + '_;

  fn lessons_for_subject(
    &self,
    subject_id: SubjectId,
  ) -> impl Future<Output = Result<Vec<Lesson>, Self::Error>> + Send + '_;

  fn update_lesson(
    &self,
    lesson: Lesson,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_lesson(
    &self,
    id: LessonId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_lessons_for_subject(
    &self,
    subject_id: SubjectId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Students ──────────────────────────────────────────────────────────

  fn add_student(
    &self,
    student: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  fn list_students(
    &self,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  fn students_in_group(
    &self,
    group_id: GroupId,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  fn update_student(
    &self,
    student: Student,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_students_in_group(
    &self,
    group_id: GroupId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Subject ↔ group links ─────────────────────────────────────────────

  /// Offer a subject to a group.
  ///
  /// Returns `Ok(None)` without writing anything when the pair is already
  /// linked: duplicates are refused by policy, not reported as errors.
  fn add_link(
    &self,
    link: NewLink,
  ) -> impl Future<Output = Result<Option<SubjectGroupLink>, Self::Error>> + Send + '_;

  fn link_exists(
    &self,
    subject_id: SubjectId,
    group_id: GroupId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_link(
    &self,
    id: LinkId,
  ) -> impl Future<Output = Result<Option<SubjectGroupLink>, Self::Error>> + Send + '_;

  fn list_links(
    &self,
  ) -> impl Future<Output = Result<Vec<SubjectGroupLink>, Self::Error>> + Send + '_;

  fn subject_ids_for_group(
    &self,
    group_id: GroupId,
  ) -> impl Future<Output = Result<Vec<SubjectId>, Self::Error>> + Send + '_;

  fn group_ids_for_subject(
    &self,
    subject_id: SubjectId,
  ) -> impl Future<Output = Result<Vec<GroupId>, Self::Error>> + Send + '_;

  fn delete_link(
    &self,
    id: LinkId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the link for a (subject, group) pair, if any.
  fn unlink(
    &self,
    subject_id: SubjectId,
    group_id: GroupId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn delete_links_for_group(
    &self,
    group_id: GroupId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn delete_links_for_subject(
    &self,
    subject_id: SubjectId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Grades ────────────────────────────────────────────────────────────

  /// Insert a grade row. No check is made for an existing row with the same
  /// (student, lesson) pair; use [`Self::record_grade`] to upsert.
  fn add_grade(
    &self,
    grade: NewGrade,
  ) -> impl Future<Output = Result<Grade, Self::Error>> + Send + '_;

  fn get_grade(
    &self,
    id: GradeId,
  ) -> impl Future<Output = Result<Option<Grade>, Self::Error>> + Send + '_;

  fn list_grades(
    &self,
  ) -> impl Future<Output = Result<Vec<Grade>, Self::Error>> + Send + '_;

  fn grades_for_student(
    &self,
    student_id: StudentId,
  ) -> impl Future<Output = Result<Vec<Grade>, Self::Error>> + Send + '_;

  fn grades_for_lesson(
    &self,
    lesson_id: LessonId,
  ) -> impl Future<Output = Result<Vec<Grade>, Self::Error>> + Send + '_;

  /// The grade for a (student, lesson) pair. When duplicate rows exist the
  /// one with the highest id is returned.
  fn find_grade(
    &self,
    student_id: StudentId,
    lesson_id: LessonId,
  ) -> impl Future<Output = Result<Option<Grade>, Self::Error>> + Send + '_;

  /// Replace `value` and `date_recorded` of an existing grade row.
  fn update_grade(
    &self,
    grade: Grade,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Set the mark for a (student, lesson) pair: update the existing row if
  /// there is one, insert otherwise. The lookup and the write happen in one
  /// transaction.
  fn record_grade(
    &self,
    student_id: StudentId,
    lesson_id: LessonId,
    value: GradeValue,
  ) -> impl Future<Output = Result<Grade, Self::Error>> + Send + '_;

  fn delete_grade(
    &self,
    id: GradeId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_grades_for_student(
    &self,
    student_id: StudentId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn delete_grades_for_lesson(
    &self,
    lesson_id: LessonId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
