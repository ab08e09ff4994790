//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use gradebook_core::{
  ErrorKind, GradeId, GradeValue, GroupId, LessonId, LinkId, NewGrade,
  NewGroup, NewLesson, NewLink, NewStudent, NewSubject, StoreError as _,
  StudentId, SubjectId, store::RecordsStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A group of one student and a subject of one lesson, linked together.
async fn seeded(s: &SqliteStore) -> (GroupId, StudentId, SubjectId, LessonId) {
  let group = s.add_group(NewGroup::new("ИВТ-21")).await.unwrap();
  let student = s
    .add_student(NewStudent::new("Иванов Иван", group.id))
    .await
    .unwrap();
  let subject = s.add_subject(NewSubject::new("Math")).await.unwrap();
  let lesson = s
    .add_lesson(NewLesson::new("Lecture 1", subject.id))
    .await
    .unwrap();
  s.add_link(NewLink::new(subject.id, group.id)).await.unwrap();
  (group.id, student.id, subject.id, lesson.id)
}

// ─── Groups ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_group() {
  let s = store().await;

  let group = s.add_group(NewGroup::new("ИВТ-21")).await.unwrap();
  assert!(group.id.get() > 0);

  let fetched = s.get_group(group.id).await.unwrap().unwrap();
  assert_eq!(fetched, group);
}

#[tokio::test]
async fn get_group_missing_returns_none() {
  let s = store().await;
  assert!(s.get_group(GroupId(42)).await.unwrap().is_none());
}

#[tokio::test]
async fn rename_group() {
  let s = store().await;
  let mut group = s.add_group(NewGroup::new("Old")).await.unwrap();

  group.name = "New".into();
  s.update_group(group.clone()).await.unwrap();

  let all = s.list_groups().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].name, "New");
}

#[tokio::test]
async fn update_missing_group_is_not_found() {
  let s = store().await;
  let err = s
    .update_group(gradebook_core::Group { id: GroupId(7), name: "x".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: "group", id: 7 }));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn delete_missing_rows_are_not_found() {
  let s = store().await;
  assert_eq!(s.delete_group(GroupId(1)).await.unwrap_err().kind(), ErrorKind::NotFound);
  assert_eq!(
    s.delete_subject(SubjectId(1)).await.unwrap_err().kind(),
    ErrorKind::NotFound
  );
  assert_eq!(s.delete_lesson(LessonId(1)).await.unwrap_err().kind(), ErrorKind::NotFound);
  assert_eq!(
    s.delete_student(StudentId(1)).await.unwrap_err().kind(),
    ErrorKind::NotFound
  );
  assert_eq!(s.delete_link(LinkId(1)).await.unwrap_err().kind(), ErrorKind::NotFound);
  assert_eq!(s.delete_grade(GradeId(1)).await.unwrap_err().kind(), ErrorKind::NotFound);
}

// ─── Cascades ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_group_removes_students_grades_and_links() {
  let s = store().await;
  let (group, student, subject, lesson) = seeded(&s).await;
  s.add_grade(NewGrade::new(student, lesson, GradeValue::Grade5)).await.unwrap();

  s.delete_group(group).await.unwrap();

  assert!(s.get_student(student).await.unwrap().is_none());
  assert!(s.list_grades().await.unwrap().is_empty());
  assert!(s.list_links().await.unwrap().is_empty());
  // The subject and its lessons belong to no group and survive.
  assert!(s.get_subject(subject).await.unwrap().is_some());
  assert!(s.get_lesson(lesson).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_subject_removes_lessons_grades_and_links() {
  let s = store().await;
  let (group, student, subject, lesson) = seeded(&s).await;
  s.add_grade(NewGrade::new(student, lesson, GradeValue::Present)).await.unwrap();

  s.delete_subject(subject).await.unwrap();

  assert!(s.get_lesson(lesson).await.unwrap().is_none());
  assert!(s.grades_for_student(student).await.unwrap().is_empty());
  assert!(!s.link_exists(subject, group).await.unwrap());
  assert!(s.get_student(student).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_lesson_or_student_removes_their_grades() {
  let s = store().await;
  let (group, student, subject, lesson) = seeded(&s).await;
  let other = s
    .add_student(NewStudent::new("Петров Пётр", group))
    .await
    .unwrap();
  let second = s.add_lesson(NewLesson::new("Lecture 2", subject)).await.unwrap();
  for st in [student, other.id] {
    for l in [lesson, second.id] {
      s.add_grade(NewGrade::new(st, l, GradeValue::Grade4)).await.unwrap();
    }
  }

  s.delete_lesson(second.id).await.unwrap();
  assert_eq!(s.list_grades().await.unwrap().len(), 2);
  assert!(s.grades_for_lesson(second.id).await.unwrap().is_empty());

  s.delete_student(other.id).await.unwrap();
  let left = s.list_grades().await.unwrap();
  assert_eq!(left.len(), 1);
  assert_eq!(left[0].student_id, student);
  assert_eq!(left[0].lesson_id, lesson);
}

#[tokio::test]
async fn bulk_deletes_report_row_counts() {
  let s = store().await;
  let (group, student, subject, lesson) = seeded(&s).await;
  s.add_student(NewStudent::new("Second", group)).await.unwrap();
  s.add_grade(NewGrade::new(student, lesson, GradeValue::Grade3)).await.unwrap();

  assert_eq!(s.delete_grades_for_lesson(lesson).await.unwrap(), 1);
  assert_eq!(s.delete_grades_for_student(student).await.unwrap(), 0);
  assert_eq!(s.delete_links_for_subject(subject).await.unwrap(), 1);
  assert_eq!(s.delete_links_for_group(group).await.unwrap(), 0);
  assert_eq!(s.delete_students_in_group(group).await.unwrap(), 2);
  assert_eq!(s.delete_lessons_for_subject(subject).await.unwrap(), 1);
  assert!(s.get_group(group).await.unwrap().is_some());
}

// ─── Students and lessons ────────────────────────────────────────────────────

#[tokio::test]
async fn students_are_scoped_to_their_group() {
  let s = store().await;
  let a = s.add_group(NewGroup::new("A")).await.unwrap();
  let b = s.add_group(NewGroup::new("B")).await.unwrap();
  s.add_student(NewStudent::new("One", a.id)).await.unwrap();
  let mut moved = s.add_student(NewStudent::new("Two", a.id)).await.unwrap();
  s.add_student(NewStudent::new("Three", b.id)).await.unwrap();

  assert_eq!(s.students_in_group(a.id).await.unwrap().len(), 2);

  moved.group_id = b.id;
  s.update_student(moved).await.unwrap();
  let in_b: Vec<_> = s
    .students_in_group(b.id)
    .await
    .unwrap()
    .into_iter()
    .map(|st| st.full_name)
    .collect();
  assert_eq!(in_b, ["Two", "Three"]);
  assert_eq!(s.list_students().await.unwrap().len(), 3);
}

#[tokio::test]
async fn student_with_unknown_group_violates_constraint() {
  let s = store().await;
  let err = s
    .add_student(NewStudent::new("Nobody", GroupId(99)))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
}

#[tokio::test]
async fn lessons_for_subject_and_update() {
  let s = store().await;
  let math = s.add_subject(NewSubject::new("Math")).await.unwrap();
  let art = s.add_subject(NewSubject::new("Art")).await.unwrap();
  let mut l1 = s.add_lesson(NewLesson::new("L1", math.id)).await.unwrap();
  s.add_lesson(NewLesson::new("L2", math.id)).await.unwrap();

  l1.name = "Intro".into();
  l1.subject_id = art.id;
  s.update_lesson(l1.clone()).await.unwrap();

  assert_eq!(s.lessons_for_subject(math.id).await.unwrap().len(), 1);
  let art_lessons = s.lessons_for_subject(art.id).await.unwrap();
  assert_eq!(art_lessons[0].name, "Intro");
  assert_eq!(s.list_lessons().await.unwrap().len(), 2);
}

#[tokio::test]
async fn find_subject_by_exact_name() {
  let s = store().await;
  let math = s.add_subject(NewSubject::new("Math")).await.unwrap();
  s.add_subject(NewSubject::new("Math")).await.unwrap();

  let found = s.find_subject_by_name("Math").await.unwrap().unwrap();
  assert_eq!(found.id, math.id);
  assert!(s.find_subject_by_name("math").await.unwrap().is_none());
}

#[tokio::test]
async fn subject_round_trips_name() {
  let s = store().await;
  s.add_subject(NewSubject::new("Art")).await.unwrap();
  let added = s.add_subject(NewSubject::new("Математика")).await.unwrap();

  let got = s.get_subject(added.id).await.unwrap().unwrap();
  assert_eq!(got.id, added.id);
  assert_eq!(got.name, "Математика");
}

#[tokio::test]
async fn lesson_round_trips_name_and_subject() {
  let s = store().await;
  let art = s.add_subject(NewSubject::new("Art")).await.unwrap();
  let math = s.add_subject(NewSubject::new("Math")).await.unwrap();
  s.add_lesson(NewLesson::new("Sketching", art.id)).await.unwrap();
  let added = s.add_lesson(NewLesson::new("Integrals", math.id)).await.unwrap();

  let got = s.get_lesson(added.id).await.unwrap().unwrap();
  assert_eq!(got.id, added.id);
  assert_eq!(got.name, "Integrals");
  assert_eq!(got.subject_id, math.id);
}

#[tokio::test]
async fn student_round_trips_name_and_group() {
  let s = store().await;
  let a = s.add_group(NewGroup::new("A")).await.unwrap();
  let b = s.add_group(NewGroup::new("B")).await.unwrap();
  s.add_student(NewStudent::new("Петров Пётр", a.id)).await.unwrap();
  let added = s.add_student(NewStudent::new("Иванов Иван", b.id)).await.unwrap();

  let got = s.get_student(added.id).await.unwrap().unwrap();
  assert_eq!(got.id, added.id);
  assert_eq!(got.full_name, "Иванов Иван");
  assert_eq!(got.group_id, b.id);

  let first = s.get_student(StudentId(added.id.get() - 1)).await.unwrap().unwrap();
  assert_eq!(first.full_name, "Петров Пётр");
  assert_eq!(first.group_id, a.id);
}

// ─── Links ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_link_is_refused() {
  let s = store().await;
  let group = s.add_group(NewGroup::new("G")).await.unwrap();
  let subject = s.add_subject(NewSubject::new("S")).await.unwrap();
  let link = NewLink::new(subject.id, group.id);

  let first = s.add_link(link).await.unwrap();
  assert!(first.is_some());
  assert!(s.link_exists(subject.id, group.id).await.unwrap());

  assert!(s.add_link(link).await.unwrap().is_none());
  assert_eq!(s.list_links().await.unwrap().len(), 1);
}

#[tokio::test]
async fn link_lookups_in_both_directions() {
  let s = store().await;
  let g1 = s.add_group(NewGroup::new("G1")).await.unwrap();
  let g2 = s.add_group(NewGroup::new("G2")).await.unwrap();
  let s1 = s.add_subject(NewSubject::new("S1")).await.unwrap();
  let s2 = s.add_subject(NewSubject::new("S2")).await.unwrap();
  s.add_link(NewLink::new(s1.id, g1.id)).await.unwrap();
  s.add_link(NewLink::new(s2.id, g1.id)).await.unwrap();
  let l3 = s.add_link(NewLink::new(s1.id, g2.id)).await.unwrap().unwrap();

  assert_eq!(s.subject_ids_for_group(g1.id).await.unwrap(), [s1.id, s2.id]);
  assert_eq!(s.group_ids_for_subject(s1.id).await.unwrap(), [g1.id, g2.id]);
  assert_eq!(s.get_link(l3.id).await.unwrap().unwrap().key(), (s1.id, g2.id));

  assert_eq!(s.unlink(s2.id, g1.id).await.unwrap(), 1);
  assert_eq!(s.unlink(s2.id, g1.id).await.unwrap(), 0);
  assert_eq!(s.subject_ids_for_group(g1.id).await.unwrap(), [s1.id]);

  s.delete_link(l3.id).await.unwrap();
  assert!(s.group_ids_for_subject(s1.id).await.unwrap() == [g1.id]);
}

// ─── Grades ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn grade_round_trips_value_and_date() {
  let s = store().await;
  let (_, student, _, lesson) = seeded(&s).await;

  let mut input = NewGrade::new(student, lesson, GradeValue::AbsenceExcused);
  input.date_recorded = date(2024, 9, 1);
  let grade = s.add_grade(input).await.unwrap();

  let fetched = s.get_grade(grade.id).await.unwrap().unwrap();
  assert_eq!(fetched, grade);
  assert_eq!(fetched.value, GradeValue::AbsenceExcused);
  assert_eq!(fetched.date_recorded, date(2024, 9, 1));
}

#[tokio::test]
async fn update_grade_replaces_value_and_date() {
  let s = store().await;
  let (_, student, _, lesson) = seeded(&s).await;
  let mut grade = s
    .add_grade(NewGrade::new(student, lesson, GradeValue::Grade2))
    .await
    .unwrap();

  grade.value = GradeValue::Grade5;
  grade.date_recorded = date(2025, 1, 15);
  s.update_grade(grade.clone()).await.unwrap();

  assert_eq!(s.get_grade(grade.id).await.unwrap().unwrap(), grade);
}

#[tokio::test]
async fn duplicate_grades_are_permitted_and_latest_wins() {
  let s = store().await;
  let (_, student, _, lesson) = seeded(&s).await;
  s.add_grade(NewGrade::new(student, lesson, GradeValue::Grade3)).await.unwrap();
  let later = s
    .add_grade(NewGrade::new(student, lesson, GradeValue::Grade4))
    .await
    .unwrap();

  assert_eq!(s.grades_for_lesson(lesson).await.unwrap().len(), 2);
  let found = s.find_grade(student, lesson).await.unwrap().unwrap();
  assert_eq!(found.id, later.id);
}

#[tokio::test]
async fn record_grade_updates_instead_of_inserting() {
  let s = store().await;
  let (_, student, _, lesson) = seeded(&s).await;

  let first = s.record_grade(student, lesson, GradeValue::Grade3).await.unwrap();
  let second = s
    .record_grade(student, lesson, GradeValue::AbsenceUnexcused)
    .await
    .unwrap();

  assert_eq!(first.id, second.id);
  assert_eq!(second.value, GradeValue::AbsenceUnexcused);
  assert_eq!(s.grades_for_student(student).await.unwrap().len(), 1);
}

#[tokio::test]
async fn find_grade_missing_returns_none() {
  let s = store().await;
  let (_, student, _, lesson) = seeded(&s).await;
  assert!(s.find_grade(student, lesson).await.unwrap().is_none());
}

#[tokio::test]
async fn grade_for_unknown_lesson_violates_constraint() {
  let s = store().await;
  let (_, student, _, _) = seeded(&s).await;
  let err = s
    .add_grade(NewGrade::new(student, LessonId(999), GradeValue::Grade5))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)));
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_lifecycle_leaves_store_empty_of_dependents() {
  let s = store().await;
  let group = s.add_group(NewGroup::new("G")).await.unwrap();
  let a = s.add_student(NewStudent::new("A", group.id)).await.unwrap();
  let b = s.add_student(NewStudent::new("B", group.id)).await.unwrap();
  let subject = s.add_subject(NewSubject::new("S")).await.unwrap();
  let l1 = s.add_lesson(NewLesson::new("L1", subject.id)).await.unwrap();
  let l2 = s.add_lesson(NewLesson::new("L2", subject.id)).await.unwrap();
  s.add_link(NewLink::new(subject.id, group.id)).await.unwrap();

  for (st, l, v) in [
    (a.id, l1.id, GradeValue::Grade5),
    (a.id, l2.id, GradeValue::AbsenceUnexcused),
    (b.id, l1.id, GradeValue::Present),
    (b.id, l2.id, GradeValue::Grade2),
  ] {
    s.add_grade(NewGrade::new(st, l, v)).await.unwrap();
  }
  assert_eq!(s.list_grades().await.unwrap().len(), 4);

  s.delete_subject(subject.id).await.unwrap();
  assert!(s.list_lessons().await.unwrap().is_empty());
  assert!(s.list_grades().await.unwrap().is_empty());
  assert!(s.list_links().await.unwrap().is_empty());

  s.delete_group(group.id).await.unwrap();
  assert!(s.list_students().await.unwrap().is_empty());
  assert!(s.list_groups().await.unwrap().is_empty());
}

// ─── Files ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopened_file_keeps_data() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("education.db");

  let group_id = {
    let s = SqliteStore::open(&path).await.unwrap();
    let group = s.add_group(NewGroup::new("Persisted")).await.unwrap();
    group.id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let group = s.get_group(group_id).await.unwrap().unwrap();
  assert_eq!(group.name, "Persisted");
}

#[tokio::test]
async fn out_of_range_grade_code_reads_as_invalid_data() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("education.db");

  let s = SqliteStore::open(&path).await.unwrap();
  let (_, student, _, lesson) = seeded(&s).await;

  // The schema admits codes up to 10 even though none above 7 are defined.
  let raw = rusqlite::Connection::open(&path).unwrap();
  raw
    .execute(
      "INSERT INTO grades (student_id, lesson_id, grade) VALUES (?1, ?2, 9)",
      rusqlite::params![student.get(), lesson.get()],
    )
    .unwrap();
  let id = GradeId(raw.last_insert_rowid());
  drop(raw);

  let err = s.grades_for_student(student).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidData);
  let err = s.get_grade(id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidData);
  let err = s.find_grade(student, lesson).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[tokio::test]
async fn undecodable_date_reads_as_invalid_data() {
  let dir = tempfile::tempdir().expect("tempdir");
  let path = dir.path().join("education.db");

  let s = SqliteStore::open(&path).await.unwrap();
  let (_, student, _, lesson) = seeded(&s).await;

  let raw = rusqlite::Connection::open(&path).unwrap();
  raw
    .execute(
      "INSERT INTO grades (student_id, lesson_id, grade, date_recorded)
       VALUES (?1, ?2, 3, 'yesterday')",
      rusqlite::params![student.get(), lesson.get()],
    )
    .unwrap();
  drop(raw);

  let err = s.list_grades().await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidData);
  assert!(matches!(err, Error::DateParse(_)));
}
