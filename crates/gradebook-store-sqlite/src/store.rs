//! [`SqliteStore`], the SQLite implementation of [`RecordsStore`].

use std::path::Path;

use chrono::Local;
use rusqlite::OptionalExtension as _;
use tracing::{debug, error, warn};

use gradebook_core::{
  Grade, GradeId, GradeValue, Group, GroupId, Lesson, LessonId, LinkId,
  NewGrade, NewGroup, NewLesson, NewLink, NewStudent, NewSubject, Student,
  StudentId, Subject, SubjectGroupLink, SubjectId, store::RecordsStore,
};

use crate::{
  encode::{
    GRADE_COLUMNS, GROUP_COLUMNS, LESSON_COLUMNS, LINK_COLUMNS, RawGrade,
    STUDENT_COLUMNS, SUBJECT_COLUMNS, decode_grades, encode_date,
    group_from_row, lesson_from_row, link_from_row, student_from_row,
    subject_from_row,
  },
  schema::SCHEMA,
  Error, Result,
};

type RowMapper<T> = fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A records store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, as used by the tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread. Failures are classified and logged
  /// here, so every operation reports errors the same way.
  async fn call<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<T> + Send + 'static,
  {
    self.conn.call(f).await.map_err(|e| {
      let err = Error::from(e);
      error!(error = %err, "sqlite operation failed");
      err
    })
  }

  // ── Query helpers ─────────────────────────────────────────────────────────
  //
  // Every key in this schema is an integer, so positional arguments are
  // passed as a plain `Vec<i64>`.

  async fn fetch_all<T>(
    &self,
    sql: String,
    args: Vec<i64>,
    map: RowMapper<T>,
  ) -> Result<Vec<T>>
  where
    T: Send + 'static,
  {
    let rows = self
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), map)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn fetch_optional<T>(
    &self,
    sql: String,
    args: Vec<i64>,
    map: RowMapper<T>,
  ) -> Result<Option<T>>
  where
    T: Send + 'static,
  {
    let row = self
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params_from_iter(args), map)
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  /// Run a write and return the number of affected rows.
  async fn execute(&self, sql: &'static str, args: Vec<i64>) -> Result<usize> {
    let n = self
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(args))?))
      .await?;
    Ok(n)
  }

  /// Insert a row with a single `name` column and return its new id.
  async fn insert_named(&self, sql: &'static str, name: String) -> Result<i64> {
    let id = self
      .call(move |conn| {
        conn.execute(sql, rusqlite::params![name])?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  /// Insert a `(name, parent)` row and return its new id.
  async fn insert_child(
    &self,
    sql: &'static str,
    name: String,
    parent: i64,
  ) -> Result<i64> {
    let id = self
      .call(move |conn| {
        conn.execute(sql, rusqlite::params![name, parent])?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  /// Update a `(name, parent)` row keyed by id.
  async fn update_child(
    &self,
    entity: &'static str,
    sql: &'static str,
    id: i64,
    name: String,
    parent: i64,
  ) -> Result<()> {
    let n = self
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![name, parent, id])?))
      .await?;
    expect_one(entity, id, n)
  }

  async fn rename(
    &self,
    entity: &'static str,
    sql: &'static str,
    id: i64,
    name: String,
  ) -> Result<()> {
    let n = self
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![name, id])?))
      .await?;
    expect_one(entity, id, n)
  }

  async fn delete_by_id(
    &self,
    entity: &'static str,
    sql: &'static str,
    id: i64,
  ) -> Result<()> {
    let n = self.execute(sql, vec![id]).await?;
    expect_one(entity, id, n)?;
    debug!(entity, id, "deleted");
    Ok(())
  }

  async fn fetch_grades(&self, sql: String, args: Vec<i64>) -> Result<Vec<Grade>> {
    let raws = self.fetch_all(sql, args, RawGrade::from_row).await?;
    decode_grades(raws).inspect_err(log_decode_failure)
  }
}

fn log_decode_failure(err: &Error) {
  error!(error = %err, "failed to decode grade row");
}

fn expect_one(entity: &'static str, id: i64, affected: usize) -> Result<()> {
  if affected == 0 {
    warn!(entity, id, "no row matched");
    return Err(Error::NotFound { entity, id });
  }
  Ok(())
}

// ─── RecordsStore impl ───────────────────────────────────────────────────────

impl RecordsStore for SqliteStore {
  type Error = Error;

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn add_group(&self, group: NewGroup) -> Result<Group> {
    let id = self
      .insert_named("INSERT INTO groups (name) VALUES (?1)", group.name.clone())
      .await?;
    Ok(Group { id: GroupId(id), name: group.name })
  }

  async fn get_group(&self, id: GroupId) -> Result<Option<Group>> {
    self
      .fetch_optional(
        format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = ?1"),
        vec![id.get()],
        group_from_row,
      )
      .await
  }

  async fn list_groups(&self) -> Result<Vec<Group>> {
    self
      .fetch_all(
        format!("SELECT {GROUP_COLUMNS} FROM groups ORDER BY id"),
        vec![],
        group_from_row,
      )
      .await
  }

  async fn update_group(&self, group: Group) -> Result<()> {
    self
      .rename(
        "group",
        "UPDATE groups SET name = ?1 WHERE id = ?2",
        group.id.get(),
        group.name,
      )
      .await
  }

  async fn delete_group(&self, id: GroupId) -> Result<()> {
    self
      .delete_by_id("group", "DELETE FROM groups WHERE id = ?1", id.get())
      .await
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn add_subject(&self, subject: NewSubject) -> Result<Subject> {
    let id = self
      .insert_named("INSERT INTO subjects (name) VALUES (?1)", subject.name.clone())
      .await?;
    Ok(Subject { id: SubjectId(id), name: subject.name })
  }

  async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>> {
    self
      .fetch_optional(
        format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1"),
        vec![id.get()],
        subject_from_row,
      )
      .await
  }

  async fn find_subject_by_name<'a>(&'a self, name: &'a str) -> Result<Option<Subject>> {
    let name = name.to_owned();
    let sql =
      format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE name = ?1 ORDER BY id LIMIT 1");
    let subject = self
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![name], subject_from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(subject)
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    self
      .fetch_all(
        format!("SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY id"),
        vec![],
        subject_from_row,
      )
      .await
  }

  async fn update_subject(&self, subject: Subject) -> Result<()> {
    self
      .rename(
        "subject",
        "UPDATE subjects SET name = ?1 WHERE id = ?2",
        subject.id.get(),
        subject.name,
      )
      .await
  }

  async fn delete_subject(&self, id: SubjectId) -> Result<()> {
    self
      .delete_by_id("subject", "DELETE FROM subjects WHERE id = ?1", id.get())
      .await
  }

  // ── Lessons ───────────────────────────────────────────────────────────────

  async fn add_lesson(&self, lesson: NewLesson) -> Result<Lesson> {
    let id = self
      .insert_child(
        "INSERT INTO lessons (name, subject_id) VALUES (?1, ?2)",
        lesson.name.clone(),
        lesson.subject_id.get(),
      )
      .await?;
    Ok(Lesson { id: LessonId(id), name: lesson.name, subject_id: lesson.subject_id })
  }

  async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>> {
    self
      .fetch_optional(
        format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?1"),
        vec![id.get()],
        lesson_from_row,
      )
      .await
  }

  async fn list_lessons(&self) -> Result<Vec<Lesson>> {
    self
      .fetch_all(
        format!("SELECT {LESSON_COLUMNS} FROM lessons ORDER BY id"),
        vec![],
        lesson_from_row,
      )
      .await
  }

  async fn lessons_for_subject(&self, subject_id: SubjectId) -> Result<Vec<Lesson>> {
    self
      .fetch_all(
        format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE subject_id = ?1 ORDER BY id"),
        vec![subject_id.get()],
        lesson_from_row,
      )
      .await
  }

  async fn update_lesson(&self, lesson: Lesson) -> Result<()> {
    self
      .update_child(
        "lesson",
        "UPDATE lessons SET name = ?1, subject_id = ?2 WHERE id = ?3",
        lesson.id.get(),
        lesson.name,
        lesson.subject_id.get(),
      )
      .await
  }

  async fn delete_lesson(&self, id: LessonId) -> Result<()> {
    self
      .delete_by_id("lesson", "DELETE FROM lessons WHERE id = ?1", id.get())
      .await
  }

  async fn delete_lessons_for_subject(&self, subject_id: SubjectId) -> Result<usize> {
    self
      .execute("DELETE FROM lessons WHERE subject_id = ?1", vec![subject_id.get()])
      .await
  }

  // ── Students ──────────────────────────────────────────────────────────────

  async fn add_student(&self, student: NewStudent) -> Result<Student> {
    let id = self
      .insert_child(
        "INSERT INTO students (full_name, group_id) VALUES (?1, ?2)",
        student.full_name.clone(),
        student.group_id.get(),
      )
      .await?;
    Ok(Student {
      id:        StudentId(id),
      full_name: student.full_name,
      group_id:  student.group_id,
    })
  }

  async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
    self
      .fetch_optional(
        format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
        vec![id.get()],
        student_from_row,
      )
      .await
  }

  async fn list_students(&self) -> Result<Vec<Student>> {
    self
      .fetch_all(
        format!("SELECT {STUDENT_COLUMNS} FROM students ORDER BY id"),
        vec![],
        student_from_row,
      )
      .await
  }

  async fn students_in_group(&self, group_id: GroupId) -> Result<Vec<Student>> {
    self
      .fetch_all(
        format!("SELECT {STUDENT_COLUMNS} FROM students WHERE group_id = ?1 ORDER BY id"),
        vec![group_id.get()],
        student_from_row,
      )
      .await
  }

  async fn update_student(&self, student: Student) -> Result<()> {
    self
      .update_child(
        "student",
        "UPDATE students SET full_name = ?1, group_id = ?2 WHERE id = ?3",
        student.id.get(),
        student.full_name,
        student.group_id.get(),
      )
      .await
  }

  async fn delete_student(&self, id: StudentId) -> Result<()> {
    self
      .delete_by_id("student", "DELETE FROM students WHERE id = ?1", id.get())
      .await
  }

  async fn delete_students_in_group(&self, group_id: GroupId) -> Result<usize> {
    self
      .execute("DELETE FROM students WHERE group_id = ?1", vec![group_id.get()])
      .await
  }

  // ── Subject ↔ group links ─────────────────────────────────────────────────

  async fn add_link(&self, link: NewLink) -> Result<Option<SubjectGroupLink>> {
    let (subject_id, group_id) = (link.subject_id.get(), link.group_id.get());

    let id = self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM subject_to_group WHERE subject_id = ?1 AND group_id = ?2",
            rusqlite::params![subject_id, group_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if exists {
          return Ok(None);
        }
        tx.execute(
          "INSERT INTO subject_to_group (subject_id, group_id) VALUES (?1, ?2)",
          rusqlite::params![subject_id, group_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    match id {
      Some(id) => Ok(Some(SubjectGroupLink {
        id:         LinkId(id),
        subject_id: link.subject_id,
        group_id:   link.group_id,
      })),
      None => {
        warn!(subject = subject_id, group = group_id, "link already exists");
        Ok(None)
      }
    }
  }

  async fn link_exists(&self, subject_id: SubjectId, group_id: GroupId) -> Result<bool> {
    let found = self
      .fetch_optional(
        "SELECT 1 FROM subject_to_group WHERE subject_id = ?1 AND group_id = ?2"
          .to_owned(),
        vec![subject_id.get(), group_id.get()],
        |_| Ok(()),
      )
      .await?;
    Ok(found.is_some())
  }

  async fn get_link(&self, id: LinkId) -> Result<Option<SubjectGroupLink>> {
    self
      .fetch_optional(
        format!("SELECT {LINK_COLUMNS} FROM subject_to_group WHERE id = ?1"),
        vec![id.get()],
        link_from_row,
      )
      .await
  }

  async fn list_links(&self) -> Result<Vec<SubjectGroupLink>> {
    self
      .fetch_all(
        format!("SELECT {LINK_COLUMNS} FROM subject_to_group ORDER BY id"),
        vec![],
        link_from_row,
      )
      .await
  }

  async fn subject_ids_for_group(&self, group_id: GroupId) -> Result<Vec<SubjectId>> {
    self
      .fetch_all(
        "SELECT subject_id FROM subject_to_group WHERE group_id = ?1 ORDER BY id"
          .to_owned(),
        vec![group_id.get()],
        |row| Ok(SubjectId(row.get(0)?)),
      )
      .await
  }

  async fn group_ids_for_subject(&self, subject_id: SubjectId) -> Result<Vec<GroupId>> {
    self
      .fetch_all(
        "SELECT group_id FROM subject_to_group WHERE subject_id = ?1 ORDER BY id"
          .to_owned(),
        vec![subject_id.get()],
        |row| Ok(GroupId(row.get(0)?)),
      )
      .await
  }

  async fn delete_link(&self, id: LinkId) -> Result<()> {
    self
      .delete_by_id("link", "DELETE FROM subject_to_group WHERE id = ?1", id.get())
      .await
  }

  async fn unlink(&self, subject_id: SubjectId, group_id: GroupId) -> Result<usize> {
    self
      .execute(
        "DELETE FROM subject_to_group WHERE subject_id = ?1 AND group_id = ?2",
        vec![subject_id.get(), group_id.get()],
      )
      .await
  }

  async fn delete_links_for_group(&self, group_id: GroupId) -> Result<usize> {
    self
      .execute("DELETE FROM subject_to_group WHERE group_id = ?1", vec![group_id.get()])
      .await
  }

  async fn delete_links_for_subject(&self, subject_id: SubjectId) -> Result<usize> {
    self
      .execute(
        "DELETE FROM subject_to_group WHERE subject_id = ?1",
        vec![subject_id.get()],
      )
      .await
  }

  // ── Grades ────────────────────────────────────────────────────────────────

  async fn add_grade(&self, grade: NewGrade) -> Result<Grade> {
    let student_id = grade.student_id.get();
    let lesson_id  = grade.lesson_id.get();
    let code       = grade.value.code();
    let date_str   = encode_date(grade.date_recorded);

    let id = self
      .call(move |conn| {
        conn.execute(
          "INSERT INTO grades (student_id, lesson_id, grade, date_recorded)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![student_id, lesson_id, code, date_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Grade {
      id:            GradeId(id),
      student_id:    grade.student_id,
      lesson_id:     grade.lesson_id,
      value:         grade.value,
      date_recorded: grade.date_recorded,
    })
  }

  async fn get_grade(&self, id: GradeId) -> Result<Option<Grade>> {
    let raw = self
      .fetch_optional(
        format!("SELECT {GRADE_COLUMNS} FROM grades WHERE id = ?1"),
        vec![id.get()],
        RawGrade::from_row,
      )
      .await?;
    raw
      .map(RawGrade::into_grade)
      .transpose()
      .inspect_err(log_decode_failure)
  }

  async fn list_grades(&self) -> Result<Vec<Grade>> {
    self
      .fetch_grades(format!("SELECT {GRADE_COLUMNS} FROM grades ORDER BY id"), vec![])
      .await
  }

  async fn grades_for_student(&self, student_id: StudentId) -> Result<Vec<Grade>> {
    self
      .fetch_grades(
        format!("SELECT {GRADE_COLUMNS} FROM grades WHERE student_id = ?1 ORDER BY id"),
        vec![student_id.get()],
      )
      .await
  }

  async fn grades_for_lesson(&self, lesson_id: LessonId) -> Result<Vec<Grade>> {
    self
      .fetch_grades(
        format!("SELECT {GRADE_COLUMNS} FROM grades WHERE lesson_id = ?1 ORDER BY id"),
        vec![lesson_id.get()],
      )
      .await
  }

  async fn find_grade(
    &self,
    student_id: StudentId,
    lesson_id: LessonId,
  ) -> Result<Option<Grade>> {
    let raw = self
      .fetch_optional(
        format!(
          "SELECT {GRADE_COLUMNS} FROM grades
           WHERE student_id = ?1 AND lesson_id = ?2
           ORDER BY id DESC LIMIT 1"
        ),
        vec![student_id.get(), lesson_id.get()],
        RawGrade::from_row,
      )
      .await?;
    raw
      .map(RawGrade::into_grade)
      .transpose()
      .inspect_err(log_decode_failure)
  }

  async fn update_grade(&self, grade: Grade) -> Result<()> {
    let id       = grade.id.get();
    let code     = grade.value.code();
    let date_str = encode_date(grade.date_recorded);

    let n = self
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE grades SET grade = ?1, date_recorded = ?2 WHERE id = ?3",
          rusqlite::params![code, date_str, id],
        )?)
      })
      .await?;
    expect_one("grade", id, n)
  }

  async fn record_grade(
    &self,
    student_id: StudentId,
    lesson_id: LessonId,
    value: GradeValue,
  ) -> Result<Grade> {
    let (sid, lid) = (student_id.get(), lesson_id.get());
    let code       = value.code();
    let today      = encode_date(Local::now().date_naive());
    let select     = format!("SELECT {GRADE_COLUMNS} FROM grades WHERE id = ?1");

    let raw = self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: Option<i64> = tx
          .query_row(
            "SELECT id FROM grades WHERE student_id = ?1 AND lesson_id = ?2
             ORDER BY id DESC LIMIT 1",
            rusqlite::params![sid, lid],
            |row| row.get(0),
          )
          .optional()?;

        let id = match existing {
          Some(id) => {
            tx.execute(
              "UPDATE grades SET grade = ?1, date_recorded = ?2 WHERE id = ?3",
              rusqlite::params![code, today, id],
            )?;
            id
          }
          None => {
            tx.execute(
              "INSERT INTO grades (student_id, lesson_id, grade, date_recorded)
               VALUES (?1, ?2, ?3, ?4)",
              rusqlite::params![sid, lid, code, today],
            )?;
            tx.last_insert_rowid()
          }
        };

        let raw = tx.query_row(&select, rusqlite::params![id], RawGrade::from_row)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    debug!(student = sid, lesson = lid, grade = code, "recorded grade");
    raw.into_grade().inspect_err(log_decode_failure)
  }

  async fn delete_grade(&self, id: GradeId) -> Result<()> {
    self
      .delete_by_id("grade", "DELETE FROM grades WHERE id = ?1", id.get())
      .await
  }

  async fn delete_grades_for_student(&self, student_id: StudentId) -> Result<usize> {
    self
      .execute("DELETE FROM grades WHERE student_id = ?1", vec![student_id.get()])
      .await
  }

  async fn delete_grades_for_lesson(&self, lesson_id: LessonId) -> Result<usize> {
    self
      .execute("DELETE FROM grades WHERE lesson_id = ?1", vec![lesson_id.get()])
      .await
  }
}
