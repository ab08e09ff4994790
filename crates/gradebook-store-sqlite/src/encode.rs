//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Identities are plain `INTEGER`s. Grade values are stored as their integer
//! code. Dates are ISO `YYYY-MM-DD` text, which is also what SQLite's
//! `CURRENT_DATE` default produces.

use chrono::NaiveDate;
use gradebook_core::{
  Grade, GradeValue, Group, Lesson, Student, Subject, SubjectGroupLink,
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const GROUP_COLUMNS: &str = "id, name";
pub const SUBJECT_COLUMNS: &str = "id, name";
pub const LESSON_COLUMNS: &str = "id, name, subject_id";
pub const STUDENT_COLUMNS: &str = "id, full_name, group_id";
pub const LINK_COLUMNS: &str = "id, subject_id, group_id";
pub const GRADE_COLUMNS: &str = "id, student_id, lesson_id, grade, date_recorded";

// ─── Row mappers ─────────────────────────────────────────────────────────────
//
// Each expects the matching `*_COLUMNS` list, in order.

pub fn group_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Group> {
  Ok(Group { id: row.get::<_, i64>(0)?.into(), name: row.get(1)? })
}

pub fn subject_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subject> {
  Ok(Subject { id: row.get::<_, i64>(0)?.into(), name: row.get(1)? })
}

pub fn lesson_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lesson> {
  Ok(Lesson {
    id:         row.get::<_, i64>(0)?.into(),
    name:       row.get(1)?,
    subject_id: row.get::<_, i64>(2)?.into(),
  })
}

pub fn student_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
  Ok(Student {
    id:        row.get::<_, i64>(0)?.into(),
    full_name: row.get(1)?,
    group_id:  row.get::<_, i64>(2)?.into(),
  })
}

pub fn link_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubjectGroupLink> {
  Ok(SubjectGroupLink {
    id:         row.get::<_, i64>(0)?.into(),
    subject_id: row.get::<_, i64>(1)?.into(),
    group_id:   row.get::<_, i64>(2)?.into(),
  })
}

// ─── Grades ──────────────────────────────────────────────────────────────────

/// Raw values read directly from a `grades` row. Decoding the grade code and
/// the date can fail, so it happens outside the connection closure.
pub struct RawGrade {
  pub id:            i64,
  pub student_id:    i64,
  pub lesson_id:     i64,
  pub grade:         i64,
  pub date_recorded: String,
}

impl RawGrade {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      student_id:    row.get(1)?,
      lesson_id:     row.get(2)?,
      grade:         row.get(3)?,
      date_recorded: row.get(4)?,
    })
  }

  pub fn into_grade(self) -> Result<Grade> {
    Ok(Grade {
      id:            self.id.into(),
      student_id:    self.student_id.into(),
      lesson_id:     self.lesson_id.into(),
      value:         GradeValue::from_code(self.grade)?,
      date_recorded: decode_date(&self.date_recorded)?,
    })
  }
}

pub fn decode_grades(raws: Vec<RawGrade>) -> Result<Vec<Grade>> {
  raws.into_iter().map(RawGrade::into_grade).collect()
}
