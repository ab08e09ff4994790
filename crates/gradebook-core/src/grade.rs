//! Grade/attendance marks.
//!
//! A [`Grade`] row records one [`GradeValue`] for a (student, lesson) pair.
//! The value is never absent in a stored row: "no mark" is
//! [`GradeValue::NoData`], and readers treat a missing row the same way.

use std::{fmt, str::FromStr};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  ids::{GradeId, LessonId, StudentId},
};

// ─── GradeValue ──────────────────────────────────────────────────────────────

/// The closed set of marks a grading cell can hold.
///
/// The integer [`code`](Self::code) is the only persisted representation and
/// must stay stable.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GradeValue {
  #[default]
  NoData,
  AbsenceUnexcused,
  Grade2,
  Grade3,
  Grade4,
  Grade5,
  AbsenceExcused,
  Present,
}

impl GradeValue {
  /// Every value, in code order.
  pub const ALL: [GradeValue; 8] = [
    Self::NoData,
    Self::AbsenceUnexcused,
    Self::Grade2,
    Self::Grade3,
    Self::Grade4,
    Self::Grade5,
    Self::AbsenceExcused,
    Self::Present,
  ];

  pub fn code(self) -> i64 {
    match self {
      Self::NoData => 0,
      Self::AbsenceUnexcused => 1,
      Self::Grade2 => 2,
      Self::Grade3 => 3,
      Self::Grade4 => 4,
      Self::Grade5 => 5,
      Self::AbsenceExcused => 6,
      Self::Present => 7,
    }
  }

  /// Decode a stored code. Codes outside `0..=7` are rejected, including the
  /// `8..=10` range the schema's check constraint still admits.
  pub fn from_code(code: i64) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|v| v.code() == code)
      .ok_or(Error::InvalidGradeCode(code))
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::NoData => "No data",
      Self::AbsenceUnexcused => "Absent (unexcused)",
      Self::Grade2 => "2",
      Self::Grade3 => "3",
      Self::Grade4 => "4",
      Self::Grade5 => "5",
      Self::AbsenceExcused => "Absent (excused)",
      Self::Present => "Present",
    }
  }

  /// One-character form used in grade grids.
  pub fn short_symbol(self) -> &'static str {
    match self {
      Self::NoData => " ",
      Self::AbsenceUnexcused => "Н",
      Self::Grade2 => "2",
      Self::Grade3 => "3",
      Self::Grade4 => "4",
      Self::Grade5 => "5",
      Self::AbsenceExcused => "У",
      Self::Present => "+",
    }
  }

  /// True only for the numeric marks 2 through 5.
  pub fn is_numeric_grade(self) -> bool {
    matches!(self, Self::Grade2 | Self::Grade3 | Self::Grade4 | Self::Grade5)
  }

  /// True for both excused and unexcused absences.
  pub fn is_absence(self) -> bool {
    matches!(self, Self::AbsenceUnexcused | Self::AbsenceExcused)
  }
}

impl TryFrom<i64> for GradeValue {
  type Error = Error;

  fn try_from(code: i64) -> Result<Self> { Self::from_code(code) }
}

impl From<GradeValue> for i64 {
  fn from(value: GradeValue) -> Self { value.code() }
}

impl fmt::Display for GradeValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.short_symbol())
  }
}

/// Accepts the integer code, the grid symbol, or the snake_case name.
impl FromStr for GradeValue {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    if let Ok(code) = s.parse::<i64>() {
      return Self::from_code(code);
    }
    match s {
      "" | "-" | "no_data" => Ok(Self::NoData),
      "Н" | "н" | "absence_unexcused" => Ok(Self::AbsenceUnexcused),
      "У" | "у" | "absence_excused" => Ok(Self::AbsenceExcused),
      "+" | "present" => Ok(Self::Present),
      "grade2" => Ok(Self::Grade2),
      "grade3" => Ok(Self::Grade3),
      "grade4" => Ok(Self::Grade4),
      "grade5" => Ok(Self::Grade5),
      other => Err(Error::UnknownGradeSymbol(other.to_owned())),
    }
  }
}

// ─── Grade ───────────────────────────────────────────────────────────────────

/// A stored mark for one student in one lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
  pub id:            GradeId,
  pub student_id:    StudentId,
  pub lesson_id:     LessonId,
  pub value:         GradeValue,
  pub date_recorded: NaiveDate,
}

/// Input to [`crate::store::RecordsStore::add_grade`].
#[derive(Debug, Clone)]
pub struct NewGrade {
  pub student_id:    StudentId,
  pub lesson_id:     LessonId,
  pub value:         GradeValue,
  pub date_recorded: NaiveDate,
}

impl NewGrade {
  /// A mark recorded today (local calendar date).
  pub fn new(student_id: StudentId, lesson_id: LessonId, value: GradeValue) -> Self {
    Self {
      student_id,
      lesson_id,
      value,
      date_recorded: Local::now().date_naive(),
    }
  }
}
