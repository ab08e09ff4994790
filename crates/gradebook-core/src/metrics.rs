//! Derived statistics over grade values: attendance percentage and average
//! grade, per student and pooled per group.
//!
//! Everything here is a pure function of its input; nothing touches storage.
//!
//! Attendance counts only [`GradeValue::AbsenceUnexcused`] as missed. An
//! excused absence counts as attended, alongside numeric grades and
//! [`GradeValue::Present`]. [`GradeValue::NoData`] is ignored.

use serde::Serialize;

use crate::{grade::GradeValue, sheet::GradeRow};

/// Placeholder rendered when a metric has no input to work from.
pub const NO_DATA: &str = "—";

/// Percentage of relevant marks that count as attended, rounded to one
/// decimal place. `None` when no mark is relevant.
pub fn attendance_percentage(
  values: impl IntoIterator<Item = GradeValue>,
) -> Option<f64> {
  let (attended, missed) = attendance_counts(values);
  let total = attended + missed;
  if total == 0 {
    return None;
  }
  Some(round_to(attended as f64 / total as f64 * 100.0, 1))
}

/// Mean of the numeric marks (2–5), rounded to two decimal places. `None`
/// when there are no numeric marks.
pub fn average_grade(values: impl IntoIterator<Item = GradeValue>) -> Option<f64> {
  let (sum, count) = values
    .into_iter()
    .filter(|v| v.is_numeric_grade())
    .fold((0i64, 0usize), |(sum, count), v| (sum + v.code(), count + 1));
  if count == 0 {
    return None;
  }
  Some(round_to(sum as f64 / count as f64, 2))
}

fn attendance_counts(values: impl IntoIterator<Item = GradeValue>) -> (usize, usize) {
  values
    .into_iter()
    .fold((0, 0), |(attended, missed), v| match v {
      GradeValue::NoData => (attended, missed),
      GradeValue::AbsenceUnexcused => (attended, missed + 1),
      _ => (attended + 1, missed),
    })
}

fn round_to(value: f64, places: i32) -> f64 {
  let factor = 10f64.powi(places);
  (value * factor).round() / factor
}

// ─── Summaries ───────────────────────────────────────────────────────────────

/// Attendance and average for one student's row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StudentSummary {
  pub attendance: Option<f64>,
  pub average:    Option<f64>,
}

pub fn summarize(row: &GradeRow) -> StudentSummary {
  StudentSummary {
    attendance: attendance_percentage(row.values()),
    average:    average_grade(row.values()),
  }
}

/// Group-level metrics: every individual mark from every row is pooled
/// before computing, so this is not an average of per-student averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupMetrics {
  pub attendance: Option<f64>,
  pub average:    Option<f64>,
}

pub fn group_metrics(rows: &[GradeRow]) -> GroupMetrics {
  let pooled = || rows.iter().flat_map(GradeRow::values);
  GroupMetrics {
    attendance: attendance_percentage(pooled()),
    average:    average_grade(pooled()),
  }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// `"66.7%"`, or [`NO_DATA`].
pub fn format_attendance(attendance: Option<f64>) -> String {
  attendance.map_or_else(|| NO_DATA.to_owned(), |p| format!("{p:.1}%"))
}

/// `"3.50"`, or [`NO_DATA`].
pub fn format_average(average: Option<f64>) -> String {
  average.map_or_else(|| NO_DATA.to_owned(), |a| format!("{a:.2}"))
}
