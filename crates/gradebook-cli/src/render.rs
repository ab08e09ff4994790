//! Plain-text rendering for terminal output.

use gradebook_core::{
  metrics::{format_attendance, format_average},
  sheet::GradeSheet,
};

/// Left-aligned columns separated by two spaces. Widths count characters,
/// not bytes, so Cyrillic names line up.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
  let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
  for row in rows {
    for (i, cell) in row.iter().enumerate() {
      let w = cell.chars().count();
      match widths.get_mut(i) {
        Some(width) => *width = (*width).max(w),
        None => widths.push(w),
      }
    }
  }

  let mut out = String::new();
  let header: Vec<String> = headers.iter().map(|h| (*h).to_owned()).collect();
  for row in std::iter::once(&header).chain(rows) {
    let line: Vec<String> = row
      .iter()
      .zip(&widths)
      .map(|(cell, width)| format!("{cell:<width$}"))
      .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
  }
  out
}

/// The grading grid: one row per student, one column per lesson, then the
/// student's attendance and average, and a closing line for the group.
pub fn sheet(sheet: &GradeSheet) -> String {
  let mut headers = vec!["Student"];
  headers.extend(sheet.lessons.iter().map(|l| l.name.as_str()));
  headers.extend(["Attendance", "Average"]);

  let rows: Vec<Vec<String>> = sheet
    .rows
    .iter()
    .zip(sheet.summaries())
    .map(|(row, summary)| {
      let mut cells = vec![row.student.full_name.clone()];
      cells.extend(
        sheet
          .lessons
          .iter()
          .map(|l| row.grade_for(l.id).short_symbol().to_owned()),
      );
      cells.push(format_attendance(summary.attendance));
      cells.push(format_average(summary.average));
      cells
    })
    .collect();

  let group = sheet.group_metrics();
  format!(
    "{} / {}\n\n{}\nGroup attendance: {}    Group average: {}\n",
    sheet.group.name,
    sheet.subject.name,
    table(&headers, &rows),
    format_attendance(group.attendance),
    format_average(group.average),
  )
}
