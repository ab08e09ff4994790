//! Parsers for the plain-text feeds the gradebook imports.
//!
//! Three formats are understood:
//!
//! - a **roster**: CSV with a header row, then `full name, group name` per
//!   record;
//! - a **subject sheet**: the subject name on the first non-blank line, one
//!   lesson name per following line;
//! - a **subject list**: one subject name per line.
//!
//! Output types come from [`gradebook_core::import`] and feed straight into
//! the import workflows there. Pure synchronous; no database access.
//!
//! ```no_run
//! let rows = gradebook_csv::parse_roster("name,group\nAnna Petrova,G-1\n");
//! assert_eq!(rows.len(), 1);
//! ```

pub mod error;
mod parse;

pub use error::{Error, Result};
use gradebook_core::import::{RosterRow, SubjectSheet};

/// Parse a roster.
///
/// The first non-blank record is a header and is skipped. Fields are
/// trimmed. Each later record yields one entry: `Err(MalformedRecord)` when
/// it has fewer than two fields, `Ok(row)` otherwise. Records whose name or
/// group is empty are dropped without an entry.
pub fn parse_roster(input: &str) -> Vec<Result<RosterRow>> {
  parse::roster(input.as_bytes())
}

/// Parse a subject sheet: subject name first, then its lessons in order.
pub fn parse_subject_sheet(input: &str) -> Result<SubjectSheet> {
  let mut lines = parse::non_blank_lines(input);
  let name = lines.next().ok_or(Error::MissingSubjectName)?;
  Ok(SubjectSheet {
    name:    name.to_owned(),
    lessons: lines.map(str::to_owned).collect(),
  })
}

/// Parse a list of subject names, one per line. Duplicates are dropped,
/// keeping the first occurrence.
pub fn parse_subject_names(input: &str) -> Vec<String> {
  let mut names: Vec<String> = Vec::new();
  for line in parse::non_blank_lines(input) {
    if !names.iter().any(|n| n == line) {
      names.push(line.to_owned());
    }
  }
  names
}
