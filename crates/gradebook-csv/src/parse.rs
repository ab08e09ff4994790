//! Record- and line-level parsing shared by the public entry points.

use std::io;

use gradebook_core::import::RosterRow;

use crate::error::{Error, Result};

// ─── Roster ──────────────────────────────────────────────────────────────────

pub(crate) fn roster<R: io::Read>(input: R) -> Vec<Result<RosterRow>> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(false)
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(input);

  let mut rows = Vec::new();
  let mut header_skipped = false;

  for record in reader.records() {
    let record = match record {
      Ok(record) => record,
      Err(e) if e.is_io_error() => {
        rows.push(Err(Error::from(e)));
        break;
      }
      Err(e) => {
        rows.push(Err(Error::from(e)));
        continue;
      }
    };

    if record.iter().all(str::is_empty) {
      continue;
    }
    if !header_skipped {
      header_skipped = true;
      continue;
    }

    if let Some(row) = roster_row(&record).transpose() {
      rows.push(row);
    }
  }

  rows
}

/// `Ok(None)` for a well-formed record with an empty field.
fn roster_row(record: &csv::StringRecord) -> Result<Option<RosterRow>> {
  let (Some(full_name), Some(group_name)) = (record.get(0), record.get(1)) else {
    let line = record.position().map_or(0, csv::Position::line);
    return Err(Error::MalformedRecord { line });
  };
  if full_name.is_empty() || group_name.is_empty() {
    return Ok(None);
  }
  Ok(Some(RosterRow {
    full_name:  full_name.to_owned(),
    group_name: group_name.to_owned(),
  }))
}

// ─── Plain lines ─────────────────────────────────────────────────────────────

/// Trimmed, non-empty lines. Tolerates CRLF endings.
pub(crate) fn non_blank_lines(input: &str) -> impl Iterator<Item = &str> {
  input.lines().map(str::trim).filter(|l| !l.is_empty())
}
