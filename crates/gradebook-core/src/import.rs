//! Bulk import workflows: rosters, subjects with lessons, and a group's
//! subject list.
//!
//! Each workflow takes already-parsed rows (see `gradebook-csv`), resolves
//! names to existing entities where possible, and creates only what is
//! missing. Rows that resolve to something that already exists are counted
//! as skipped; running the same import twice writes nothing the second time.
//! A row whose write fails is logged, counted as failed, and the import moves
//! on to the next row. Read failures still abort the import.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
  group::{NewGroup, NewStudent},
  ids::{GroupId, SubjectId},
  store::RecordsStore,
  subject::{Lesson, NewLesson, NewLink, NewSubject, Subject},
};

// ─── Input rows ──────────────────────────────────────────────────────────────

/// One roster line: a student and the name of the group they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
  pub full_name:  String,
  pub group_name: String,
}

/// A subject name followed by the names of its lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectSheet {
  pub name:    String,
  pub lessons: Vec<String>,
}

// ─── Roster ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterReport {
  pub groups_created:   usize,
  pub students_created: usize,
  pub students_skipped: usize,
  /// Rows whose group or student could not be written.
  pub failed:           usize,
}

/// Find-or-create each row's group by exact name, then add the student
/// unless the group already has a student with the same full name.
pub async fn import_roster<S: RecordsStore>(
  store: &S,
  rows: &[RosterRow],
) -> Result<RosterReport, S::Error> {
  let mut report = RosterReport::default();
  let mut group_ids: HashMap<&str, GroupId> = HashMap::new();

  for row in rows {
    let group_id = match group_ids.get(row.group_name.as_str()) {
      Some(id) => *id,
      None => {
        let existing = store
          .list_groups()
          .await?
          .into_iter()
          .find(|g| g.name == row.group_name);
        let id = match existing {
          Some(group) => group.id,
          None => match store.add_group(NewGroup::new(&row.group_name)).await {
            Ok(group) => {
              report.groups_created += 1;
              debug!(group = %group.name, id = %group.id, "created group");
              group.id
            }
            Err(e) => {
              warn!(group = %row.group_name, error = %e, "failed to create group; row skipped");
              report.failed += 1;
              continue;
            }
          },
        };
        group_ids.insert(&row.group_name, id);
        id
      }
    };

    let already_enrolled = store
      .students_in_group(group_id)
      .await?
      .iter()
      .any(|s| s.full_name == row.full_name);
    if already_enrolled {
      report.students_skipped += 1;
      continue;
    }

    match store.add_student(NewStudent::new(&row.full_name, group_id)).await {
      Ok(_) => report.students_created += 1,
      Err(e) => {
        warn!(student = %row.full_name, error = %e, "failed to add student; row skipped");
        report.failed += 1;
      }
    }
  }

  info!(
    groups = report.groups_created,
    students = report.students_created,
    skipped = report.students_skipped,
    failed = report.failed,
    "roster import finished"
  );
  Ok(report)
}

// ─── Subject with lessons ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SubjectImport {
  pub subject: Subject,
  /// False when a subject with this name already existed; in that case no
  /// lessons were added.
  pub created:        bool,
  pub lessons:        Vec<Lesson>,
  /// Lesson names that could not be written.
  pub lessons_failed: usize,
}

/// Create a subject and its lessons, unless a subject with the same name
/// already exists, in which case the existing subject is returned untouched.
/// A lesson that fails to insert is logged and skipped.
pub async fn import_subject<S: RecordsStore>(
  store: &S,
  sheet: &SubjectSheet,
) -> Result<SubjectImport, S::Error> {
  if let Some(subject) = store.find_subject_by_name(&sheet.name).await? {
    info!(subject = %subject.name, "subject already exists; lessons not imported");
    return Ok(SubjectImport {
      subject,
      created: false,
      lessons: Vec::new(),
      lessons_failed: 0,
    });
  }

  let subject = store.add_subject(NewSubject::new(&sheet.name)).await?;
  let mut lessons = Vec::with_capacity(sheet.lessons.len());
  let mut lessons_failed = 0;
  for name in &sheet.lessons {
    match store.add_lesson(NewLesson::new(name, subject.id)).await {
      Ok(lesson) => lessons.push(lesson),
      Err(e) => {
        warn!(lesson = %name, error = %e, "failed to add lesson; skipped");
        lessons_failed += 1;
      }
    }
  }

  info!(
    subject = %subject.name,
    lessons = lessons.len(),
    failed = lessons_failed,
    "imported subject"
  );
  Ok(SubjectImport { subject, created: true, lessons, lessons_failed })
}

// ─── Group subject list ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
  pub subjects_created: usize,
  pub links_created:    usize,
  pub links_skipped:    usize,
  /// Names whose subject or link could not be written.
  pub failed:           usize,
}

/// Find-or-create each named subject and offer it to `group_id`. Duplicate
/// names in `names` are processed once. A name whose subject or link write
/// fails is logged and counted in [`LinkReport::failed`].
pub async fn import_group_subjects<S, I, N>(
  store: &S,
  group_id: GroupId,
  names: I,
) -> Result<LinkReport, S::Error>
where
  S: RecordsStore,
  I: IntoIterator<Item = N>,
  N: AsRef<str>,
{
  let mut report = LinkReport::default();
  let mut seen: HashSet<String> = HashSet::new();

  for name in names {
    let name = name.as_ref();
    if !seen.insert(name.to_owned()) {
      continue;
    }

    let subject_id: SubjectId = match store.find_subject_by_name(name).await? {
      Some(subject) => subject.id,
      None => match store.add_subject(NewSubject::new(name)).await {
        Ok(subject) => {
          report.subjects_created += 1;
          subject.id
        }
        Err(e) => {
          warn!(subject = %name, error = %e, "failed to create subject; skipped");
          report.failed += 1;
          continue;
        }
      },
    };

    match store.add_link(NewLink::new(subject_id, group_id)).await {
      Ok(Some(_)) => report.links_created += 1,
      Ok(None) => report.links_skipped += 1,
      Err(e) => {
        warn!(subject = %name, group = %group_id, error = %e, "failed to link subject");
        report.failed += 1;
      }
    }
  }

  info!(
    group = %group_id,
    created = report.links_created,
    skipped = report.links_skipped,
    failed = report.failed,
    "group subject import finished"
  );
  Ok(report)
}
