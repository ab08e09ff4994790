//! Subcommands and their handlers.
//!
//! Handlers are generic over [`RecordsStore`]; `main` supplies the SQLite
//! store.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::Subcommand;
use gradebook_core::{
  GradeValue, Group, GroupId, LessonId, NewGroup, NewLesson, NewLink,
  NewStudent, NewSubject, StudentId, SubjectId,
  import::{import_group_subjects, import_roster, import_subject},
  sheet::load_sheet,
  store::RecordsStore,
};
use serde::Serialize;
use tracing::warn;

use crate::render;

// ─── Command tree ─────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage groups.
  #[command(subcommand)]
  Groups(GroupCommand),

  /// Manage students within a group.
  #[command(subcommand)]
  Students(StudentCommand),

  /// Manage subjects and which groups take them.
  #[command(subcommand)]
  Subjects(SubjectCommand),

  /// Manage the lessons of a subject.
  #[command(subcommand)]
  Lessons(LessonCommand),

  /// Record marks.
  #[command(subcommand)]
  Grade(GradeCommand),

  /// Print the grade grid for a group and subject.
  Sheet { group: GroupId, subject: SubjectId },

  /// Import records from text files.
  #[command(subcommand)]
  Import(ImportCommand),
}

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
  List,
  Add { name: String },
  Rename { id: GroupId, name: String },
  /// Delete a group with its students, their marks and its subject links.
  Delete { id: GroupId },
}

#[derive(Subcommand, Debug)]
pub enum StudentCommand {
  List { group: GroupId },
  Add { group: GroupId, full_name: String },
  Delete { id: StudentId },
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommand {
  List {
    /// Only subjects offered to this group.
    #[arg(long)]
    group: Option<GroupId>,
  },
  Add { name: String },
  /// Delete a subject with its lessons, their marks and its group links.
  Delete { id: SubjectId },
  /// Offer a subject to a group. Linking twice is a no-op.
  Link { subject: SubjectId, group: GroupId },
  Unlink { subject: SubjectId, group: GroupId },
}

#[derive(Subcommand, Debug)]
pub enum LessonCommand {
  List { subject: SubjectId },
  Add { subject: SubjectId, name: String },
  Delete { id: LessonId },
}

#[derive(Subcommand, Debug)]
pub enum GradeCommand {
  /// Set a student's mark for a lesson, replacing any earlier mark.
  ///
  /// VALUE is a code (0-7), a grid symbol (Н, У, +, 2-5) or a name such as
  /// `absence_excused`.
  Set {
    student: StudentId,
    lesson:  LessonId,
    value:   GradeValue,
  },
}

#[derive(Subcommand, Debug)]
pub enum ImportCommand {
  /// CSV of `full name, group name` with a header row.
  Roster { file: PathBuf },
  /// Subject name on the first line, then one lesson per line.
  Subject { file: PathBuf },
  /// One subject name per line; each is created if needed and linked.
  GroupSubjects { group: GroupId, file: PathBuf },
}

// ─── Output ───────────────────────────────────────────────────────────────────

/// Where results go: pretty JSON, or the human-readable text from `text`.
#[derive(Debug, Clone, Copy)]
pub struct Output {
  pub json: bool,
}

impl Output {
  fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if self.json {
      println!("{}", serde_json::to_string_pretty(value)?);
    } else {
      print!("{}", text(value));
    }
    Ok(())
  }

  fn done(&self, message: String) -> Result<()> {
    let value = serde_json::json!({ "ok": true, "message": &message });
    self.emit(&value, |_| format!("{message}\n"))
  }
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

pub async fn run<S: RecordsStore>(store: &S, command: Command, out: Output) -> Result<()> {
  match command {
    Command::Groups(cmd) => groups(store, cmd, out).await,
    Command::Students(cmd) => students(store, cmd, out).await,
    Command::Subjects(cmd) => subjects(store, cmd, out).await,
    Command::Lessons(cmd) => lessons(store, cmd, out).await,
    Command::Grade(cmd) => grade(store, cmd, out).await,
    Command::Sheet { group, subject } => sheet(store, group, subject, out).await,
    Command::Import(cmd) => import(store, cmd, out).await,
  }
}

async fn groups<S: RecordsStore>(store: &S, cmd: GroupCommand, out: Output) -> Result<()> {
  match cmd {
    GroupCommand::List => {
      let groups = store.list_groups().await?;
      out.emit(&groups, |gs| {
        let rows: Vec<_> = gs.iter().map(|g| vec![g.id.to_string(), g.name.clone()]).collect();
        render::table(&["ID", "Name"], &rows)
      })
    }
    GroupCommand::Add { name } => {
      let group = store.add_group(NewGroup::new(name)).await?;
      out.emit(&group, |g| format!("added group {} ({})\n", g.id, g.name))
    }
    GroupCommand::Rename { id, name } => {
      store
        .update_group(Group { id, name })
        .await
        .with_context(|| format!("renaming group {id}"))?;
      out.done(format!("renamed group {id}"))
    }
    GroupCommand::Delete { id } => {
      store
        .delete_group(id)
        .await
        .with_context(|| format!("deleting group {id}"))?;
      out.done(format!("deleted group {id}"))
    }
  }
}

async fn students<S: RecordsStore>(
  store: &S,
  cmd: StudentCommand,
  out: Output,
) -> Result<()> {
  match cmd {
    StudentCommand::List { group } => {
      let mut students = store.students_in_group(group).await?;
      students.sort_by_cached_key(|s| s.full_name.to_lowercase());
      out.emit(&students, |ss| {
        let rows: Vec<_> =
          ss.iter().map(|s| vec![s.id.to_string(), s.full_name.clone()]).collect();
        render::table(&["ID", "Full name"], &rows)
      })
    }
    StudentCommand::Add { group, full_name } => {
      let student = store
        .add_student(NewStudent::new(full_name, group))
        .await
        .with_context(|| format!("adding student to group {group}"))?;
      out.emit(&student, |s| format!("added student {} ({})\n", s.id, s.full_name))
    }
    StudentCommand::Delete { id } => {
      store
        .delete_student(id)
        .await
        .with_context(|| format!("deleting student {id}"))?;
      out.done(format!("deleted student {id}"))
    }
  }
}

async fn subjects<S: RecordsStore>(
  store: &S,
  cmd: SubjectCommand,
  out: Output,
) -> Result<()> {
  match cmd {
    SubjectCommand::List { group } => {
      let subjects = match group {
        None => store.list_subjects().await?,
        Some(group) => {
          let mut subjects = Vec::new();
          for id in store.subject_ids_for_group(group).await? {
            if let Some(subject) = store.get_subject(id).await? {
              subjects.push(subject);
            }
          }
          subjects
        }
      };
      out.emit(&subjects, |ss| {
        let rows: Vec<_> = ss.iter().map(|s| vec![s.id.to_string(), s.name.clone()]).collect();
        render::table(&["ID", "Name"], &rows)
      })
    }
    SubjectCommand::Add { name } => {
      let subject = store.add_subject(NewSubject::new(name)).await?;
      out.emit(&subject, |s| format!("added subject {} ({})\n", s.id, s.name))
    }
    SubjectCommand::Delete { id } => {
      store
        .delete_subject(id)
        .await
        .with_context(|| format!("deleting subject {id}"))?;
      out.done(format!("deleted subject {id}"))
    }
    SubjectCommand::Link { subject, group } => {
      let link = store
        .add_link(NewLink::new(subject, group))
        .await
        .with_context(|| format!("linking subject {subject} to group {group}"))?;
      match link {
        Some(_) => out.done(format!("linked subject {subject} to group {group}")),
        None => out.done(format!("subject {subject} is already linked to group {group}")),
      }
    }
    SubjectCommand::Unlink { subject, group } => {
      let removed = store.unlink(subject, group).await?;
      if removed == 0 {
        warn!(%subject, %group, "no link to remove");
      }
      out.done(format!("removed {removed} link(s)"))
    }
  }
}

async fn lessons<S: RecordsStore>(store: &S, cmd: LessonCommand, out: Output) -> Result<()> {
  match cmd {
    LessonCommand::List { subject } => {
      let lessons = store.lessons_for_subject(subject).await?;
      out.emit(&lessons, |ls| {
        let rows: Vec<_> = ls.iter().map(|l| vec![l.id.to_string(), l.name.clone()]).collect();
        render::table(&["ID", "Name"], &rows)
      })
    }
    LessonCommand::Add { subject, name } => {
      let lesson = store
        .add_lesson(NewLesson::new(name, subject))
        .await
        .with_context(|| format!("adding lesson to subject {subject}"))?;
      out.emit(&lesson, |l| format!("added lesson {} ({})\n", l.id, l.name))
    }
    LessonCommand::Delete { id } => {
      store
        .delete_lesson(id)
        .await
        .with_context(|| format!("deleting lesson {id}"))?;
      out.done(format!("deleted lesson {id}"))
    }
  }
}

async fn grade<S: RecordsStore>(store: &S, cmd: GradeCommand, out: Output) -> Result<()> {
  match cmd {
    GradeCommand::Set { student, lesson, value } => {
      let grade = store
        .record_grade(student, lesson, value)
        .await
        .with_context(|| format!("recording grade for student {student}, lesson {lesson}"))?;
      out.emit(&grade, |g| {
        format!(
          "student {} lesson {}: {} ({})\n",
          g.student_id,
          g.lesson_id,
          g.value.label(),
          g.date_recorded
        )
      })
    }
  }
}

async fn sheet<S: RecordsStore>(
  store: &S,
  group: GroupId,
  subject: SubjectId,
  out: Output,
) -> Result<()> {
  let Some(sheet) = load_sheet(store, group, subject).await? else {
    bail!("group {group} or subject {subject} does not exist");
  };
  if !store.link_exists(subject, group).await? {
    warn!(%group, %subject, "subject is not linked to this group");
  }

  if out.json {
    let view = serde_json::json!({
      "sheet": &sheet,
      "summaries": sheet.summaries(),
      "group_metrics": sheet.group_metrics(),
    });
    out.emit(&view, |_| String::new())
  } else {
    out.emit(&sheet, render::sheet)
  }
}

async fn import<S: RecordsStore>(store: &S, cmd: ImportCommand, out: Output) -> Result<()> {
  match cmd {
    ImportCommand::Roster { file } => {
      let input = read(&file)?;
      let mut rows = Vec::new();
      for row in gradebook_csv::parse_roster(&input) {
        match row {
          Ok(row) => rows.push(row),
          Err(e) => warn!(file = %file.display(), error = %e, "skipping roster record"),
        }
      }
      let report = import_roster(store, &rows).await?;
      out.emit(&report, |r| {
        format!(
          "groups created: {}\nstudents created: {}\nstudents skipped: {}\nfailed: {}\n",
          r.groups_created, r.students_created, r.students_skipped, r.failed
        )
      })
    }
    ImportCommand::Subject { file } => {
      let input = read(&file)?;
      let parsed = gradebook_csv::parse_subject_sheet(&input)
        .with_context(|| format!("parsing {}", file.display()))?;
      let imported = import_subject(store, &parsed).await?;
      out.emit(&imported, |i| {
        if i.created {
          format!(
            "created subject {} with {} lesson(s), {} failed\n",
            i.subject.name,
            i.lessons.len(),
            i.lessons_failed
          )
        } else {
          format!("subject {} already exists; nothing imported\n", i.subject.name)
        }
      })
    }
    ImportCommand::GroupSubjects { group, file } => {
      if store.get_group(group).await?.is_none() {
        bail!("group {group} does not exist");
      }
      let input = read(&file)?;
      let names = gradebook_csv::parse_subject_names(&input);
      let report = import_group_subjects(store, group, &names).await?;
      out.emit(&report, |r| {
        format!(
          "subjects created: {}\nlinks created: {}\nlinks skipped: {}\nfailed: {}\n",
          r.subjects_created, r.links_created, r.links_skipped, r.failed
        )
      })
    }
  }
}

fn read(path: &Path) -> Result<String> {
  std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
