//! Subjects, their lessons, and the subject↔group association.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, LessonId, LinkId, SubjectId};

// ─── Subject ─────────────────────────────────────────────────────────────────

/// A course offered to one or more groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:   SubjectId,
  pub name: String,
}

/// Input to [`crate::store::RecordsStore::add_subject`].
#[derive(Debug, Clone)]
pub struct NewSubject {
  pub name: String,
}

impl NewSubject {
  pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }
}

// ─── Lesson ──────────────────────────────────────────────────────────────────

/// One session of a subject; grades are recorded per lesson.
///
/// Equality and hashing use `id` alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
  pub id:         LessonId,
  pub name:       String,
  pub subject_id: SubjectId,
}

impl PartialEq for Lesson {
  fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for Lesson {}

impl Hash for Lesson {
  fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state); }
}

/// Input to [`crate::store::RecordsStore::add_lesson`].
#[derive(Debug, Clone)]
pub struct NewLesson {
  pub name:       String,
  pub subject_id: SubjectId,
}

impl NewLesson {
  pub fn new(name: impl Into<String>, subject_id: SubjectId) -> Self {
    Self { name: name.into(), subject_id }
  }
}

// ─── SubjectGroupLink ────────────────────────────────────────────────────────

/// "This subject is offered to this group."
///
/// At most one link exists per `(subject_id, group_id)` pair, and two links
/// are equal when that pair matches; the row `id` takes no part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectGroupLink {
  pub id:         LinkId,
  pub subject_id: SubjectId,
  pub group_id:   GroupId,
}

impl SubjectGroupLink {
  pub fn key(&self) -> (SubjectId, GroupId) { (self.subject_id, self.group_id) }
}

impl PartialEq for SubjectGroupLink {
  fn eq(&self, other: &Self) -> bool { self.key() == other.key() }
}

impl Eq for SubjectGroupLink {}

impl Hash for SubjectGroupLink {
  fn hash<H: Hasher>(&self, state: &mut H) { self.key().hash(state); }
}

/// Input to [`crate::store::RecordsStore::add_link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLink {
  pub subject_id: SubjectId,
  pub group_id:   GroupId,
}

impl NewLink {
  pub fn new(subject_id: SubjectId, group_id: GroupId) -> Self {
    Self { subject_id, group_id }
  }
}
