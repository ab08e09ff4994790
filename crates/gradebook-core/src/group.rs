//! Groups (class cohorts) and the students enrolled in them.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, StudentId};

/// A cohort of students. Names are not unique; callers that want one group
/// per name must look before inserting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub id:   GroupId,
  pub name: String,
}

/// Input to [`crate::store::RecordsStore::add_group`].
#[derive(Debug, Clone)]
pub struct NewGroup {
  pub name: String,
}

impl NewGroup {
  pub fn new(name: impl Into<String>) -> Self { Self { name: name.into() } }
}

/// A student belongs to exactly one group.
///
/// Two `Student` values are equal when their ids are equal, whatever their
/// other fields hold; grid rows and caches key on that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
  pub id:        StudentId,
  pub full_name: String,
  pub group_id:  GroupId,
}

impl PartialEq for Student {
  fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for Student {}

impl Hash for Student {
  fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state); }
}

/// Input to [`crate::store::RecordsStore::add_student`].
#[derive(Debug, Clone)]
pub struct NewStudent {
  pub full_name: String,
  pub group_id:  GroupId,
}

impl NewStudent {
  pub fn new(full_name: impl Into<String>, group_id: GroupId) -> Self {
    Self { full_name: full_name.into(), group_id }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn students_compare_by_id_only() {
    let a = Student {
      id:        StudentId(1),
      full_name: "Ivanov".into(),
      group_id:  GroupId(1),
    };
    let renamed = Student {
      full_name: "Ivanov I.".into(),
      group_id: GroupId(2),
      ..a.clone()
    };
    let other = Student { id: StudentId(2), ..a.clone() };

    assert_eq!(a, renamed);
    assert_ne!(a, other);

    let set: HashSet<_> = [a, renamed, other].into_iter().collect();
    assert_eq!(set.len(), 2);
  }
}
