//! Store-assigned identities.
//!
//! Every table uses an `INTEGER PRIMARY KEY AUTOINCREMENT`, so identities are
//! monotonic and never reused. Each entity gets its own newtype so a student
//! id cannot be passed where a lesson id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! identity {
  ($($(#[$meta:meta])* $name:ident;)+) => {$(
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl $name {
      pub fn get(self) -> i64 { self.0 }
    }

    impl From<i64> for $name {
      fn from(raw: i64) -> Self { Self(raw) }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl std::str::FromStr for $name {
      type Err = std::num::ParseIntError;

      fn from_str(s: &str) -> Result<Self, Self::Err> { s.parse().map(Self) }
    }
  )+};
}

identity! {
  /// Identity of a row in `groups`.
  GroupId;
  /// Identity of a row in `subjects`.
  SubjectId;
  /// Identity of a row in `lessons`.
  LessonId;
  /// Identity of a row in `students`.
  StudentId;
  /// Identity of a row in `subject_to_group`.
  LinkId;
  /// Identity of a row in `grades`.
  GradeId;
}
