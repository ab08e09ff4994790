//! SQL schema for the gradebook SQLite store.
//!
//! Table and column sets are fixed for compatibility with existing
//! `education.db` files. The `grades.grade` check admits 0–10 even though
//! only codes 0–7 are ever written.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `foreign_keys` is a per-connection setting in SQLite, so this must run on
/// every connection the store opens, not just when the file is created.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS groups (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lessons (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    subject_id  INTEGER NOT NULL,
    FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE
);

-- One row per (subject, group) pair; uniqueness is enforced by the store,
-- not by a constraint.
CREATE TABLE IF NOT EXISTS subject_to_group (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id  INTEGER NOT NULL,
    group_id    INTEGER NOT NULL,
    FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE,
    FOREIGN KEY (group_id)   REFERENCES groups(id)   ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS students (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name  TEXT NOT NULL,
    group_id   INTEGER NOT NULL,
    FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE
);

-- No UNIQUE (student_id, lesson_id): duplicate rows are possible and
-- readers take the highest id.
CREATE TABLE IF NOT EXISTS grades (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id     INTEGER NOT NULL,
    lesson_id      INTEGER NOT NULL,
    grade          INTEGER NOT NULL CHECK (grade >= 0 AND grade <= 10),
    date_recorded  DATE NOT NULL DEFAULT CURRENT_DATE,
    FOREIGN KEY (student_id) REFERENCES students(id) ON DELETE CASCADE,
    FOREIGN KEY (lesson_id)  REFERENCES lessons(id)  ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS lessons_subject_idx ON lessons(subject_id);
CREATE INDEX IF NOT EXISTS links_subject_idx   ON subject_to_group(subject_id);
CREATE INDEX IF NOT EXISTS links_group_idx     ON subject_to_group(group_id);
CREATE INDEX IF NOT EXISTS students_group_idx  ON students(group_id);
CREATE INDEX IF NOT EXISTS grades_student_idx  ON grades(student_id);
CREATE INDEX IF NOT EXISTS grades_lesson_idx   ON grades(lesson_id);

PRAGMA user_version = 1;
";
