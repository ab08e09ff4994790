//! Core types and trait definitions for the gradebook records store.
//!
//! This crate is deliberately free of database and I/O dependencies. Storage
//! backends implement [`store::RecordsStore`]; everything else (metrics, the
//! grade sheet, import workflows) is written against that trait.

// Native `async fn` in traits; the trait spells out `Send` futures itself.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod grade;
pub mod group;
pub mod ids;
pub mod import;
pub mod metrics;
pub mod sheet;
pub mod store;
pub mod subject;

pub use error::{Error, ErrorKind, Result, StoreError};
pub use grade::{Grade, GradeValue, NewGrade};
pub use group::{Group, NewGroup, NewStudent, Student};
pub use ids::{GradeId, GroupId, LessonId, LinkId, StudentId, SubjectId};
pub use subject::{Lesson, NewLesson, NewLink, NewSubject, Subject, SubjectGroupLink};
