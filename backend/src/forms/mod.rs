//! Form intake: bracket-key tokenizing, nested-structure parsing, file
//! storage and field validation. Everything here is request-scoped and free
//! of shared mutable state; the only side effect is writing accepted uploads
//! to disk.

pub mod files;
pub mod key;
pub mod multipart;
pub mod parser;
pub mod validate;
