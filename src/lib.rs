//! Gitcat builds a persistent, queryable catalog out of the three CSV
//! datasets of a social-coding platform -- accounts, repositories and
//! commits.
//!
//! The catalog is a collection of compressed record files and on-disk
//! indexes, all of them accessed through a shared page [Cache].
//! Records are described at runtime by a [format][format::Format]
//! descriptor, which drives parsing, validation, binary serialisation
//! and the on-demand [lazy][lazy::Lazy] reader. Indexes are flat files
//! of fixed-size entries that are sorted with an external merge sort
//! and optionally grouped into an inverted index, see [Indexer].
//!
//! Building a catalog is a one time cost; once the artefacts are
//! persisted under the output directory, subsequent runs load them
//! directly and only pay for the queries they execute.

mod error;

pub mod cache;
pub mod catalog;
pub mod date;
pub mod format;
pub mod indexer;
pub mod lazy;
pub mod query;
pub mod task;
pub mod util;

pub use crate::cache::Cache;
pub use crate::catalog::{Catalog, Config};
pub use crate::date::Date;
pub use crate::error::{Error, Result};
pub use crate::indexer::Indexer;
