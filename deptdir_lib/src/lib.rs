//! Library layer for deptdir: site catalog, per-site adapters and the run driver.
//!
//! Wraps the `deptdir_fetch` transport with an on-disk page cache, parses
//! each institution's directory pages into normalized [`Record`]s and writes
//! them as one JSON-lines artifact per page.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod driver;
pub mod email;
pub mod error;
pub mod html;
pub mod name;
pub mod record;
pub mod roles;
pub mod tally;
pub mod writer;

pub use deptdir_fetch;
pub use deptdir_fetch::{Client, ClientConfig, FetchRequest, FetchStats, Method};

pub use adapters::{adapter_for, Adapter, ExtractError, PageContext, PageExtraction};
pub use cache::{CacheOutcome, ExistingPolicy, FetchCache};
pub use config::{ConfigError, Pagination, SiteCatalog, SiteConfig, SourceConfig};
pub use driver::{Driver, PageCounts, PageFailure, RunOptions, RunReport, SiteReport};
pub use error::DeptDirError;
pub use record::{Record, RoleTag};
pub use roles::{RoleMatch, RoleTable};
pub use tally::{RoleCount, Tally};
pub use writer::{read_records, RecordWriter, WriteOutcome};
