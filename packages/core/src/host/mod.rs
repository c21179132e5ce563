//! Host registry module
//!
//! Provides the persistent registry of known hosts:
//! - Host record schema and discovery tags
//! - Validation of records before they are persisted
//! - Patch-style merge of probe results into existing records
//! - Registry document storage, import and export

mod error;
mod merge;
mod schema;
mod storage;
mod validation;

// Public exports
pub use error::HostError;
pub use merge::merge;
pub use schema::{HostFilter, HostRecord, HostTags, now_millis, short_name};
pub use storage::{MergeSummary, Registry, read_hosts, write_hosts};
pub use validation::{
    ValidationError, is_ip_literal, is_valid_hostname, validate_host, validate_host_at,
    validate_hosts,
};
