//! File-facing side of the crate.
//!
//! - [`detect`]: is a file CHARISMA-like, and directory/glob scans
//! - [`load`]: text → points or grid ([`crate::CharismaCodec::load`])
//! - [`dump`]: points or grid → reduced-layout text ([`crate::CharismaCodec::dump`])
//! - [`table`]: the whitespace-delimited reader/writer underneath both
//! - [`observability`]: observer hooks for load/dump/recovery outcomes

pub mod detect;
pub mod dump;
pub mod load;
pub mod observability;
pub mod table;

pub use detect::{
    detect_spec, find_charisma_files, glob_charisma_files, is_charisma_like, DetectOptions,
    BAD_EXTENSIONS,
};
pub use dump::{DumpOptions, NAME_PLACEHOLDER};
pub use load::LoadOptions;
pub use observability::{
    CharismaObserver, CompositeObserver, FileObserver, LogObserver, Operation, OperationContext,
    OperationStats, Severity,
};
