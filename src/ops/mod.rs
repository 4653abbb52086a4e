//! high-level operations on the version engine

mod branch;
mod checkout;
mod commit;
mod fsck;
mod log;
mod merge;
mod snapshot;
mod status;
mod trees;

pub use branch::{create_branch, delete_branch};
pub use checkout::checkout;
pub use commit::{commit, CommitOptions};
pub use fsck::{fsck, FsckReport, MissingObject};
pub use log::{log, LogEntry};
pub use merge::{merge, MergeOutcome};
pub use snapshot::{database_dump, load_snapshot, save_snapshot, DatabaseDump};
pub use status::{status, Status};
pub use trees::{build_tree, flatten_tree};
