//! loam - in-memory version control core
//!
//! a content-addressed object database with working-tree semantics,
//! branch/merge history, and durable snapshots, built for programmatic
//! agents that synthesize source trees, compile them through an external
//! type-checker, and execute the output in an isolated container.
//!
//! # Core concepts
//!
//! - **Blob**: content-addressed file payload
//! - **Tree**: directory node with name-sorted entries
//! - **Commit**: a tree plus parents, author, timestamp, and message
//! - **Ref / HEAD**: named pointers into the commit graph; HEAD is a
//!   symbolic ref or a detached hash
//! - **Working tree**: the mutable live file set the mutation API edits
//!
//! # Hash format
//!
//! object hash = SHA-1 of `"<type> <payload-len>\0" || payload`, where the
//! payload formats are fixed per object kind. hashes are stable across
//! runs and processes.
//!
//! # Example usage
//!
//! ```no_run
//! use loam::{ops, Repo};
//!
//! # async fn example() -> loam::Result<()> {
//! let mut repo = Repo::new("/project");
//!
//! repo.write("src/main.ts", "export const answer = 42;");
//! let hash = ops::commit(&mut repo, "initial", Default::default()).await?;
//!
//! ops::create_branch(&mut repo, "feat")?;
//! ops::checkout(&mut repo, "feat").await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod hash;
mod ignore;
mod refs;
mod repo;
mod store;
mod worktree;

pub mod compiler;
pub mod ops;
pub mod sandbox;
pub mod types;

pub use compiler::{CompilerConfig, CompilerHost, RepoHost};
pub use error::{Error, IoResultExt, Result};
pub use hash::{hash_bytes, Hash};
pub use ignore::IgnoreFilter;
pub use refs::{Head, RefTable, HEADS_PREFIX, MAIN};
pub use repo::{ReaddirOptions, Repo};
pub use sandbox::{RunOutput, SandboxConfig};
pub use store::{read_blob, read_commit, read_tree, MemoryStore, ObjectStore};
pub use worktree::{FileContext, FileEntry, Language, WorkTree};
