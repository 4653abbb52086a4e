mod commit;
mod object;
mod tree;

pub use commit::Commit;
pub use object::{Blob, Object, ObjectKind};
pub use tree::{EntryKind, Tree, TreeEntry};
