//! The block graph: typed blocks connected into a forest, owned by a
//! [`Workspace`] with undo/redo history.

mod block;
pub use block::{Block, BlockId, Check, Input, InputKind, Slot};

pub mod catalog;
pub use catalog::{BlockCatalog, BlockShape, FieldKind, InputSpec, ItemSpec, MAX_ITEMS};

mod history;

mod traversal;
pub use traversal::Descendants;

mod workspace;
pub use workspace::Workspace;

pub mod document;
pub use document::WorkspaceDocument;

#[cfg(test)]
mod tests;
