//! Document tree: committed state, transactions and the editor
//!
//! ```text
//! Editor ──update()──▶ Transaction (overlay over EditorState)
//!    │                        │
//!    │◀──────── commit ───────┘
//!    └──snapshot()──▶ EditorState (immutable, shareable across threads)
//! ```

mod editor;
mod state;
mod transaction;

pub use editor::Editor;
pub use state::{Descendants, EditorState, TreeStats};
pub use transaction::{Savepoint, Transaction};
