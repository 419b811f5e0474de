//! Multi-page document hierarchy.
//!
//! A [`DocumentTree`] holds [`Page`]s and [`Document`]s, resolves logical
//! paths between them and renders the whole hierarchy to a directory:
//! one directory per document, one `<name>.html` per page.

mod error;
pub mod path;
pub mod render;
pub mod tree;

pub use error::DocError;
pub use path::relative_path;
pub use render::RenderOptions;
pub use tree::{Document, DocumentTree, INDEX_NAME, Node, NodeId, NodeKind, Page};
