//! Logical and physical addressing of tree nodes.
//!
//! A logical path joins node names from the root, `main/d1/p1`. A physical
//! path joins the on-disk names the same way, `main/d1/p1.html`, with a
//! document standing for its index page.

use super::DocError;
use super::tree::{DocumentTree, NodeId};

/// Path separator of logical and physical paths.
pub const SEPARATOR: char = '/';

/// Relative reference from the file at `from` to the file at `to`.
///
/// Both are `/`-separated paths from a shared origin. The common prefix is
/// matched segment-wise against the directory containing `from`; one `..`
/// is emitted per remaining directory of `from`, followed by the rest of
/// `to`. Paths with no common prefix are returned unchanged, and a path
/// relative to itself is empty.
///
/// ```text
/// relative_path("main/d1/p1", "main/p1")       == "../p1"
/// relative_path("main/d1/p1", "main/d1/p2/p2") == "p2/p2"
/// ```
pub fn relative_path(from: &str, to: &str) -> String {
    if from == to {
        return String::new();
    }
    let from: Vec<&str> = from.split(SEPARATOR).collect();
    let to_segments: Vec<&str> = to.split(SEPARATOR).collect();
    let from_dir = &from[..from.len() - 1];

    let common = from_dir
        .iter()
        .zip(&to_segments)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return to.to_owned();
    }

    let ups = from_dir.len() - common;
    let mut parts: Vec<&str> = vec![".."; ups];
    parts.extend(&to_segments[common..]);
    parts.join("/")
}

impl DocumentTree {
    /// Resolve a logical path starting at `root`, whose name must be the
    /// first segment.
    pub fn element_by_path(&self, root: NodeId, path: &str) -> Result<NodeId, DocError> {
        let not_found = || DocError::PathNotFound(path.to_owned());
        let mut segments = path.split(SEPARATOR);

        let root_node = self.node(root)?;
        if segments.next() != Some(root_node.name()) {
            return Err(not_found());
        }

        let mut current = root;
        for segment in segments {
            current = self
                .node(current)?
                .children()
                .iter()
                .copied()
                .find(|&child| self.get(child).is_some_and(|node| node.name() == segment))
                .ok_or_else(not_found)?;
        }
        Ok(current)
    }

    /// `name/name/...` from the root down to `id`.
    pub fn logical_path(&self, id: NodeId) -> Result<String, DocError> {
        self.join_path(id, |tree, node| Ok(tree.node(node)?.name().to_owned()))
    }

    /// On-disk path from the root directory down to `id`.
    ///
    /// A document resolves to its index page, so links to a document open
    /// its landing page.
    pub fn physical_path(&self, id: NodeId) -> Result<String, DocError> {
        let target = match self.node(id)?.as_page() {
            Some(_) => id,
            None => self.index_of(id).ok_or_else(|| DocError::NotAnIndex {
                document: self.node(id).map(|n| n.name().to_owned()).unwrap_or_default(),
                found: 0,
            })?,
        };
        self.join_path(target, |tree, node| {
            Ok(tree.node(node)?.physical_name().to_owned())
        })
    }

    /// Relative href from the page `from` to the node at logical path `to`,
    /// resolved within the tree that contains `from`.
    pub fn link_target(&self, from: NodeId, to: &str) -> Result<String, DocError> {
        let root = self.root_of(from)?;
        let target = self.element_by_path(root, to)?;
        Ok(relative_path(
            &self.physical_path(from)?,
            &self.physical_path(target)?,
        ))
    }

    fn join_path(
        &self,
        id: NodeId,
        segment: impl Fn(&Self, NodeId) -> Result<String, DocError>,
    ) -> Result<String, DocError> {
        let segments = self
            .ancestry(id)?
            .into_iter()
            .map(|node| segment(self, node))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(segments.join("/"))
    }
}
