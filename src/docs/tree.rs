//! Arena of pages and documents.
//!
//! Nodes are added unattached and get their parent exactly once, when the
//! document that contains them is added. Parent links are plain ids used
//! only for path queries; the arena owns every node.
//!
//! ```text
//! main/            Document
//! ├── index.html   Page (index)
//! ├── p1.html      Page
//! └── d1/          Document
//!     ├── index.html
//!     └── p1.html
//! ```

use std::collections::HashSet;

use super::DocError;
use crate::fundsl::Context;
use crate::utils::slug::{is_valid_name, sanitize_name};

/// Handle of a node inside one [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Logical name of the index page a document links resolve to.
pub const INDEX_NAME: &str = "index";

// ============================================================================
// Nodes
// ============================================================================

/// A markdown page with embedded fun-dsl calls.
#[derive(Debug, Clone)]
pub struct Page {
    pub name: String,
    /// File name on disk, `<name>.html` unless set explicitly.
    pub physical_name: String,
    pub is_index: bool,
    pub template: String,
    pub context: Context,
    /// `<title>` text; the logical name when unset.
    pub title: Option<String>,
    /// Extra resources placed in the page head.
    pub resources: Vec<String>,
}

impl Page {
    /// A page named `index` is the index of its document by default.
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self, DocError> {
        let name = checked_name(name.into())?;
        Ok(Self {
            physical_name: format!("{}.html", sanitize_name(&name)),
            is_index: name == INDEX_NAME,
            template: template.into(),
            context: Context::new(),
            title: None,
            resources: Vec::new(),
            name,
        })
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn as_index(mut self, is_index: bool) -> Self {
        self.is_index = is_index;
        self
    }

    pub fn physical_name(mut self, physical_name: impl Into<String>) -> Result<Self, DocError> {
        self.physical_name = checked_name(physical_name.into())?;
        Ok(self)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.push(resource.into());
        self
    }
}

/// A directory of pages and nested documents.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    /// Directory name on disk, the sanitised logical name unless set.
    pub physical_name: String,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Result<Self, DocError> {
        let name = checked_name(name.into())?;
        Ok(Self {
            physical_name: sanitize_name(&name),
            name,
        })
    }

    pub fn physical_name(mut self, physical_name: impl Into<String>) -> Result<Self, DocError> {
        self.physical_name = checked_name(physical_name.into())?;
        Ok(self)
    }
}

fn checked_name(name: String) -> Result<String, DocError> {
    if is_valid_name(&name) && !sanitize_name(&name).is_empty() {
        Ok(name)
    } else {
        Err(DocError::InvalidName(name))
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Page(Page),
    Document(Document),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Page(page) => &page.name,
            NodeKind::Document(doc) => &doc.name,
        }
    }

    pub fn physical_name(&self) -> &str {
        match &self.kind {
            NodeKind::Page(page) => &page.physical_name,
            NodeKind::Document(doc) => &doc.physical_name,
        }
    }

    /// Documents are never the index of their parent.
    pub fn is_index(&self) -> bool {
        matches!(&self.kind, NodeKind::Page(page) if page.is_index)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_page(&self) -> Option<&Page> {
        match &self.kind {
            NodeKind::Page(page) => Some(page),
            NodeKind::Document(_) => None,
        }
    }
}

// ============================================================================
// Tree
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DocumentTree {
    nodes: Vec<Node>,
}

impl DocumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, DocError> {
        self.get(id).ok_or(DocError::UnknownNode(id.0))
    }

    /// Store an unattached page.
    pub fn add_page(&mut self, page: Page) -> NodeId {
        self.push(NodeKind::Page(page), Vec::new())
    }

    /// Store a document and attach `children` to it.
    ///
    /// Fails without touching the tree if a child id is unknown, a child
    /// already has a parent or is listed twice, two children share a
    /// logical or on-disk name, or the children do not contain exactly
    /// one index.
    pub fn add_document(
        &mut self,
        document: Document,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<NodeId, DocError> {
        let children: Vec<NodeId> = children.into_iter().collect();

        let mut seen_ids = HashSet::with_capacity(children.len());
        let mut seen_names = HashSet::with_capacity(children.len());
        let mut seen_files = HashSet::with_capacity(children.len());
        let mut indexes = 0;
        for &child in &children {
            let node = self.node(child)?;
            if node.parent.is_some() || !seen_ids.insert(child) {
                return Err(DocError::AlreadyParented(node.name().to_owned()));
            }
            if !seen_names.insert(node.name()) {
                return Err(DocError::DuplicateNodeName {
                    document: document.name,
                    name: node.name().to_owned(),
                });
            }
            if !seen_files.insert(node.physical_name()) {
                return Err(DocError::DuplicatePhysicalName {
                    document: document.name,
                    name: node.physical_name().to_owned(),
                });
            }
            indexes += usize::from(node.is_index());
        }
        if indexes != 1 {
            return Err(DocError::NotAnIndex {
                document: document.name,
                found: indexes,
            });
        }

        let id = self.push(NodeKind::Document(document), children);
        for i in 0..self.nodes[id.0].children.len() {
            let child = self.nodes[id.0].children[i];
            self.nodes[child.0].parent = Some(id);
        }
        Ok(id)
    }

    /// Copy the subtree at `id` into fresh, unattached nodes.
    ///
    /// Lets the same content appear at a second location while every node
    /// keeps a single parent.
    pub fn deep_copy(&mut self, id: NodeId) -> Result<NodeId, DocError> {
        let node = self.node(id)?.clone();
        let children = node
            .children
            .iter()
            .map(|&child| self.deep_copy(child))
            .collect::<Result<Vec<_>, _>>()?;
        let copy = self.push(node.kind, children);
        for i in 0..self.nodes[copy.0].children.len() {
            let child = self.nodes[copy.0].children[i];
            self.nodes[child.0].parent = Some(copy);
        }
        Ok(copy)
    }

    /// Topmost ancestor of `id`, `id` itself when unattached.
    pub fn root_of(&self, id: NodeId) -> Result<NodeId, DocError> {
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Index child of a document.
    pub fn index_of(&self, document: NodeId) -> Option<NodeId> {
        let node = self.get(document)?;
        node.children
            .iter()
            .copied()
            .find(|&child| self.get(child).is_some_and(Node::is_index))
    }

    /// Ids from the root down to `id`, inclusive.
    pub(crate) fn ancestry(&self, id: NodeId) -> Result<Vec<NodeId>, DocError> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        Ok(chain)
    }

    fn push(&mut self, kind: NodeKind, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children,
        });
        id
    }
}
