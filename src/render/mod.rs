//! Resource-propagating render tree.
//!
//! Every renderable produces a [`Fragment`]: its markup plus the external
//! resources (stylesheets, scripts, ...) the markup needs. Composites union
//! the resources of their children, so a plot deep inside a page body can
//! declare its script and still end up in the page head.
//!
//! ```text
//! HtmlPage
//! └── NestedTag <body>
//!     └── PreprocMarkdownDiv      resources: [chart.js]
//!         └── line(...) fragment  resources: [chart.js]
//! ```

pub mod markdown;
pub mod page;
pub mod sink;
pub mod tag;
pub mod template;

pub use markdown::{MarkdownDiv, PreprocMarkdownDiv, markdown_to_html};
pub use page::HtmlPage;
pub use sink::FileSink;
pub use tag::{NestedTag, Tag};
pub use template::{BraceTemplate, TemplateEngine};

use std::path::PathBuf;
use thiserror::Error;

use crate::preprocess::PreprocessError;

/// Rendered markup with the resources it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub markup: String,
    /// Resource references in declaration order, duplicates allowed.
    pub resources: Vec<String>,
}

impl Fragment {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            resources: Vec::new(),
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.push(resource.into());
        self
    }
}

/// Anything that renders to a [`Fragment`].
pub trait Render {
    fn render(&self) -> Result<Fragment, RenderError>;
}

impl Render for Fragment {
    fn render(&self) -> Result<Fragment, RenderError> {
        Ok(self.clone())
    }
}

impl<R: Render + ?Sized> Render for Box<R> {
    fn render(&self) -> Result<Fragment, RenderError> {
        (**self).render()
    }
}

impl<R: Render + ?Sized> Render for &R {
    fn render(&self) -> Result<Fragment, RenderError> {
        (**self).render()
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error("IO error when writing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

// ============================================================================
// Resources
// ============================================================================

/// How a resource is materialised in the document head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResourceKind {
    Stylesheet,
    Script,
    /// Anything else is emitted as-is.
    Passthrough,
}

impl ResourceKind {
    /// Classify by extension, ignoring any query string or fragment.
    pub fn of(resource: &str) -> Self {
        let path = resource
            .split(['?', '#'])
            .next()
            .unwrap_or(resource)
            .to_ascii_lowercase();
        if path.ends_with(".css") {
            Self::Stylesheet
        } else if path.ends_with(".js") {
            Self::Script
        } else {
            Self::Passthrough
        }
    }

    /// Stylesheets and scripts are sorted ahead of passthrough entries.
    pub fn is_link(self) -> bool {
        !matches!(self, Self::Passthrough)
    }
}
