//! `[build]` section configuration.
//!
//! Paths, fun-dsl markers, minification and head elements shared by every
//! page.

use super::defaults;
use crate::render::tag::{self, Tag};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in docweave.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"      # Markdown templates
/// output = "public"        # Rendered pages
/// context = "data.json"    # Variables visible to every page
/// minify = true
///
/// [build.markers]
/// start = "{%"
/// end = "%}"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Template source directory; its tree becomes the document tree.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Static files copied verbatim into the output directory.
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// JSON object whose keys become fun-dsl variables on every page.
    #[serde(default = "defaults::build::context")]
    #[educe(Default = defaults::build::context())]
    pub context: Option<PathBuf>,

    /// Minify HTML output.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Remove the output directory before building.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Delimiters of fun-dsl spans.
    #[serde(default)]
    pub markers: MarkersConfig,

    /// Custom `<head>` elements.
    #[serde(default)]
    pub head: HeadConfig,
}

// ============================================================================
// Sub-configurations
// ============================================================================

/// `[build.markers]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct MarkersConfig {
    #[serde(default = "defaults::build::markers::start")]
    #[educe(Default = defaults::build::markers::start())]
    pub start: String,

    #[serde(default = "defaults::build::markers::end")]
    #[educe(Default = defaults::build::markers::end())]
    pub end: String,
}

/// `[build.head]` section for head elements added to every page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadConfig {
    /// Stylesheet URLs, emitted as `<link rel="stylesheet">`.
    #[serde(default)]
    pub styles: Vec<String>,

    /// Script URLs, emitted as deferred `<script>`.
    #[serde(default)]
    pub scripts: Vec<String>,

    /// Raw HTML elements to insert into head (e.g., `<meta name="darkreader-lock">`)
    #[serde(default)]
    pub elements: Vec<String>,
}

impl HeadConfig {
    /// Head elements in config order: styles, scripts, then raw elements.
    ///
    /// Entries keep the kind of their list whatever their URL looks like.
    pub fn tags(&self) -> Vec<Tag> {
        let styles = self.styles.iter().map(|href| tag::stylesheet(href));
        let scripts = self.scripts.iter().map(|src| tag::script(src));
        let elements = self.elements.iter().map(|raw| tag::passthrough(raw.as_str()));
        styles.chain(scripts).chain(elements).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
