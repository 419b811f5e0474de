//! Writing a document tree to disk.
//!
//! The output directory is passed down explicitly; the process working
//! directory is never changed, so independent trees can be rendered from
//! the same process.

use std::fs;
use std::path::Path;

use super::DocError;
use super::tree::{DocumentTree, NodeId, NodeKind, Page};
use crate::fundsl::{CallError, KwArgs};
use crate::preprocess::{FunctionTable, Markers};
use crate::render::tag::{self, NestedTag, Tag};
use crate::render::{FileSink, Fragment, HtmlPage, PreprocMarkdownDiv, Render, RenderError};

/// Settings shared by every page of one render pass.
pub struct RenderOptions<'a> {
    /// Functions visible to every page; `link` is layered on top per page.
    pub functions: &'a FunctionTable<'a>,
    pub markers: Markers,
    pub minify: bool,
    pub language: String,
    /// Appended to each page title.
    pub site_title: Option<String>,
    /// Elements added to every page head, after the hoisted resources.
    pub head: Vec<Tag>,
}

impl<'a> RenderOptions<'a> {
    pub fn new(functions: &'a FunctionTable<'a>) -> Self {
        Self {
            functions,
            markers: Markers::default(),
            minify: false,
            language: crate::render::page::DEFAULT_LANGUAGE.to_owned(),
            site_title: None,
            head: Vec::new(),
        }
    }
}

impl DocumentTree {
    /// Render `id` under `base`: a document becomes `base/<dir>/`, a page
    /// becomes `base/<file>`. Returns the number of pages written.
    pub fn render(&self, id: NodeId, base: &Path, options: &RenderOptions) -> Result<usize, DocError> {
        match &self.node(id)?.kind {
            NodeKind::Page(page) => {
                self.render_page(id, page, base, options)?;
                Ok(1)
            }
            NodeKind::Document(doc) => {
                let dir = base.join(&doc.physical_name);
                fs::create_dir_all(&dir)
                    .map_err(|e| DocError::Render(dir.clone(), RenderError::Io(dir.clone(), e)))?;
                self.render_into(id, &dir, options)
            }
        }
    }

    /// Render the children of document `id` directly into `dir`, index
    /// first. Used for a site root whose directory is the output directory.
    pub fn render_into(&self, id: NodeId, dir: &Path, options: &RenderOptions) -> Result<usize, DocError> {
        let node = self.node(id)?;
        let index = self.index_of(id);
        let others = node.children().iter().copied().filter(|&c| Some(c) != index);

        let mut pages = 0;
        for child in index.into_iter().chain(others) {
            pages += self.render(child, dir, options)?;
        }
        Ok(pages)
    }

    fn render_page(&self, id: NodeId, page: &Page, dir: &Path, options: &RenderOptions) -> Result<(), DocError> {
        let path = dir.join(&page.physical_name);

        let mut functions = FunctionTable::layered(options.functions);
        functions.register("link", |args: &KwArgs| self.link(id, args));

        let mut content = PreprocMarkdownDiv::new(page.template.as_str(), &page.context, &functions)
            .with_markers(options.markers.clone());
        content.resources = page.resources.clone();

        let title = match (&page.title, &options.site_title) {
            (Some(title), Some(site)) => format!("{title} | {site}"),
            (None, Some(site)) => format!("{} | {site}", page.name),
            (Some(title), None) => title.clone(),
            (None, None) => page.name.clone(),
        };
        let mut html = HtmlPage::new(NestedTag::new("body").child(content))
            .language(options.language.as_str())
            .head_child(tag::meta([("charset", "utf-8")]))
            .head_child(tag::title(&title));
        for element in &options.head {
            html = html.head_child(element);
        }

        FileSink::new(html, &path)
            .minify(options.minify)
            .write()
            .map_err(|e| DocError::Render(path, e))?;
        Ok(())
    }

    /// `link(to, text?)`: anchor to another node of the same tree.
    fn link(&self, from: NodeId, args: &KwArgs) -> Result<Fragment, CallError> {
        let to = args.str("to")?;
        let href = self
            .link_target(from, to)
            .map_err(|e| CallError::Host(Box::new(e)))?;
        let text = match args.opt_str("text")? {
            Some(text) => text.to_owned(),
            None => self.link_text(to, from),
        };
        Tag::new("a")
            .attr("href", href)
            .text(&text)
            .render()
            .map_err(|e| CallError::Host(Box::new(e)))
    }

    /// Target title, else its logical name.
    fn link_text(&self, to: &str, from: NodeId) -> String {
        self.root_of(from)
            .and_then(|root| self.element_by_path(root, to))
            .ok()
            .and_then(|target| {
                let node = self.get(target)?;
                let page = match node.as_page() {
                    Some(page) => page,
                    None => self.get(self.index_of(target)?)?.as_page()?,
                };
                page.title.clone().or_else(|| Some(node.name().to_owned()))
            })
            .unwrap_or_else(|| to.to_owned())
    }
}
