//! Markdown content blocks.

use std::collections::BTreeMap;

use pulldown_cmark::{Options, Parser, html};

use super::tag::{NestedTag, passthrough};
use super::template::{BraceTemplate, TemplateEngine};
use super::{Fragment, Render, RenderError};
use crate::fundsl::Context;
use crate::preprocess::{FunctionTable, Markers, Preprocessor};

/// Class of the `<div>` wrapping converted markdown.
const CONTENT_CLASS: &str = "markdown";

/// Convert markdown to HTML with tables, footnotes, strikethrough and
/// heading attributes enabled. Raw HTML passes through.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn wrap(html: String, resources: Vec<String>) -> Result<Fragment, RenderError> {
    let mut div = NestedTag::new("div")
        .attr("class", CONTENT_CLASS)
        .child(passthrough(html));
    div.resources = resources;
    div.render()
}

// ============================================================================
// MarkdownDiv
// ============================================================================

/// Markdown with `{{var}}` substitution, no fun-dsl.
pub struct MarkdownDiv<'a> {
    pub template: String,
    pub vars: BTreeMap<String, String>,
    pub resources: Vec<String>,
    pub engine: &'a dyn TemplateEngine,
}

impl MarkdownDiv<'_> {
    pub fn new(template: impl Into<String>, vars: BTreeMap<String, String>) -> Self {
        Self {
            template: template.into(),
            vars,
            resources: Vec::new(),
            engine: &BraceTemplate,
        }
    }
}

impl Render for MarkdownDiv<'_> {
    fn render(&self) -> Result<Fragment, RenderError> {
        let text = self.engine.render(&self.template, &self.vars);
        wrap(markdown_to_html(&text), self.resources.clone())
    }
}

// ============================================================================
// PreprocMarkdownDiv
// ============================================================================

/// Markdown whose fun-dsl spans are dispatched before conversion.
///
/// Context scalars are substituted into the text before markdown so they
/// are formatted like the surrounding prose. Call results are substituted
/// after, so their markup is never touched by the markdown converter.
pub struct PreprocMarkdownDiv<'a> {
    pub template: String,
    pub context: &'a Context,
    pub functions: &'a FunctionTable<'a>,
    pub markers: Markers,
    pub resources: Vec<String>,
    pub engine: &'a dyn TemplateEngine,
}

impl<'a> PreprocMarkdownDiv<'a> {
    pub fn new(
        template: impl Into<String>,
        context: &'a Context,
        functions: &'a FunctionTable<'a>,
    ) -> Self {
        Self {
            template: template.into(),
            context,
            functions,
            markers: Markers::default(),
            resources: Vec::new(),
            engine: &BraceTemplate,
        }
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }
}

impl Render for PreprocMarkdownDiv<'_> {
    fn render(&self) -> Result<Fragment, RenderError> {
        let processed = Preprocessor::new(self.functions, self.context)
            .with_markers(self.markers.clone())
            .process(&self.template)
            .into_result()?;

        let text = self.engine.render(&processed.text, &self.context.scalar_vars());
        let mut html = markdown_to_html(&text);
        // A call alone in its paragraph replaces the paragraph.
        for segment in &processed.segments {
            let reference = format!("{{{{{}}}}}", segment.placeholder);
            html = html.replace(&format!("<p>{reference}</p>"), &reference);
        }
        let html = self.engine.render(&html, &processed.placeholder_vars());

        let mut resources = processed.resources();
        resources.extend(self.resources.iter().cloned());
        wrap(html, resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fundsl::{CallError, KwArgs};
    use serde_json::json;

    fn functions() -> FunctionTable<'static> {
        let mut table = FunctionTable::new();
        table.register("widget", |args: &KwArgs| {
            let id = args.str("id")?;
            Ok(Fragment::new(format!("<canvas id=\"{id}\"></canvas>")).with_resource("w.js"))
        });
        table.register("broken", |_: &KwArgs| Err(CallError::custom("no")));
        table
    }

    #[test]
    fn test_markdown_to_html_extensions() {
        let html = markdown_to_html("# Title {#top}\n\n| a |\n|---|\n| 1 |\n\n~~old~~");
        assert!(html.contains("<h1 id=\"top\">Title</h1>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_markdown_div_substitutes_before_conversion() {
        let vars = BTreeMap::from([("who".to_owned(), "*you*".to_owned())]);
        let fragment = MarkdownDiv::new("Hello {{who}}", vars).render().unwrap();
        assert!(fragment.markup.starts_with("<div class=\"markdown\">\n"));
        assert!(fragment.markup.contains("<p>Hello <em>you</em></p>"));
        assert!(fragment.resources.is_empty());
    }

    #[test]
    fn test_preproc_div_embeds_call_markup() {
        let (table, ctx) = (functions(), Context::from_json(json!({"n": 5})).unwrap());
        let mut div = PreprocMarkdownDiv::new(
            "Count {{n}}\n\n%$ widget(id='w1') $%\n\nTail %$ widget(id='w2') $%",
            &ctx,
            &table,
        );
        div.resources.push("page.css".into());
        let fragment = div.render().unwrap();

        assert!(fragment.markup.contains("<p>Count 5</p>"));
        assert!(fragment.markup.contains("<canvas id=\"w1\"></canvas>"));
        assert!(!fragment.markup.contains("<p><canvas id=\"w1\">"));
        assert!(fragment.markup.contains("Tail <canvas id=\"w2\"></canvas>"));
        assert!(!fragment.markup.contains("fundsl_"));
        assert_eq!(fragment.resources, vec!["w.js", "w.js", "page.css"]);
    }

    #[test]
    fn test_preproc_div_fails_with_every_error() {
        let (table, ctx) = (functions(), Context::new());
        let div = PreprocMarkdownDiv::new("%$ broken() $% %$ widget() $% %$ gone() $%", &ctx, &table);
        match div.render() {
            Err(RenderError::Preprocess(err)) => assert_eq!(err.errors.len(), 3),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_preproc_div_custom_markers() {
        let (table, ctx) = (functions(), Context::new());
        let fragment = PreprocMarkdownDiv::new("<< widget(id='x') >>", &ctx, &table)
            .with_markers(Markers::new("<<", ">>").unwrap())
            .render()
            .unwrap();
        assert!(fragment.markup.contains("<canvas id=\"x\"></canvas>"));
    }
}
