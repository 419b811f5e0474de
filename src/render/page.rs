//! Full HTML document with a head synthesised from body resources.

use super::tag::{self, NestedTag};
use super::{Fragment, Render, RenderError, ResourceKind};

/// Document language when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// `<!DOCTYPE html>` page around a body.
///
/// The head holds one element per distinct body resource, followed by the
/// authored `head_children`:
///
/// ```text
/// <head>
///   <link rel="stylesheet" href="a.css"/>   resources, links first
///   <script src="chart.js" defer></script>
///   <meta name="x">                          passthrough resources
///   <title>...</title>                       authored children
/// </head>
/// ```
pub struct HtmlPage<'a> {
    pub body: Box<dyn Render + 'a>,
    pub head_children: Vec<Box<dyn Render + 'a>>,
    pub language: String,
}

impl<'a> HtmlPage<'a> {
    pub fn new(body: impl Render + 'a) -> Self {
        Self {
            body: Box::new(body),
            head_children: Vec::new(),
            language: DEFAULT_LANGUAGE.to_owned(),
        }
    }

    pub fn head_child(mut self, child: impl Render + 'a) -> Self {
        self.head_children.push(Box::new(child));
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl Render for HtmlPage<'_> {
    fn render(&self) -> Result<Fragment, RenderError> {
        let body = self.body.render()?;
        let resources = hoist(&body.resources);

        let mut head = NestedTag::new("head");
        for resource in &resources {
            head = head.child(resource_element(resource));
        }
        for child in &self.head_children {
            head = head.child(child.as_ref());
        }
        let head = head.render()?;

        let mut markup = String::with_capacity(head.markup.len() + body.markup.len() + 64);
        markup.push_str("<!DOCTYPE html>\n");
        markup.push_str(&tag::Tag::new("html").attr("lang", self.language.as_str()).open());
        markup.push('\n');
        markup.push_str(&head.markup);
        markup.push('\n');
        markup.push_str(&body.markup);
        markup.push_str("\n</html>\n");

        Ok(Fragment {
            markup,
            resources: resources.into_iter().chain(head.resources).collect(),
        })
    }
}

/// Deduplicate resources (first occurrence wins) and stable-sort
/// stylesheets and scripts ahead of passthrough entries.
pub fn hoist(resources: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(resources.len());
    for resource in resources {
        if !unique.contains(resource) {
            unique.push(resource.clone());
        }
    }
    unique.sort_by_key(|r| !ResourceKind::of(r).is_link());
    unique
}

fn resource_element(resource: &str) -> tag::Tag {
    match ResourceKind::of(resource) {
        ResourceKind::Stylesheet => tag::stylesheet(resource),
        ResourceKind::Script => tag::script(resource),
        ResourceKind::Passthrough => tag::passthrough(resource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tag::{paragraph, title};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hoist_dedups_and_orders() {
        let hoisted = hoist(&strings(&[
            "<meta name=\"a\">",
            "chart.js",
            "style.css",
            "chart.js",
            "<base href=\"/\">",
            "style.css",
        ]));
        assert_eq!(
            hoisted,
            strings(&["chart.js", "style.css", "<meta name=\"a\">", "<base href=\"/\">"])
        );
    }

    #[test]
    fn test_page_head_contains_each_resource_once() {
        let body = NestedTag::new("body")
            .child(paragraph("x").resource("chart.js"))
            .child(paragraph("y").resource("chart.js"))
            .child(paragraph("z").resource("a.css"));
        let page = HtmlPage::new(body).head_child(title("T")).language("de");
        let html = page.render().unwrap().markup;

        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"de\">\n<head>\n"));
        assert_eq!(html.matches("chart.js").count(), 1);
        assert!(html.contains("  <script src=\"chart.js\" defer></script>\n"));
        assert!(html.contains("  <link rel=\"stylesheet\" href=\"a.css\"/>\n"));
        let script = html.find("<script").unwrap();
        let link = html.find("<link").unwrap();
        let title = html.find("<title>").unwrap();
        assert!(script < link && link < title);
        assert!(html.contains("</head>\n<body>\n"));
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn test_page_resources_are_hoisted_set() {
        let body = paragraph("x").resource("b.js").resource("b.js");
        let fragment = HtmlPage::new(body).render().unwrap();
        assert_eq!(fragment.resources, strings(&["b.js"]));
    }

    #[test]
    fn test_page_without_resources() {
        let html = HtmlPage::new(NestedTag::new("body")).render().unwrap().markup;
        assert_eq!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n</head>\n<body>\n</body>\n</html>\n"
        );
    }
}
