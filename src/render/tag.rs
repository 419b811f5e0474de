//! Leaf and composite HTML elements.
//!
//! [`Tag`] renders one element around already-rendered content.
//! [`NestedTag`] renders its children first and places each on its own
//! indented line, collecting their resources ahead of its own.

use quick_xml::escape::escape;

use super::{Fragment, Render, RenderError};

/// Indentation unit of nested children.
const INDENT: &str = "  ";

// ============================================================================
// Attributes
// ============================================================================

/// Ordered `name="value"` pairs. An empty value renders as a bare name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    fn write(&self, out: &mut String) {
        for (name, value) in &self.0 {
            out.push(' ');
            out.push_str(name);
            if !value.is_empty() {
                out.push_str("=\"");
                out.push_str(&escape(value.as_str()));
                out.push('"');
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn open_tag(name: &str, attrs: &Attrs) -> String {
    let mut out = format!("<{name}");
    attrs.write(&mut out);
    out
}

// ============================================================================
// Tag
// ============================================================================

/// Single element around literal markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// Element name; empty means the content is emitted bare.
    pub name: String,
    pub attrs: Attrs,
    /// Markup placed between the tags, not escaped.
    pub content: String,
    /// Render as `<name attrs/>`.
    pub void: bool,
    pub resources: Vec<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(name, value);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Escaped text content.
    pub fn text(self, text: &str) -> Self {
        let text = escape(text).into_owned();
        self.content(text)
    }

    pub fn void(mut self) -> Self {
        self.void = true;
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.push(resource.into());
        self
    }

    /// Opening tag alone, `<name attrs>`.
    pub fn open(&self) -> String {
        let mut out = open_tag(&self.name, &self.attrs);
        out.push('>');
        out
    }

    fn markup(&self) -> String {
        if self.name.is_empty() {
            return self.content.clone();
        }
        let mut out = open_tag(&self.name, &self.attrs);
        if self.void {
            out.push_str("/>");
        } else {
            out.push('>');
            out.push_str(&self.content);
            out.push_str("</");
            out.push_str(&self.name);
            out.push('>');
        }
        out
    }
}

impl Render for Tag {
    fn render(&self) -> Result<Fragment, RenderError> {
        Ok(Fragment {
            markup: self.markup(),
            resources: self.resources.clone(),
        })
    }
}

// ============================================================================
// NestedTag
// ============================================================================

/// Element whose content is a list of renderable children.
#[derive(Default)]
pub struct NestedTag<'a> {
    pub name: String,
    pub attrs: Attrs,
    pub children: Vec<Box<dyn Render + 'a>>,
    pub resources: Vec<String>,
}

impl<'a> NestedTag<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(name, value);
        self
    }

    pub fn child(mut self, child: impl Render + 'a) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Box<dyn Render + 'a>>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.push(resource.into());
        self
    }
}

impl Render for NestedTag<'_> {
    fn render(&self) -> Result<Fragment, RenderError> {
        let mut markup = open_tag(&self.name, &self.attrs);
        markup.push_str(">\n");
        let mut resources = Vec::new();

        for child in &self.children {
            let fragment = child.render()?;
            indent_into(&mut markup, &fragment.markup);
            resources.extend(fragment.resources);
        }

        markup.push_str("</");
        markup.push_str(&self.name);
        markup.push('>');
        resources.extend(self.resources.iter().cloned());
        Ok(Fragment { markup, resources })
    }
}

/// Append `markup` indented one level, each line newline-terminated.
///
/// Lines inside a `<pre>` block are copied untouched so preformatted text
/// keeps its exact whitespace.
fn indent_into(out: &mut String, markup: &str) {
    let mut in_pre = false;
    for line in markup.lines() {
        if !in_pre && !line.is_empty() {
            out.push_str(INDENT);
        }
        out.push_str(line);
        out.push('\n');
        in_pre = pre_state_after(line, in_pre);
    }
}

fn pre_state_after(line: &str, in_pre: bool) -> bool {
    let open = line
        .match_indices("<pre")
        .filter(|(i, _)| {
            line[i + 4..]
                .chars()
                .next()
                .is_some_and(|c| c == '>' || c.is_whitespace())
        })
        .map(|(i, _)| i)
        .last();
    let close = line.rfind("</pre>");
    match (open, close) {
        (Some(o), Some(c)) => o > c,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (None, None) => in_pre,
    }
}

// ============================================================================
// Element helpers
// ============================================================================

pub fn head<'a>(children: impl IntoIterator<Item = Box<dyn Render + 'a>>) -> NestedTag<'a> {
    NestedTag::new("head").children(children)
}

pub fn body<'a>(children: impl IntoIterator<Item = Box<dyn Render + 'a>>) -> NestedTag<'a> {
    NestedTag::new("body").children(children)
}

pub fn div<'a>(children: impl IntoIterator<Item = Box<dyn Render + 'a>>) -> NestedTag<'a> {
    NestedTag::new("div").children(children)
}

pub fn meta<'k>(attrs: impl IntoIterator<Item = (&'k str, &'k str)>) -> Tag {
    Tag {
        name: "meta".into(),
        attrs: attrs.into_iter().collect(),
        void: true,
        ..Default::default()
    }
}

pub fn stylesheet(href: &str) -> Tag {
    Tag::new("link")
        .attr("rel", "stylesheet")
        .attr("href", href)
        .void()
}

/// Deferred external script.
pub fn script(src: &str) -> Tag {
    Tag::new("script").attr("src", src).attr("defer", "")
}

pub fn title(text: &str) -> Tag {
    Tag::new("title").text(text)
}

pub fn paragraph(text: &str) -> Tag {
    Tag::new("p").text(text)
}

/// Raw markup without an enclosing element.
pub fn passthrough(markup: impl Into<String>) -> Tag {
    Tag::new("").content(markup)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup(render: &impl Render) -> String {
        render.render().unwrap().markup
    }

    // ------------------------------------------------------------------------
    // Tag
    // ------------------------------------------------------------------------

    #[test]
    fn test_tag_with_content() {
        let tag = Tag::new("a").attr("href", "x.html").content("<b>go</b>");
        assert_eq!(markup(&tag), "<a href=\"x.html\"><b>go</b></a>");
    }

    #[test]
    fn test_void_tag() {
        assert_eq!(
            markup(&meta([("charset", "utf-8")])),
            "<meta charset=\"utf-8\"/>"
        );
        assert_eq!(
            markup(&stylesheet("s.css")),
            "<link rel=\"stylesheet\" href=\"s.css\"/>"
        );
    }

    #[test]
    fn test_bare_attribute_and_escaping() {
        assert_eq!(
            markup(&script("a.js?x=1&y=2")),
            "<script src=\"a.js?x=1&amp;y=2\" defer></script>"
        );
        assert_eq!(markup(&title("A & B")), "<title>A &amp; B</title>");
        assert_eq!(markup(&paragraph("<x>")), "<p>&lt;x&gt;</p>");
    }

    #[test]
    fn test_passthrough_emits_content_only() {
        assert_eq!(markup(&passthrough("<hr>")), "<hr>");
    }

    #[test]
    fn test_tag_resources() {
        let fragment = Tag::new("canvas").resource("c.js").render().unwrap();
        assert_eq!(fragment.resources, vec!["c.js"]);
    }

    // ------------------------------------------------------------------------
    // NestedTag
    // ------------------------------------------------------------------------

    #[test]
    fn test_nested_indents_children() {
        let tree = div([
            Box::new(paragraph("a")) as Box<dyn Render>,
            Box::new(div([Box::new(paragraph("b")) as Box<dyn Render>])),
        ]);
        assert_eq!(
            markup(&tree),
            "<div>\n  <p>a</p>\n  <div>\n    <p>b</p>\n  </div>\n</div>"
        );
    }

    #[test]
    fn test_nested_leaves_pre_untouched() {
        let code = passthrough("<pre><code>fn x() {\n    1\n}\n</code></pre>\n<p>after</p>");
        let tree = NestedTag::new("div").child(code);
        assert_eq!(
            markup(&tree),
            "<div>\n  <pre><code>fn x() {\n    1\n}\n</code></pre>\n  <p>after</p>\n</div>"
        );
    }

    #[test]
    fn test_pre_prefix_not_confused_with_other_tags() {
        assert!(!pre_state_after("<preview>", false));
        assert!(pre_state_after("<pre class=\"x\">", false));
        assert!(!pre_state_after("<pre>x</pre>", false));
    }

    #[test]
    fn test_nested_resource_order() {
        let tree = NestedTag::new("body")
            .child(Tag::new("i").resource("one.js"))
            .child(
                NestedTag::new("div")
                    .child(Tag::new("i").resource("two.css"))
                    .resource("div.js"),
            )
            .resource("own.css");
        let fragment = tree.render().unwrap();
        assert_eq!(
            fragment.resources,
            vec!["one.js", "two.css", "div.js", "own.css"]
        );
    }

    #[test]
    fn test_empty_nested() {
        assert_eq!(markup(&NestedTag::new("head")), "<head>\n</head>");
    }
}
