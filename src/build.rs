//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── clean output (optional)
//!     │
//!     ├── collect_site() ──► content dir → DocumentTree
//!     │       directories → documents, `*.md` → pages,
//!     │       `<page>.json` → page context, other files → static copies
//!     │
//!     ├── DocumentTree::render_into() ──► one html file per page
//!     │
//!     └── copy assets and static files
//! ```

use crate::{
    builtins::builtin_functions,
    config::{SiteConfig, read_context},
    docs::{Document, DocumentTree, NodeId, Page, RenderOptions},
    fundsl::Context,
    log,
    render::{HtmlPage, NestedTag, PreprocMarkdownDiv, Render, tag},
};
use anyhow::{Context as _, Result};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Extension of page templates inside the content directory.
const TEMPLATE_EXT: &str = "md";
/// Extension of per-page context files next to a template.
const CONTEXT_EXT: &str = "json";

// ============================================================================
// Site Build
// ============================================================================

/// Build the content directory into the output directory.
///
/// Returns the number of pages written. If `config.build.clean` is true,
/// the output directory is removed first.
pub fn build_site(config: &SiteConfig) -> Result<usize> {
    let output = &config.build.output;

    if config.build.clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clean {}", output.display()))?;
        log!("build"; "cleaned {}", output.display());
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let context = config.load_context()?;
    let site = collect_site(&config.build.content, &config.base.name, &context, output)?;
    log!("build"; "found {} pages", site.pages);

    let functions = builtin_functions();
    let mut options = RenderOptions::new(&functions);
    options.markers = config.markers()?;
    options.minify = config.build.minify;
    options.language = config.base.language.clone();
    options.site_title = Some(config.base.title.clone()).filter(|t| !t.is_empty());
    options.head = config.build.head.tags();

    let pages = site.tree.render_into(site.root, output, &options)?;

    let mut copied = copy_dir(&config.build.assets, output)?;
    for (from, to) in &site.static_files {
        copy_file(from, to)?;
        copied += 1;
    }

    log!("build"; "rendered {} pages, copied {} files", pages, copied);
    Ok(pages)
}

/// Render one template to a complete HTML page.
///
/// Uses the configured markers, language and head settings; the page
/// title is the template's first level-one heading or the file stem.
pub fn render_single(config: &SiteConfig, template: &Path, context: &Path) -> Result<String> {
    let source = fs::read_to_string(template)
        .with_context(|| format!("Failed to read {}", template.display()))?;
    let context = read_context(context)?;
    let functions = builtin_functions();

    let content = PreprocMarkdownDiv::new(source.as_str(), &context, &functions)
        .with_markers(config.markers()?);

    let title = heading_title(&source).unwrap_or_else(|| file_stem(template));
    let mut page = HtmlPage::new(NestedTag::new("body").child(content))
        .language(config.base.language.as_str())
        .head_child(tag::meta([("charset", "utf-8")]))
        .head_child(tag::title(&title));
    for element in config.build.head.tags() {
        page = page.head_child(element);
    }

    let fragment = page.render()?;
    log!("render"; "{}", template.display());
    Ok(fragment.markup)
}

// ============================================================================
// Content Collection
// ============================================================================

/// A content directory loaded as a document tree.
struct Site {
    tree: DocumentTree,
    root: NodeId,
    pages: usize,
    /// Non-template files and where they land in the output.
    static_files: Vec<(PathBuf, PathBuf)>,
}

/// State gathered while walking the content directory.
#[derive(Default)]
struct Collector {
    tree: DocumentTree,
    pages: usize,
    static_files: Vec<(PathBuf, PathBuf)>,
}

fn collect_site(content: &Path, name: &str, context: &Context, output: &Path) -> Result<Site> {
    let mut collector = Collector::default();
    let root = collect_document(&mut collector, content, Document::new(name)?, context, output)?
        .with_context(|| format!("No pages found in {}", content.display()))?;
    Ok(Site {
        tree: collector.tree,
        root,
        pages: collector.pages,
        static_files: collector.static_files,
    })
}

/// Load `dir` as `document`. Returns `None` for a directory without pages.
fn collect_document(
    collector: &mut Collector,
    dir: &Path,
    document: Document,
    context: &Context,
    out_dir: &Path,
) -> Result<Option<NodeId>> {
    let mut children = Vec::new();

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e.file_name()));
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        let path = entry.path();
        let file_name = entry.file_name();

        if entry.file_type().is_dir() {
            let sub = Document::new(file_name.to_string_lossy())
                .with_context(|| format!("Invalid directory name {}", path.display()))?;
            let sub_out = out_dir.join(&sub.physical_name);
            if let Some(id) = collect_document(collector, path, sub, context, &sub_out)? {
                children.push(id);
            }
        } else if has_ext(path, TEMPLATE_EXT) {
            let page = load_page(path, context)?;
            children.push(collector.tree.add_page(page));
            collector.pages += 1;
        } else if has_ext(path, CONTEXT_EXT) && path.with_extension(TEMPLATE_EXT).is_file() {
            // Loaded with its page.
        } else {
            collector.static_files.push((path.to_owned(), out_dir.join(file_name)));
        }
    }

    if children.is_empty() {
        return Ok(None);
    }
    let id = collector
        .tree
        .add_document(document, children)
        .with_context(|| format!("Invalid document {}", dir.display()))?;
    Ok(Some(id))
}

/// A page from `path`, with `<stem>.json` layered over the site context.
fn load_page(path: &Path, site_context: &Context) -> Result<Page> {
    let template = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut context = site_context.clone();
    let own = path.with_extension(CONTEXT_EXT);
    if own.is_file() {
        for (name, value) in read_context(&own)?.iter() {
            context.insert(name.as_str(), value.clone());
        }
    }

    let mut page = Page::new(file_stem(path), template.as_str())
        .with_context(|| format!("Invalid page name {}", path.display()))?
        .context(context);
    if let Some(title) = heading_title(&template) {
        page = page.title(title);
    }
    Ok(page)
}

/// Text of the first `# ` heading.
fn heading_title(template: &str) -> Option<String> {
    template
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_owned())
        .filter(|title| !title.is_empty())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

// ============================================================================
// Static Files
// ============================================================================

/// Copy every file under `src` into `dest`, keeping relative paths.
/// A missing `src` copies nothing.
fn copy_dir(src: &Path, dest: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("Failed to read {}", src.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(src)?;
        copy_file(entry.path(), &dest.join(relative))?;
        copied += 1;
    }
    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderError;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.content = root.join("content");
        config.build.output = root.join("public");
        config.build.assets = root.join("assets");
        config
    }

    /// content/{index.md, about.md, about.json, logo.svg, guide/{index.md, setup.md}}
    fn sample_site(root: &Path) {
        let content = root.join("content");
        write(
            &content.join("index.md"),
            "# Home\n\n%$ link(to='main/guide/setup') $%\n\n%$ line(y=sales) $%",
        );
        write(&content.join("about.md"), "About {{who}} in {{year}}");
        write(&content.join("about.json"), r#"{"who": "us"}"#);
        write(&content.join("logo.svg"), "<svg/>");
        write(&content.join("guide/index.md"), "# Guide\n\n%$ link(to='main/about', text='About') $%");
        write(&content.join("guide/setup.md"), "# Setup\n\n%$ table(rows=[[1, 2]]) $%");
        write(&root.join("assets/css/site.css"), "body {}");
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_heading_title() {
        assert_eq!(heading_title("intro\n# Title \nmore"), Some("Title".into()));
        assert_eq!(heading_title("## Sub\ntext"), None);
        assert_eq!(heading_title("# "), None);
    }

    #[test]
    fn test_build_site_writes_every_page() {
        let dir = TempDir::new().unwrap();
        sample_site(dir.path());
        let data = dir.path().join("data.json");
        write(&data, r#"{"sales": [1, 2, 3], "year": 2024, "who": "them"}"#);

        let mut config = config(dir.path());
        config.base.title = "Handbook".into();
        config.build.context = Some(data);
        let pages = build_site(&config).unwrap();

        assert_eq!(pages, 4);
        let public = dir.path().join("public");
        for file in ["index.html", "about.html", "guide/index.html", "guide/setup.html"] {
            assert!(public.join(file).is_file(), "{file}");
        }
        assert!(public.join("logo.svg").is_file());
        assert!(public.join("css/site.css").is_file());
        assert!(!public.join("about.json").exists());

        let index = read(&public.join("index.html"));
        assert!(index.contains("<title>Home | Handbook</title>"));
        assert!(index.contains("<a href=\"guide/setup.html\">Setup</a>"));
        assert!(index.contains(crate::builtins::CHART_JS));

        let guide = read(&public.join("guide/index.html"));
        assert!(guide.contains("<a href=\"../about.html\">About</a>"));

        // Page context overrides the site context.
        let about = read(&public.join("about.html"));
        assert!(about.contains("About us in 2024"));
    }

    #[test]
    fn test_build_site_clean_removes_stale_files() {
        let dir = TempDir::new().unwrap();
        sample_site(dir.path());
        write(&dir.path().join("public/stale.html"), "old");
        write(&dir.path().join("data.json"), r#"{"sales": [1]}"#);

        let mut config = config(dir.path());
        config.build.context = Some(dir.path().join("data.json"));
        build_site(&config).unwrap();
        assert!(dir.path().join("public/stale.html").exists());

        config.build.clean = true;
        build_site(&config).unwrap();
        assert!(!dir.path().join("public/stale.html").exists());
        assert!(dir.path().join("public/index.html").exists());
    }

    #[test]
    fn test_build_site_minify() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("content/index.md"), "# Home\n\nHello");

        let mut config = config(dir.path());
        config.build.minify = true;
        build_site(&config).unwrap();
        let html = read(&dir.path().join("public/index.html"));
        assert!(!html.contains("\n  "));
        assert!(html.contains("Hello"));
    }

    #[test]
    fn test_document_without_index_fails() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("content/index.md"), "# Home");
        write(&dir.path().join("content/guide/setup.md"), "# Setup");

        let err = build_site(&config(dir.path())).unwrap_err();
        assert!(format!("{err:#}").contains("guide"));
    }

    #[test]
    fn test_empty_content_fails() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        let err = build_site(&config(dir.path())).unwrap_err();
        assert!(err.to_string().contains("No pages found"));
    }

    #[test]
    fn test_build_site_reports_preprocess_errors() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("content/index.md"), "%$ missing() $% %$ link(to='main/x') $%");

        let err = build_site(&config(dir.path())).unwrap_err();
        let preprocess = err.chain().find_map(|e| match e.downcast_ref::<RenderError>() {
            Some(RenderError::Preprocess(p)) => Some(p),
            _ => None,
        });
        assert_eq!(preprocess.map(|p| p.errors.len()), Some(2));
    }

    // ------------------------------------------------------------------------
    // render_single tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_render_single() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("report.md");
        let context = dir.path().join("data.json");
        write(&template, "# Q3\n\n%$ bar(labels=names, values=totals) $%\n\nBy {{author}}");
        write(&context, r#"{"names": ["a", "b"], "totals": [1, 2], "author": "Ops"}"#);

        let mut config = SiteConfig::default();
        config.build.head.styles.push("report.css".into());
        config.build.head.styles.push("https://fonts.googleapis.com/css2?family=Inter".into());
        config.build.head.scripts.push("https://plausible.io/js/script".into());
        let html = render_single(&config, &template, &context).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Q3</title>"));
        assert!(html.contains("By Ops"));
        assert!(html.contains("<link rel=\"stylesheet\" href=\"report.css\"/>"));
        assert!(html.contains(
            "<link rel=\"stylesheet\" href=\"https://fonts.googleapis.com/css2?family=Inter\"/>"
        ));
        assert!(html.contains("<script src=\"https://plausible.io/js/script\" defer></script>"));
        assert!(!html.contains("\n  https://"));
        assert_eq!(html.matches(crate::builtins::CHART_JS).count(), 1);
    }

    #[test]
    fn test_render_single_title_falls_back_to_stem() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("notes.md");
        let context = dir.path().join("data.json");
        write(&template, "plain text");
        write(&context, "{}");

        let html = render_single(&SiteConfig::default(), &template, &context).unwrap();
        assert!(html.contains("<title>notes</title>"));
    }
}
