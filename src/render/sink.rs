//! Writing rendered output to disk.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Fragment, Render, RenderError};
use crate::utils::minify::minify_html;

/// Renders `inner` and writes its markup to `path`.
///
/// Parent directories are created as needed. Rendering itself stays pure;
/// this is the only place the render tree touches the filesystem.
pub struct FileSink<R> {
    pub inner: R,
    pub path: PathBuf,
    pub minify: bool,
}

impl<R: Render> FileSink<R> {
    pub fn new(inner: R, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
            minify: false,
        }
    }

    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Render and write, returning the rendered fragment.
    pub fn write(&self) -> Result<Fragment, RenderError> {
        let fragment = self.inner.render()?;
        let bytes = minify_html(fragment.markup.as_bytes(), self.minify);
        write_file(&self.path, &bytes)?;
        Ok(fragment)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| RenderError::Io(parent.to_path_buf(), e))?;
    }
    fs::write(path, bytes).map_err(|e| RenderError::Io(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tag::paragraph;
    use tempfile::TempDir;

    #[test]
    fn test_writes_creating_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/page.html");
        let fragment = FileSink::new(paragraph("hi").resource("x.js"), &path)
            .write()
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>hi</p>");
        assert_eq!(fragment.resources, vec!["x.js"]);
    }

    #[test]
    fn test_minified_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        let html = Fragment::new("<div>\n    <p>hi</p>\n</div>");
        FileSink::new(html, &path).minify(true).write().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<p>hi</p>"));
        assert!(!written.contains('\n'));
    }

    #[test]
    fn test_rewrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        FileSink::new(Fragment::new("one"), &path).write().unwrap();
        FileSink::new(Fragment::new("two"), &path).write().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = FileSink::new(Fragment::new("x"), blocker.join("page.html"))
            .write()
            .unwrap_err();
        assert!(matches!(err, RenderError::Io(..)));
    }
}
