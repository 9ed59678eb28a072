//! README rendering behind a narrow Markdown interface.

#![allow(missing_docs)]

use std::fs;
use std::path::Path;

use pulldown_cmark::{Options, Parser, html};

use crate::core::errors::{Result, WhError};

/// File name picked up as a directory's README.
pub const README_FILENAME: &str = "README.md";

/// Markdown text in, HTML fragment out.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark with tables and strikethrough.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkRenderer;

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        let parser = Parser::new_ext(markdown, options);

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

/// Rendered `README.md` of `dir`, or `None` when the directory has none.
pub fn render_readme(dir: &Path, renderer: &dyn MarkdownRenderer) -> Result<Option<String>> {
    let path = dir.join(README_FILENAME);
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path).map_err(|source| WhError::io(&path, source))?;
    Ok(Some(renderer.render(&raw)))
}
