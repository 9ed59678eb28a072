//! Page model and HTML rendering.
//!
//! [`PageContext`] is everything a template needs for one directory: the
//! display path, the sorted entries, the icon table, per-file checksums and
//! the rendered README. Rendering goes through [`PageRenderer`] so traversal
//! never depends on the HTML engine.

#![allow(missing_docs)]

use std::collections::BTreeMap;

use maud::{DOCTYPE, PreEscaped, html};
use serde::Serialize;

use crate::core::errors::Result;
use crate::index::icons::IconTable;

/// One link on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub name: String,
    pub href: String,
    pub is_dir: bool,
}

/// Template input for one directory page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub display_path: String,
    pub parent_href: Option<String>,
    pub entries: Vec<EntryView>,
    pub icons: IconTable,
    /// Entry name -> hex SHA-256. Empty when checksums are disabled.
    pub checksums: BTreeMap<String, String>,
    pub readme_html: Option<String>,
}

/// Page data in, complete HTML document out.
pub trait PageRenderer: Send + Sync {
    fn render(&self, page: &PageContext) -> Result<String>;
}

/// Built-in renderer producing a self-contained listing page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPageRenderer;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem;color:#222}\
h1{font-size:1.4rem;word-break:break-all}\
ul.listing{list-style:none;padding:0}\
ul.listing li{display:flex;align-items:center;gap:.5rem;padding:.2rem 0;border-bottom:1px solid #eee}\
ul.listing .sha256{margin-left:auto;font-size:.75rem;color:#777;overflow-wrap:anywhere}\
article.readme{margin-top:2rem;padding-top:1rem;border-top:2px solid #ddd}";

impl PageRenderer for HtmlPageRenderer {
    fn render(&self, page: &PageContext) -> Result<String> {
        let markup = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (page.display_path) }
                    link rel="stylesheet" href="https://fonts.googleapis.com/icon?family=Material+Icons";
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    h1 { (page.display_path) }
                    ul class="listing" {
                        @if let Some(parent) = &page.parent_href {
                            li class="entry parent" {
                                span class="material-icons" { (page.icons.directory) }
                                a href=(parent) { "../" }
                            }
                        }
                        @for entry in &page.entries {
                            li class=(if entry.is_dir { "entry dir" } else { "entry file" }) {
                                span class="material-icons" {
                                    (page.icons.icon_for(&entry.name, entry.is_dir))
                                }
                                a href=(entry.href) {
                                    (entry.name)
                                    @if entry.is_dir { "/" }
                                }
                                @if let Some(digest) = page.checksums.get(&entry.name) {
                                    code class="sha256" title="SHA-256" { (digest) }
                                }
                            }
                        }
                    }
                    @if let Some(readme) = &page.readme_html {
                        article class="readme" { (PreEscaped(readme)) }
                    }
                }
            }
        };
        Ok(markup.into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PageContext {
        let mut checksums = BTreeMap::new();
        checksums.insert("yarl-1.5.1.whl".to_string(), "ab".repeat(32));
        PageContext {
            display_path: "/pip/yarl".to_string(),
            parent_href: Some("../".to_string()),
            entries: vec![
                EntryView {
                    name: "old".to_string(),
                    href: "old/".to_string(),
                    is_dir: true,
                },
                EntryView {
                    name: "yarl-1.5.1.whl".to_string(),
                    href: format!("yarl-1.5.1.whl#sha256={}", "ab".repeat(32)),
                    is_dir: false,
                },
            ],
            icons: IconTable::default(),
            checksums,
            readme_html: None,
        }
    }

    #[test]
    fn renders_title_heading_and_links() {
        let html = HtmlPageRenderer.render(&context()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>/pip/yarl</title>"));
        assert!(html.contains("<h1>/pip/yarl</h1>"));
        assert!(html.contains(r#"<a href="../">"#));
        assert!(html.contains(r#"<a href="old/">old/</a>"#));
        assert!(html.contains("settings_applications"));
        assert!(html.contains(&"ab".repeat(32)));
    }

    #[test]
    fn entries_keep_context_order() {
        let html = HtmlPageRenderer.render(&context()).unwrap();
        let dir_pos = html.find("old/</a>").unwrap();
        let file_pos = html.find("yarl-1.5.1.whl</a>").unwrap();
        assert!(dir_pos < file_pos);
    }

    #[test]
    fn readme_section_only_when_present() {
        let mut page = context();
        let without = HtmlPageRenderer.render(&page).unwrap();
        assert!(!without.contains("class=\"readme\""));

        page.readme_html = Some("<h1>Hello</h1>\n".to_string());
        let with = HtmlPageRenderer.render(&page).unwrap();
        assert!(with.contains("<article class=\"readme\"><h1>Hello</h1>"));
    }

    #[test]
    fn names_are_html_escaped() {
        let mut page = context();
        page.entries.push(EntryView {
            name: "<script>.whl".to_string(),
            href: "%3Cscript%3E.whl".to_string(),
            is_dir: false,
        });
        let html = HtmlPageRenderer.render(&page).unwrap();
        assert!(html.contains("&lt;script&gt;.whl"));
        assert!(!html.contains("<script>.whl"));
    }

    #[test]
    fn context_serializes_for_inspection() {
        let json = serde_json::to_value(context()).unwrap();
        assert_eq!(json["display_path"], "/pip/yarl");
        assert_eq!(json["entries"][0]["is_dir"], true);
        assert_eq!(json["icons"]["by_extension"][".whl"], "settings_applications");
        assert!(json["readme_html"].is_null());
    }
}
