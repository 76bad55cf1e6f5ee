//! Docsify-style navigable site.
//!
//! The site consists of one content page per folder, a global `_sidebar.md`,
//! an `index.html` shell loading the docsify client with the configured theme,
//! and a `.nojekyll` marker so GitHub Pages serves underscore files.

use std::fmt::Write;
use std::path::Path;

use treedoc_diagrams::{DiagramMarkup, DiagramResolver};
use treedoc_tree::paths::{link_label, output_dir, root_link};
use treedoc_tree::{FolderNode, Tree};

use crate::assembly::{ContentOrder, ImageLinks, Navigation, PageAssembler, PageVariant};
use crate::output::OutputFile;

/// Sidebar file loaded by the shell.
pub const SIDEBAR_FILE: &str = "_sidebar.md";
/// Shell page.
pub const SHELL_FILE: &str = "index.html";
/// Marker disabling Jekyll processing on static hosts.
pub const HOSTING_MARKER_FILE: &str = ".nojekyll";

const DOCSIFY_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/docsify@4";

/// Site-wide settings.
#[derive(Debug, Clone)]
pub struct SiteSettings<'a> {
    /// Project name shown in the shell.
    pub project_name: &'a str,
    /// Repository linked from the shell corner.
    pub repository: Option<&'a str>,
    /// Theme stylesheet URL.
    pub theme: &'a str,
    /// File name of site pages.
    pub page_file: &'a str,
}

/// Renders the site into the mirrored output tree.
#[derive(Debug, Clone)]
pub struct SiteRenderer<'a> {
    assembler: PageAssembler<'a>,
    settings: SiteSettings<'a>,
    output_root: &'a Path,
}

impl<'a> SiteRenderer<'a> {
    /// Create a site renderer.
    ///
    /// Pages carry no navigation of their own; the sidebar replaces it.
    /// When diagram links are requested but images are local, diagrams are
    /// embedded instead.
    #[must_use]
    pub fn new(
        tree: &'a Tree,
        resolver: &'a DiagramResolver,
        links: bool,
        order: ContentOrder,
        settings: SiteSettings<'a>,
        output_root: &'a Path,
    ) -> Self {
        let markup = if links {
            DiagramMarkup::LinkUnlessLocal
        } else {
            DiagramMarkup::Embed
        };
        let variant = PageVariant {
            images: ImageLinks::FolderLocal,
            markup,
            order,
            navigation: Navigation::NONE,
        };
        Self {
            assembler: PageAssembler::new(tree, resolver, settings.page_file, variant),
            settings,
            output_root,
        }
    }

    /// Content page of `node`.
    #[must_use]
    pub fn page(&self, node: &FolderNode) -> OutputFile {
        let path = output_dir(self.output_root, &node.rel_path).join(self.settings.page_file);
        tracing::debug!(folder = %node.name, path = %path.display(), "Rendering site page");
        OutputFile::text(path, self.assembler.page(node))
    }

    /// Global sidebar listing every folder, indented by depth.
    #[must_use]
    pub fn sidebar(&self) -> OutputFile {
        let mut sidebar = String::new();
        for node in self.assembler.tree() {
            let _ = writeln!(
                sidebar,
                "{}- [{}]({})",
                "  ".repeat(node.depth - 1),
                link_label(&node.name),
                root_link(&node.rel_path, self.settings.page_file)
            );
        }
        OutputFile::text(self.output_root.join(SIDEBAR_FILE), sidebar)
    }

    /// `index.html` shell.
    #[must_use]
    pub fn shell(&self) -> OutputFile {
        let settings = &self.settings;
        let mut html = String::with_capacity(1024);

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape(settings.project_name));
        let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}\">", escape(settings.theme));
        html.push_str("</head>\n<body>\n<div id=\"app\"></div>\n<script>\n");
        html.push_str("window.$docsify = {\n");
        let _ = writeln!(html, "  name: {},", js_string(settings.project_name));
        if let Some(repository) = settings.repository {
            let _ = writeln!(html, "  repo: {},", js_string(repository));
        }
        let _ = writeln!(html, "  homepage: {},", js_string(settings.page_file));
        // Sidebar links are relative to the site root, so docsify must not
        // resolve them against the current route.
        html.push_str("  loadSidebar: true\n");
        html.push_str("};\n</script>\n");
        let _ = writeln!(html, "<script src=\"{DOCSIFY_SCRIPT}\"></script>");
        html.push_str("</body>\n</html>\n");

        OutputFile::text(self.output_root.join(SHELL_FILE), html)
    }

    /// Empty `.nojekyll` marker.
    #[must_use]
    pub fn hosting_marker(&self) -> OutputFile {
        OutputFile::new(self.output_root.join(HOSTING_MARKER_FILE), Vec::new())
    }

    /// Shell, sidebar and hosting marker.
    #[must_use]
    pub fn fixed_files(&self) -> [OutputFile; 3] {
        [self.shell(), self.sidebar(), self.hosting_marker()]
    }
}

/// JSON string literal safe for an inline script.
fn js_string(value: &str) -> String {
    serde_json::Value::from(value)
        .to_string()
        .replace("</", "<\\/")
}

fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
