//! Single-document aggregation of the whole tree.
//!
//! The markdown flavor gets an anchor-linked table of contents and a
//! "back to top" link per section. The PDF flavor uses plain bullets since
//! the converted document has no fragment navigation.

use std::fmt::Write;

use treedoc_tree::FolderNode;
use treedoc_tree::paths::link_label;

use crate::assembly::{PageAssembler, join_blocks};
use crate::slug::Slugger;

/// Which aggregated document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFlavor {
    /// Markdown with anchor navigation.
    Markdown,
    /// Markdown fed to the PDF converter.
    Pdf,
}

/// Builds the aggregated document.
///
/// Only the assembler's breadcrumb setting applies; other navigation elements
/// are replaced by the document-level table of contents.
#[derive(Debug, Clone)]
pub struct AggregateDocument<'a> {
    assembler: PageAssembler<'a>,
    project_name: &'a str,
    flavor: AggregateFlavor,
}

impl<'a> AggregateDocument<'a> {
    /// Create a document titled `project_name`.
    #[must_use]
    pub fn new(assembler: PageAssembler<'a>, project_name: &'a str, flavor: AggregateFlavor) -> Self {
        Self {
            assembler,
            project_name,
            flavor,
        }
    }

    /// Render the complete document.
    #[must_use]
    pub fn render(&self) -> String {
        let tree = self.assembler.tree();
        let mut slugger = Slugger::new();
        let top = slugger.slug(self.project_name);
        let anchors: Vec<String> = tree.iter().map(|n| slugger.slug(&n.name)).collect();

        let mut blocks = vec![format!("# {}", self.project_name), self.toc(&anchors)];
        for node in tree {
            blocks.extend(self.section(node, &top));
        }

        tracing::debug!(
            flavor = ?self.flavor,
            sections = tree.len(),
            "Aggregated document assembled"
        );
        join_blocks(&blocks)
    }

    fn toc(&self, anchors: &[String]) -> String {
        let mut toc = String::new();
        for (node, anchor) in self.assembler.tree().iter().zip(anchors) {
            let indent = "  ".repeat(node.depth - 1);
            match self.flavor {
                AggregateFlavor::Markdown => {
                    let _ = writeln!(toc, "{indent}- [{}](#{anchor})", link_label(&node.name));
                }
                AggregateFlavor::Pdf => {
                    let _ = writeln!(toc, "{indent}- {}", node.name);
                }
            }
        }
        toc.truncate(toc.trim_end().len());
        toc
    }

    fn section(&self, node: &FolderNode, top: &str) -> Vec<String> {
        let mut blocks = vec![format!("## {}", node.name)];
        blocks.extend(self.assembler.breadcrumb(node));
        blocks.extend(self.assembler.content(node));
        if self.flavor == AggregateFlavor::Markdown {
            blocks.push(format!("[Back to top](#{top})"));
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use treedoc_diagrams::{DiagramMarkup, DiagramResolver, ImageFormat};

    use super::*;
    use crate::assembly::tests::fixture;
    use crate::assembly::{ContentOrder, ImageLinks, Navigation, PageVariant};

    fn variant(images: ImageLinks) -> PageVariant {
        PageVariant {
            images,
            markup: DiagramMarkup::Embed,
            order: ContentOrder::FragmentsFirst,
            navigation: Navigation::ALL,
        }
    }

    #[test]
    fn test_markdown_document() {
        let (_dir, tree) = fixture();
        let resolver = DiagramResolver::local(ImageFormat::Svg);
        let assembler = PageAssembler::new(&tree, &resolver, "README.md", variant(ImageLinks::DocumentRoot));
        let doc = AggregateDocument::new(assembler, "Home", AggregateFlavor::Markdown).render();

        assert_eq!(
            doc,
            "# Home\n\n\
             - [Home](#home-1)\n  \
             - [guide](#guide)\n    \
             - [setup](#setup)\n  \
             - [ops](#ops)\n\n\
             ## Home\n\n\
             Hello\n\n\
             [Back to top](#home)\n\n\
             ## guide\n\n\
             `/guide`\n\n\
             World\n\n\
             ![flow](guide/flow.svg)\n\n\
             [Back to top](#home)\n\n\
             ## setup\n\n\
             `/guide/setup`\n\n\
             [Back to top](#home)\n\n\
             ## ops\n\n\
             `/ops`\n\n\
             [Back to top](#home)\n"
        );
    }

    #[test]
    fn test_heading_counts() {
        let (_dir, tree) = fixture();
        let resolver = DiagramResolver::local(ImageFormat::Svg);
        let assembler = PageAssembler::new(&tree, &resolver, "README.md", variant(ImageLinks::DocumentRoot));
        let doc = AggregateDocument::new(assembler, "Billing", AggregateFlavor::Markdown).render();

        assert!(doc.starts_with("# Billing\n"));
        assert_eq!(doc.lines().filter(|l| l.starts_with("## ")).count(), tree.len());
        assert_eq!(doc.lines().filter(|l| l.trim_start().starts_with("- [")).count(), tree.len());
    }

    #[test]
    fn test_pdf_document() {
        let (_dir, tree) = fixture();
        let resolver = DiagramResolver::local(ImageFormat::Png);
        let assembler = PageAssembler::new(
            &tree,
            &resolver,
            "README.md",
            variant(ImageLinks::OutputRoot("/out".to_owned())),
        );
        let doc = AggregateDocument::new(assembler, "Billing", AggregateFlavor::Pdf).render();

        assert!(doc.starts_with("# Billing\n\n- Home\n  - guide\n    - setup\n  - ops\n\n## Home"));
        assert!(doc.contains("![flow](/out/guide/flow.png)"));
        assert!(!doc.contains("Back to top"));
        assert!(!doc.contains("](#"));
    }
}
