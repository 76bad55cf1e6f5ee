//! Page assembly shared by all renderers.
//!
//! Every output format is built from the same parts: a heading, optional
//! navigation (breadcrumb, tree-wide table of contents, up link, children),
//! and the folder's fragments and diagrams in a configured order. A renderer
//! picks a [`PageVariant`] instead of assembling pages itself.

use std::fmt::Write;

use treedoc_diagrams::{DiagramMarkup, DiagramRef, DiagramResolver, ImageBase};
use treedoc_tree::paths::{link_label, relative_link};
use treedoc_tree::{FolderNode, Tree};

/// Order of a folder's own content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentOrder {
    /// Markdown fragments, then diagrams.
    #[default]
    FragmentsFirst,
    /// Diagrams, then markdown fragments.
    DiagramsFirst,
}

impl ContentOrder {
    /// `DiagramsFirst` when diagrams go on top.
    #[must_use]
    pub fn from_diagrams_on_top(on_top: bool) -> Self {
        if on_top {
            Self::DiagramsFirst
        } else {
            Self::FragmentsFirst
        }
    }
}

/// How local image paths are expressed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLinks {
    /// Page and images share a folder.
    FolderLocal,
    /// Relative to the page of the node being rendered.
    PageRelative,
    /// Relative to a document at the output root.
    DocumentRoot,
    /// Prefixed with the output root path.
    OutputRoot(String),
}

impl ImageLinks {
    /// Image base for content of `node`.
    fn base<'a>(&'a self, node: &'a FolderNode) -> ImageBase<'a> {
        match self {
            Self::FolderLocal => ImageBase::FolderLocal,
            Self::PageRelative => ImageBase::Page(&node.rel_path),
            Self::DocumentRoot => ImageBase::Page(&[]),
            Self::OutputRoot(prefix) => ImageBase::OutputRoot(prefix),
        }
    }
}

/// Navigation elements of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Navigation {
    /// Folder path below the heading (never on the root).
    pub breadcrumb: bool,
    /// Whole-tree table of contents.
    pub toc: bool,
    /// Link to the parent page (never on the root).
    pub parent_link: bool,
    /// Links to child pages.
    pub children: bool,
}

impl Navigation {
    /// No navigation at all.
    pub const NONE: Self = Self {
        breadcrumb: false,
        toc: false,
        parent_link: false,
        children: false,
    };

    /// Every navigation element.
    pub const ALL: Self = Self {
        breadcrumb: true,
        toc: true,
        parent_link: true,
        children: true,
    };
}

/// Selects what a page contains and how it links images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageVariant {
    /// Local image path style.
    pub images: ImageLinks,
    /// Embed or link diagrams.
    pub markup: DiagramMarkup,
    /// Fragment/diagram order.
    pub order: ContentOrder,
    /// Navigation elements.
    pub navigation: Navigation,
}

/// Assembles markdown for nodes of one tree.
#[derive(Debug, Clone)]
pub struct PageAssembler<'a> {
    tree: &'a Tree,
    resolver: &'a DiagramResolver,
    page_file: &'a str,
    variant: PageVariant,
}

impl<'a> PageAssembler<'a> {
    /// Create an assembler. `page_file` is the file name pages link to.
    #[must_use]
    pub fn new(
        tree: &'a Tree,
        resolver: &'a DiagramResolver,
        page_file: &'a str,
        variant: PageVariant,
    ) -> Self {
        Self {
            tree,
            resolver,
            page_file,
            variant,
        }
    }

    /// Tree being rendered.
    #[must_use]
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// File name of pages.
    #[must_use]
    pub fn page_file(&self) -> &'a str {
        self.page_file
    }

    /// Variant in use.
    #[must_use]
    pub fn variant(&self) -> &PageVariant {
        &self.variant
    }

    /// Fragments and diagram markup of `node` in the configured order.
    ///
    /// Fragments are trimmed; blank fragments are dropped.
    #[must_use]
    pub fn content(&self, node: &FolderNode) -> Vec<String> {
        let fragments = node
            .fragments
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_owned);

        let base = self.variant.images.base(node);
        let diagrams = DiagramRef::all(node)
            .map(|d| self.resolver.markup(&d, base, self.variant.markup));

        match self.variant.order {
            ContentOrder::FragmentsFirst => fragments.chain(diagrams).collect(),
            ContentOrder::DiagramsFirst => diagrams.chain(fragments).collect(),
        }
    }

    /// Breadcrumb line of `node`, if enabled and not the root.
    #[must_use]
    pub fn breadcrumb(&self, node: &FolderNode) -> Option<String> {
        if !self.variant.navigation.breadcrumb {
            return None;
        }
        node.breadcrumb().map(|path| format!("`{path}`"))
    }

    /// Complete page for `node`.
    #[must_use]
    pub fn page(&self, node: &FolderNode) -> String {
        let nav = self.variant.navigation;
        let mut blocks = vec![format!("# {}", node.name)];

        blocks.extend(self.breadcrumb(node));
        if nav.toc {
            blocks.push(self.toc(node));
        }
        if nav.parent_link {
            blocks.extend(self.up_link(node));
        }
        if nav.children {
            blocks.extend(self.children(node));
        }
        blocks.extend(self.content(node));

        join_blocks(&blocks)
    }

    /// Table of contents of the whole tree as seen from `current`.
    fn toc(&self, current: &FolderNode) -> String {
        let mut toc = String::new();
        for node in self.tree {
            let link = relative_link(&current.rel_path, &node.rel_path, self.page_file);
            let entry = format!("[{}]({link})", link_label(&node.name));
            let indent = "  ".repeat(node.depth - 1);
            if node.path == current.path {
                let _ = writeln!(toc, "{indent}- **{entry}**");
            } else {
                let _ = writeln!(toc, "{indent}- {entry}");
            }
        }
        toc.truncate(toc.trim_end().len());
        toc
    }

    /// Link to the parent page.
    fn up_link(&self, node: &FolderNode) -> Option<String> {
        let parent = self.tree.parent_of(node)?;
        let link = relative_link(&node.rel_path, &parent.rel_path, self.page_file);
        Some(format!("[Up: {}]({link})", link_label(&parent.name)))
    }

    /// List of child pages.
    ///
    /// Starts with a label line so it never joins the table of contents
    /// into one list.
    fn children(&self, node: &FolderNode) -> Option<String> {
        if node.child_names.is_empty() {
            return None;
        }
        let mut list = CHILDREN_LABEL.to_owned();
        for child in &node.child_names {
            let link = relative_link(&[], std::slice::from_ref(child), self.page_file);
            let _ = write!(list, "\n- [{}]({link})", link_label(child));
        }
        Some(list)
    }
}

/// Line introducing the children list.
const CHILDREN_LABEL: &str = "Subfolders:";

/// Join markdown blocks with blank lines and end with a newline.
pub(crate) fn join_blocks(blocks: &[String]) -> String {
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}
