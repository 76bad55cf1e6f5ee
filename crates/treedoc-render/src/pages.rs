//! Per-folder markdown pages.

use std::path::Path;

use treedoc_tree::FolderNode;
use treedoc_tree::paths::output_dir;

use crate::assembly::PageAssembler;
use crate::output::OutputFile;

/// Renders one navigable page per folder into the mirrored output tree.
#[derive(Debug, Clone)]
pub struct FolderPages<'a> {
    assembler: PageAssembler<'a>,
    output_root: &'a Path,
}

impl<'a> FolderPages<'a> {
    /// Create a renderer writing below `output_root`.
    #[must_use]
    pub fn new(assembler: PageAssembler<'a>, output_root: &'a Path) -> Self {
        Self {
            assembler,
            output_root,
        }
    }

    /// Page of `node` at `<output root>/<rel path>/<page file>`.
    #[must_use]
    pub fn render(&self, node: &FolderNode) -> OutputFile {
        let path = output_dir(self.output_root, &node.rel_path).join(self.assembler.page_file());
        tracing::debug!(folder = %node.name, path = %path.display(), "Rendering page");
        OutputFile::text(path, self.assembler.page(node))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use treedoc_diagrams::{DiagramMarkup, DiagramResolver, ImageFormat};

    use super::*;
    use crate::assembly::tests::{fixture, node};
    use crate::assembly::{ContentOrder, ImageLinks, Navigation, PageVariant};

    #[test]
    fn test_one_page_per_node() {
        let (_dir, tree) = fixture();
        let resolver = DiagramResolver::local(ImageFormat::Svg);
        let variant = PageVariant {
            images: ImageLinks::PageRelative,
            markup: DiagramMarkup::Embed,
            order: ContentOrder::FragmentsFirst,
            navigation: Navigation::ALL,
        };
        let pages = FolderPages::new(
            PageAssembler::new(&tree, &resolver, "index.md", variant),
            Path::new("/out"),
        );

        let files: Vec<_> = tree.iter().map(|n| pages.render(n)).collect();

        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/out/index.md"),
                PathBuf::from("/out/guide/index.md"),
                PathBuf::from("/out/guide/setup/index.md"),
                PathBuf::from("/out/ops/index.md"),
            ]
        );
        let guide = pages.render(node(&tree, "guide"));
        assert!(guide.as_text().unwrap().starts_with("# guide\n\n`/guide`"));
    }
}
