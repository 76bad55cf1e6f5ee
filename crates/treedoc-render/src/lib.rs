//! Renderers for treedoc.
//!
//! Every output is a projection of the same [`Tree`](treedoc_tree::Tree)
//! assembled by [`PageAssembler`] with a renderer-specific [`PageVariant`]:
//! - [`FolderPages`]: one navigable markdown page per folder
//! - [`SiteRenderer`]: docsify pages, sidebar, shell and hosting marker
//! - [`AggregateDocument`]: the whole tree as one markdown document
//! - [`FolderPdfs`] and [`convert_markdown`]: PDF output via a [`PdfConverter`]
//!
//! Renderers return [`OutputFile`]s; writing them is left to the caller.

mod aggregate;
mod assembly;
mod output;
mod pages;
mod pdf;
mod site;
mod slug;

pub use aggregate::{AggregateDocument, AggregateFlavor};
pub use assembly::{ContentOrder, ImageLinks, Navigation, PageAssembler, PageVariant};
pub use output::OutputFile;
pub use pages::FolderPages;
pub use pdf::{CommandPdfConverter, FolderPdfs, PdfConverter, PdfError, PdfOptions, convert_markdown};
pub use site::{HOSTING_MARKER_FILE, SHELL_FILE, SIDEBAR_FILE, SiteRenderer, SiteSettings};
pub use slug::{Slugger, slugify};
