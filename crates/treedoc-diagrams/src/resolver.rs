//! Diagram URL resolution and markup.
//!
//! A diagram is either served from a pre-rendered local image or from a remote
//! rendering service URL carrying the encoded source. Each resolution yields
//! both an inline image embed and a plain link; renderers pick one with
//! [`DiagramMarkup`].

use treedoc_tree::paths::{encode_segment, link_label, relative_link, root_link};

use crate::encoding::encode_source;
use crate::format::ImageFormat;
use crate::reference::DiagramRef;

/// Where local image URLs are resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBase<'a> {
    /// The page lives in the diagram's own folder: `<name>.<format>`.
    FolderLocal,
    /// Relative to a page in the given folder (segments relative to the output root).
    Page(&'a [String]),
    /// Prefixed with the output root, resolvable from the working directory.
    OutputRoot(&'a str),
}

/// Which markup a renderer emits for a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagramMarkup {
    /// Inline image embed.
    #[default]
    Embed,
    /// Text link labelled with the diagram name.
    Link,
    /// Link, except when images are local: a bare link to a relative image
    /// path is useless without a viewer, so the embed is used instead.
    LinkUnlessLocal,
}

impl DiagramMarkup {
    /// `Link` when links are requested, `Embed` otherwise.
    #[must_use]
    pub fn from_links(links: bool) -> Self {
        if links { Self::Link } else { Self::Embed }
    }
}

/// Both markup alternatives for a resolved diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDiagram {
    /// Image URL or path.
    pub url: String,
    /// `![name](url)`
    pub embed: String,
    /// `[name](url)`
    pub link: String,
}

#[derive(Debug, Clone)]
enum ImageSource {
    Local { format: ImageFormat },
    Remote { server_url: String, format: ImageFormat },
}

/// Resolves diagram references to URLs and markup.
///
/// Resolution is pure: nothing is rendered or cached here.
#[derive(Debug, Clone)]
pub struct DiagramResolver {
    source: ImageSource,
}

impl DiagramResolver {
    /// Resolve to pre-rendered images of the given format.
    #[must_use]
    pub fn local(format: ImageFormat) -> Self {
        Self {
            source: ImageSource::Local { format },
        }
    }

    /// Resolve to `<server_url>/<format>/<encoded source>`.
    #[must_use]
    pub fn remote(server_url: impl Into<String>, format: ImageFormat) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_owned();
        Self {
            source: ImageSource::Remote { server_url, format },
        }
    }

    /// Whether URLs point at local pre-rendered images.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self.source, ImageSource::Local { .. })
    }

    /// Image format of resolved URLs.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        match &self.source {
            ImageSource::Local { format } | ImageSource::Remote { format, .. } => *format,
        }
    }

    /// Compute the image URL for `diagram` as seen from `base`.
    #[must_use]
    pub fn url(&self, diagram: &DiagramRef<'_>, base: ImageBase<'_>) -> String {
        match &self.source {
            ImageSource::Local { format } => {
                let file = diagram.image_file_name(*format);
                match base {
                    ImageBase::FolderLocal => encode_segment(&file),
                    ImageBase::Page(dir) => relative_link(dir, diagram.folder, &file),
                    ImageBase::OutputRoot(prefix) => {
                        let link = root_link(diagram.folder, &file);
                        let prefix = encode_prefix(prefix);
                        if prefix.is_empty() {
                            link
                        } else {
                            format!("{prefix}/{link}")
                        }
                    }
                }
            }
            ImageSource::Remote { server_url, format } => {
                format!("{server_url}/{format}/{}", encode_source(diagram.source))
            }
        }
    }

    /// Resolve `diagram` into both markup alternatives.
    #[must_use]
    pub fn resolve(&self, diagram: &DiagramRef<'_>, base: ImageBase<'_>) -> ResolvedDiagram {
        let url = self.url(diagram, base);
        let label = link_label(diagram.name);
        ResolvedDiagram {
            embed: format!("![{label}]({url})"),
            link: format!("[{label}]({url})"),
            url,
        }
    }

    /// Resolve `diagram` and return the markup chosen by `mode`.
    #[must_use]
    pub fn markup(
        &self,
        diagram: &DiagramRef<'_>,
        base: ImageBase<'_>,
        mode: DiagramMarkup,
    ) -> String {
        let resolved = self.resolve(diagram, base);
        match mode {
            DiagramMarkup::Embed => resolved.embed,
            DiagramMarkup::Link => resolved.link,
            DiagramMarkup::LinkUnlessLocal if self.is_local() => resolved.embed,
            DiagramMarkup::LinkUnlessLocal => resolved.link,
        }
    }
}

/// Percent-encode an output root prefix segment by segment, keeping separators.
fn encode_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    trimmed
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}
