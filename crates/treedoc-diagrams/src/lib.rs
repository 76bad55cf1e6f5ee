//! Diagram resolution and rasterization for treedoc.
//!
//! Diagram sources are opaque text. This crate only decides where a rendered
//! image lives and how a page refers to it:
//! - [`DiagramResolver`] computes a local image path or a remote rendering
//!   service URL and formats it as embed or link markup
//! - [`encode_source`] produces the compressed payload used in remote URLs
//! - [`Rasterizer`] is the seam to the external renderer, with a Kroki
//!   backend ([`KrokiRasterizer`]) and a local command backend
//!   ([`CommandRasterizer`])
//!
//! # Example
//!
//! ```
//! use treedoc_diagrams::{DiagramMarkup, DiagramRef, DiagramResolver, ImageBase, ImageFormat};
//!
//! let resolver = DiagramResolver::remote("https://www.plantuml.com/plantuml", ImageFormat::Svg);
//! let folder = vec!["guide".to_owned()];
//! let diagram = DiagramRef::new(&folder, "flow", "@startuml\nA -> B\n@enduml");
//!
//! let markup = resolver.markup(&diagram, ImageBase::FolderLocal, DiagramMarkup::Embed);
//! assert!(markup.starts_with("![flow](https://www.plantuml.com/plantuml/svg/"));
//! ```

mod command;
mod consts;
mod encoding;
mod error;
mod format;
mod kroki;
mod rasterizer;
mod reference;
mod resolver;

pub use command::CommandRasterizer;
pub use consts::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT};
pub use encoding::encode_source;
pub use error::DiagramError;
pub use format::ImageFormat;
pub use kroki::KrokiRasterizer;
pub use rasterizer::{DiagramJob, Rasterizer};
pub use reference::DiagramRef;
pub use resolver::{DiagramMarkup, DiagramResolver, ImageBase, ResolvedDiagram};
