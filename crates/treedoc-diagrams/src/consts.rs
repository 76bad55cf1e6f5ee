//! Constants for diagram resolution and rendering.

use std::time::Duration;

/// Default remote rendering service (`PlantUML` public server).
pub const DEFAULT_SERVER_URL: &str = "https://www.plantuml.com/plantuml";

/// Default timeout for external rendering requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `PlantUML` text-encoding alphabet (base64 variant used in server URLs).
pub(crate) const PLANTUML_ALPHABET: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";
