//! Remote URL payload encoding.
//!
//! Diagram sources are compressed with raw deflate and written with the
//! `PlantUML` base64 alphabet, padded with `0` to a multiple of four
//! characters. The result is URL-safe and accepted by `PlantUML` servers.

use std::io::Write;
use std::sync::LazyLock;

use base64::Engine;
use base64::alphabet::Alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use flate2::Compression;
use flate2::write::DeflateEncoder;

use crate::consts::PLANTUML_ALPHABET;

static ENGINE: LazyLock<GeneralPurpose> = LazyLock::new(|| {
    let alphabet = Alphabet::new(PLANTUML_ALPHABET).unwrap();
    GeneralPurpose::new(
        &alphabet,
        GeneralPurposeConfig::new().with_encode_padding(false),
    )
});

/// Encode diagram source for use in a rendering service URL.
///
/// Pure function of `source`: equal input always yields equal output.
#[must_use]
pub fn encode_source(source: &str) -> String {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(source.len()), Compression::best());
    // Writing into a Vec cannot fail.
    let compressed = match encoder.write_all(source.as_bytes()) {
        Ok(()) => encoder.finish().unwrap_or_default(),
        Err(_) => Vec::new(),
    };

    let mut encoded = ENGINE.encode(compressed);
    while encoded.len() % 4 != 0 {
        encoded.push('0');
    }
    encoded
}
