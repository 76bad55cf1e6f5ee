//! Display names, output locations and relative links.

use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in link path segments.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Display name of `folder`: `homepage_name` for the root, its base name otherwise.
#[must_use]
pub fn display_name(root: &Path, folder: &Path, homepage_name: &str) -> String {
    if folder == root {
        return homepage_name.to_owned();
    }
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| homepage_name.to_owned())
}

/// Output directory for a folder with the given relative segments.
#[must_use]
pub fn output_dir(output_root: &Path, rel_path: &[String]) -> PathBuf {
    rel_path.iter().fold(output_root.to_path_buf(), |acc, s| acc.join(s))
}

/// Percent-encode one link path segment.
#[must_use]
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Relative link from a page in folder `from` to `file` in folder `to`.
///
/// Both folders are given as segments relative to the same root.
///
/// Examples:
/// - `[]` to `["a"]`, `README.md` -> `a/README.md`
/// - `["a", "b"]` to `["a", "c"]`, `README.md` -> `../c/README.md`
/// - `["a"]` to `[]`, `README.md` -> `../README.md`
#[must_use]
pub fn relative_link(from: &[String], to: &[String], file: &str) -> String {
    let common = from
        .iter()
        .zip(to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::with_capacity(from.len() - common + to.len() - common + 1);
    parts.extend(std::iter::repeat_n("..".to_owned(), from.len() - common));
    parts.extend(to[common..].iter().map(|s| encode_segment(s)));
    parts.push(encode_segment(file));
    parts.join("/")
}

/// Link from the root of the output tree to `file` in folder `to`.
#[must_use]
pub fn root_link(to: &[String], file: &str) -> String {
    relative_link(&[], to, file)
}

/// Folder or diagram name as markdown link text, with brackets escaped.
#[must_use]
pub fn link_label(name: &str) -> String {
    name.replace('[', "\\[").replace(']', "\\]")
}
