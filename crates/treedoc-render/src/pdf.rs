//! PDF conversion of rendered markdown.
//!
//! Conversion is delegated to an external tool through [`PdfConverter`].
//! Markdown is handed over as a temporary file that is removed when the
//! conversion finishes, whether it succeeded or not.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use treedoc_tree::FolderNode;
use treedoc_tree::paths::output_dir;

use crate::assembly::PageAssembler;
use crate::output::OutputFile;

/// Placeholder for the markdown input path.
const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder for the paper format.
const PAPER_PLACEHOLDER: &str = "{paper}";
/// Placeholder for the stylesheet path. Arguments containing it are dropped
/// when no stylesheet is configured.
const STYLESHEET_PLACEHOLDER: &str = "{stylesheet}";

/// PDF conversion error.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// Temporary markdown file could not be written.
    #[error("Failed to write temporary markdown in {}: {source}", dir.display())]
    TempFile {
        /// Directory of the temporary file.
        dir: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Converter failed to start or exited unsuccessfully.
    #[error("PDF converter '{program}' failed for {}: {message}", input.display())]
    Command {
        /// Converter program.
        program: String,
        /// Markdown input.
        input: PathBuf,
        /// Error details.
        message: String,
    },
    /// Converter produced no output.
    #[error("PDF converter produced no output for {}", .0.display())]
    EmptyOutput(PathBuf),
}

/// Page and styling options for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOptions {
    /// Paper size (e.g. `A4`).
    pub paper_format: String,
    /// Stylesheet applied to the document.
    pub stylesheet: Option<PathBuf>,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            paper_format: "A4".to_owned(),
            stylesheet: None,
        }
    }
}

/// Converts a markdown file to PDF bytes.
///
/// Shared across worker threads during a build.
pub trait PdfConverter: Send + Sync {
    /// Convert the markdown file at `markdown_path`.
    fn convert(&self, markdown_path: &Path, options: &PdfOptions) -> Result<Vec<u8>, PdfError>;
}

/// Converter running an external command that writes the PDF to stdout.
#[derive(Debug, Clone)]
pub struct CommandPdfConverter {
    program: String,
    args: Vec<String>,
}

impl CommandPdfConverter {
    /// Create a converter for `program` with argument templates.
    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a converter from a full command line. Returns `None` when empty.
    #[must_use]
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }

    /// Arguments with placeholders substituted.
    fn resolved_args(&self, input: &Path, options: &PdfOptions) -> Vec<String> {
        let input = input.to_string_lossy();
        let stylesheet = options
            .stylesheet
            .as_deref()
            .map(|s| s.to_string_lossy().into_owned());

        self.args
            .iter()
            .filter_map(|arg| {
                let arg = if arg.contains(STYLESHEET_PLACEHOLDER) {
                    arg.replace(STYLESHEET_PLACEHOLDER, stylesheet.as_deref()?)
                } else {
                    arg.clone()
                };
                Some(
                    arg.replace(INPUT_PLACEHOLDER, &input)
                        .replace(PAPER_PLACEHOLDER, &options.paper_format),
                )
            })
            .collect()
    }
}

impl PdfConverter for CommandPdfConverter {
    fn convert(&self, markdown_path: &Path, options: &PdfOptions) -> Result<Vec<u8>, PdfError> {
        let command_error = |message: String| PdfError::Command {
            program: self.program.clone(),
            input: markdown_path.to_path_buf(),
            message,
        };

        let output = Command::new(&self.program)
            .args(self.resolved_args(markdown_path, options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| command_error(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(command_error(format!("{}: {}", output.status, stderr.trim())));
        }
        if output.stdout.is_empty() {
            return Err(PdfError::EmptyOutput(markdown_path.to_path_buf()));
        }
        Ok(output.stdout)
    }
}

/// Convert `markdown` through a temporary file in `temp_dir`.
///
/// The temporary file is deleted on return, including when conversion fails.
///
/// # Errors
///
/// Returns [`PdfError::TempFile`] if the temporary file cannot be written and
/// any error of the converter.
pub fn convert_markdown(
    converter: &dyn PdfConverter,
    markdown: &str,
    temp_dir: &Path,
    options: &PdfOptions,
) -> Result<Vec<u8>, PdfError> {
    let temp_error = |source| PdfError::TempFile {
        dir: temp_dir.to_path_buf(),
        source,
    };

    let mut file = tempfile::Builder::new()
        .prefix("treedoc-")
        .suffix(".md")
        .tempfile_in(temp_dir)
        .map_err(temp_error)?;
    file.write_all(markdown.as_bytes()).map_err(temp_error)?;
    file.flush().map_err(temp_error)?;

    let pdf = converter.convert(file.path(), options)?;
    tracing::debug!(input = %file.path().display(), bytes = pdf.len(), "Converted markdown to PDF");
    Ok(pdf)
}

/// Per-folder PDF renderer.
///
/// Uses the same page layout as the markdown pages; the assembler should
/// link images from the output root so the converter can resolve them.
pub struct FolderPdfs<'a> {
    assembler: PageAssembler<'a>,
    converter: &'a dyn PdfConverter,
    options: &'a PdfOptions,
    output_root: &'a Path,
    pdf_file: &'a str,
    temp_dir: &'a Path,
}

impl<'a> FolderPdfs<'a> {
    /// Create a renderer converting pages with `converter`.
    #[must_use]
    pub fn new(
        assembler: PageAssembler<'a>,
        converter: &'a dyn PdfConverter,
        options: &'a PdfOptions,
        output_root: &'a Path,
        pdf_file: &'a str,
        temp_dir: &'a Path,
    ) -> Self {
        Self {
            assembler,
            converter,
            options,
            output_root,
            pdf_file,
            temp_dir,
        }
    }

    /// PDF of `node` at `<output root>/<rel path>/<pdf file>`.
    ///
    /// # Errors
    ///
    /// Returns the conversion error.
    pub fn render(&self, node: &FolderNode) -> Result<OutputFile, PdfError> {
        let markdown = self.assembler.page(node);
        let pdf = convert_markdown(self.converter, &markdown, self.temp_dir, self.options)?;
        let path = output_dir(self.output_root, &node.rel_path).join(self.pdf_file);
        Ok(OutputFile::new(path, pdf))
    }
}
