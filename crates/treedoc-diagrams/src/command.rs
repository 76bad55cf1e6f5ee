//! Local command rasterizer.
//!
//! Pipes the diagram source into a `PlantUML`-compatible command
//! (`plantuml -pipe -tsvg` by default) and collects the image from stdout.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::DiagramError;
use crate::rasterizer::{DiagramJob, Rasterizer};

/// Placeholder replaced with the output format in command arguments.
const FORMAT_PLACEHOLDER: &str = "{format}";

/// Rasterizer running an external command per diagram.
#[derive(Debug, Clone)]
pub struct CommandRasterizer {
    program: String,
    args: Vec<String>,
}

impl Default for CommandRasterizer {
    fn default() -> Self {
        Self::new("plantuml", ["-pipe", "-t{format}", "-charset", "UTF-8"])
    }
}

impl CommandRasterizer {
    /// Create a rasterizer for `program` with `args`.
    ///
    /// `{format}` in arguments is replaced with the requested image format.
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

    /// Create a rasterizer from a full command line (program followed by args).
    ///
    /// Returns `None` for an empty command.
    #[must_use]
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }

    /// Arguments for a job with placeholders substituted.
    fn job_args(&self, job: &DiagramJob<'_>) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.replace(FORMAT_PLACEHOLDER, job.format.as_str()))
            .collect()
    }
}

impl Rasterizer for CommandRasterizer {
    fn rasterize(&self, job: &DiagramJob<'_>) -> Result<Vec<u8>, DiagramError> {
        let command_error = |message: String| DiagramError::Command {
            name: job.name.to_owned(),
            program: self.program.clone(),
            message,
        };

        let mut child = Command::new(&self.program)
            .args(self.job_args(job))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_error(e.to_string()))?;

        // Feed stdin from a separate thread so a renderer that writes before
        // reading all input cannot deadlock on a full pipe.
        let stdin = child.stdin.take();
        let output = std::thread::scope(|scope| {
            scope.spawn(move || {
                if let Some(mut stdin) = stdin {
                    let _ = stdin.write_all(job.source.as_bytes());
                }
            });
            child.wait_with_output()
        })
        .map_err(|e| command_error(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(command_error(format!("{}: {}", output.status, stderr.trim())));
        }
        if output.stdout.is_empty() {
            return Err(DiagramError::EmptyOutput {
                name: job.name.to_owned(),
            });
        }

        tracing::debug!(
            path = %job.source_path.display(),
            bytes = output.stdout.len(),
            "Diagram rendered via command"
        );
        Ok(output.stdout)
    }
}
