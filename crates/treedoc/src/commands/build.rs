//! `treedoc build` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::{Style, Term};
use treedoc_build::{BuildReport, Builder, Progress, Stage};
use treedoc_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover treedoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory, cleared before every build (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Project name used as document title (overrides config).
    #[arg(long, env = "TREEDOC_PROJECT_NAME")]
    project_name: Option<String>,

    /// Generate per-folder markdown pages (default: enabled).
    #[arg(long)]
    pages: Option<bool>,

    /// Disable per-folder markdown pages.
    #[arg(long, conflicts_with = "pages")]
    no_pages: bool,

    /// Generate the navigable site.
    #[arg(long)]
    site: Option<bool>,

    /// Disable the navigable site.
    #[arg(long, conflicts_with = "site")]
    no_site: bool,

    /// Generate the aggregated markdown document.
    #[arg(long)]
    aggregated_markdown: Option<bool>,

    /// Disable the aggregated markdown document.
    #[arg(long, conflicts_with = "aggregated_markdown")]
    no_aggregated_markdown: bool,

    /// Generate the aggregated PDF document.
    #[arg(long)]
    aggregated_pdf: Option<bool>,

    /// Disable the aggregated PDF document.
    #[arg(long, conflicts_with = "aggregated_pdf")]
    no_aggregated_pdf: bool,

    /// Generate per-folder PDFs.
    #[arg(long)]
    pdf: Option<bool>,

    /// Disable per-folder PDFs.
    #[arg(long, conflicts_with = "pdf")]
    no_pdf: bool,

    /// Render diagrams to local images instead of remote URLs.
    #[arg(long)]
    local_images: Option<bool>,

    /// Use remote diagram URLs.
    #[arg(long, conflicts_with = "local_images")]
    no_local_images: bool,

    /// Kroki server URL for local image rendering (overrides config).
    #[arg(long)]
    kroki_url: Option<String>,

    /// Number of parallel jobs (default: number of CPUs).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Enable verbose output (stage logs and timings).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any build stage fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            pages: resolve_flag(self.pages, self.no_pages),
            site: resolve_flag(self.site, self.no_site),
            aggregated_markdown: resolve_flag(self.aggregated_markdown, self.no_aggregated_markdown),
            aggregated_pdf: resolve_flag(self.aggregated_pdf, self.no_aggregated_pdf),
            pdf: resolve_flag(self.pdf, self.no_pdf),
            local_images: resolve_flag(self.local_images, self.no_local_images),
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            project_name: self.project_name,
            kroki_url: self.kroki_url,
            concurrency: self.jobs,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!("Source: {}", config.paths.source_dir.display()));
        output.info(&format!("Output: {}", config.paths.output_dir.display()));
        if config.output.local_images {
            match &config.diagrams.kroki_url {
                Some(kroki_url) => output.info(&format!("Diagrams: local images via {kroki_url}")),
                None => output.info(&format!(
                    "Diagrams: local images via {}",
                    config.diagrams.command.join(" ")
                )),
            }
        } else {
            output.info(&format!("Diagrams: {}", config.diagrams.server_url));
        }

        let report = Builder::new(&config)
            .with_progress(ConsoleProgress::new())
            .build()?;

        print_summary(&output, &report, self.verbose);
        output.success(&format!(
            "Built {} folders to {}",
            report.folders,
            config.paths.output_dir.display()
        ));
        Ok(())
    }
}

/// Resolve an `--x <bool>` / `--no-x` flag pair.
fn resolve_flag(value: Option<bool>, disabled: bool) -> Option<bool> {
    disabled.then_some(false).or(value)
}

fn print_summary(output: &Output, report: &BuildReport, verbose: bool) {
    if verbose {
        for timing in &report.stages {
            output.detail(&format!(
                "  {:<28} {:>5} items {:>8}",
                timing.stage.label(),
                timing.items,
                format_duration(timing.elapsed)
            ));
        }
    }
    output.detail(&format!(
        "{} folders, {} diagrams in {}",
        report.folders,
        report.diagrams,
        format_duration(report.total)
    ));
}

fn format_duration(elapsed: Duration) -> String {
    if elapsed.as_secs() >= 1 {
        format!("{:.2}s", elapsed.as_secs_f64())
    } else {
        format!("{}ms", elapsed.as_millis())
    }
}

/// Progress lines on stderr, with an in-place counter on terminals.
struct ConsoleProgress {
    term: Term,
    dim: Style,
}

impl ConsoleProgress {
    fn new() -> Self {
        Self {
            term: Term::stderr(),
            dim: Style::new().dim(),
        }
    }
}

impl Progress for ConsoleProgress {
    fn advanced(&self, stage: Stage, completed: usize, total: usize) {
        if self.term.is_term() {
            let _ = self.term.clear_line();
            let _ = self.term.write_str(&format!("{stage} {completed}/{total}"));
        }
    }

    fn stage_finished(&self, stage: Stage, elapsed: Duration) {
        if self.term.is_term() {
            let _ = self.term.clear_line();
        }
        let line = format!("{stage} ({})", format_duration(elapsed));
        let _ = self.term.write_line(&self.dim.apply_to(line).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_flag() {
        assert_eq!(resolve_flag(None, false), None);
        assert_eq!(resolve_flag(Some(true), false), Some(true));
        assert_eq!(resolve_flag(None, true), Some(false));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }
}
