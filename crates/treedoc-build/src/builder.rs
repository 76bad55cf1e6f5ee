//! Build orchestration.
//!
//! Stages run in a fixed order, each finishing before the next starts:
//! clean, scan, folders, images, pages, site, aggregated markdown, aggregated
//! PDF, per-folder PDFs. Per-node work inside a stage runs on the
//! [`WorkerPool`].

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use treedoc_config::Config;
use treedoc_diagrams::{
    CommandRasterizer, DiagramJob, DiagramMarkup, DiagramRef, DiagramResolver, ImageFormat,
    KrokiRasterizer, Rasterizer,
};
use treedoc_render::{
    AggregateDocument, AggregateFlavor, CommandPdfConverter, ContentOrder, FolderPages, FolderPdfs,
    ImageLinks, Navigation, OutputFile, PageAssembler, PageVariant, PdfConverter, PdfOptions,
    SiteRenderer, SiteSettings, convert_markdown,
};
use treedoc_tree::paths::output_dir;
use treedoc_tree::{Diagram, FolderNode, ScanOptions, Tree, build_tree, materialize_output_dirs};

use crate::error::BuildError;
use crate::pool::WorkerPool;
use crate::progress::{NoProgress, Progress, Stage};
use crate::report::BuildReport;

/// Runs a complete build for one configuration.
pub struct Builder<'a> {
    config: &'a Config,
    rasterizer: Box<dyn Rasterizer>,
    pdf_converter: Option<Box<dyn PdfConverter>>,
    progress: Box<dyn Progress>,
}

impl<'a> Builder<'a> {
    /// Create a builder with backends derived from `config`.
    ///
    /// Diagrams are rendered through Kroki when `diagrams.kroki_url` is set
    /// and through `diagrams.command` otherwise. PDFs use `pdf.command`.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        let diagrams = &config.diagrams;
        let rasterizer: Box<dyn Rasterizer> = match &diagrams.kroki_url {
            Some(url) => Box::new(
                KrokiRasterizer::new(url.clone())
                    .timeout(Duration::from_secs(diagrams.timeout_secs)),
            ),
            None => Box::new(CommandRasterizer::from_command(&diagrams.command).unwrap_or_default()),
        };
        let pdf_converter = CommandPdfConverter::from_command(&config.pdf.command)
            .map(|c| Box::new(c) as Box<dyn PdfConverter>);

        Self {
            config,
            rasterizer,
            pdf_converter,
            progress: Box::new(NoProgress),
        }
    }

    /// Replace the diagram rasterizer.
    #[must_use]
    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    /// Replace the PDF converter.
    #[must_use]
    pub fn with_pdf_converter(mut self, converter: impl PdfConverter + 'static) -> Self {
        self.pdf_converter = Some(Box::new(converter));
        self
    }

    /// Report progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: impl Progress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Run all enabled stages.
    ///
    /// The output root is removed and recreated first, even when no output
    /// mode is enabled.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage. Output written by earlier stages
    /// is left in place.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let started = Instant::now();
        let config = self.config;
        let output = &config.output;
        let output_root = config.paths.output_dir.as_path();
        let pool = WorkerPool::new(config.build.concurrency)?;
        let mut report = BuildReport::default();

        tracing::info!(
            source = %config.paths.source_dir.display(),
            output = %output_root.display(),
            threads = pool.threads(),
            "Starting build"
        );

        self.stage(&mut report, Stage::Clean, 1, || {
            clean_output(output_root)?;
            Ok(((), 1))
        })?;

        let tree = self.stage(&mut report, Stage::Scan, 1, || {
            let tree = build_tree(&config.paths.source_dir, &scan_options(config))?;
            let len = tree.len();
            Ok((tree, len))
        })?;
        report.folders = tree.len();
        report.diagrams = tree.diagram_count();

        if output.any_enabled() {
            self.stage(&mut report, Stage::Folders, tree.len(), || {
                Ok(((), materialize_output_dirs(&tree, output_root)?))
            })?;
        }

        if output.local_images {
            self.render_images(&mut report, &pool, &tree)?;
        }

        let temp_dir = if output.any_pdf() {
            Some(
                tempfile::Builder::new()
                    .prefix("treedoc-")
                    .tempdir()
                    .map_err(|e| BuildError::io(std::env::temp_dir(), e))?,
            )
        } else {
            None
        };

        if output.pages {
            self.render_pages(&mut report, &pool, &tree)?;
        }
        if output.site {
            self.render_site(&mut report, &pool, &tree)?;
        }
        if output.aggregated_markdown {
            self.render_aggregated_markdown(&mut report, &tree)?;
        }
        if let Some(temp_dir) = &temp_dir {
            if output.aggregated_pdf {
                self.render_aggregated_pdf(&mut report, &tree, temp_dir)?;
            }
            if output.pdf {
                self.render_pdfs(&mut report, &pool, &tree, temp_dir)?;
            }
        }

        report.total = started.elapsed();
        tracing::info!(
            folders = report.folders,
            diagrams = report.diagrams,
            elapsed_ms = report.total.as_millis(),
            "Build completed"
        );
        Ok(report)
    }

    /// Time one stage and record it in `report`.
    ///
    /// `body` returns the stage result and the number of processed items.
    fn stage<T>(
        &self,
        report: &mut BuildReport,
        stage: Stage,
        total: usize,
        body: impl FnOnce() -> Result<(T, usize), BuildError>,
    ) -> Result<T, BuildError> {
        tracing::info!(stage = %stage, total, "Stage started");
        self.progress.stage_started(stage, total);
        let started = Instant::now();

        let (value, items) = body()?;

        let elapsed = started.elapsed();
        self.progress.stage_finished(stage, elapsed);
        report.record(stage, elapsed, items);
        tracing::info!(stage = %stage, items, elapsed_ms = elapsed.as_millis(), "Stage finished");
        Ok(value)
    }

    /// Run `job` for every item of a stage on the pool with progress.
    fn run_jobs<T: Sync>(
        &self,
        report: &mut BuildReport,
        pool: &WorkerPool,
        stage: Stage,
        items: &[T],
        job: impl Fn(&T) -> Result<(), BuildError> + Sync,
    ) -> Result<(), BuildError> {
        self.stage(report, stage, items.len(), || {
            pool.run(items, &job, |done, total| {
                self.progress.advanced(stage, done, total);
            })?;
            Ok(((), items.len()))
        })
    }

    fn render_images(
        &self,
        report: &mut BuildReport,
        pool: &WorkerPool,
        tree: &Tree,
    ) -> Result<(), BuildError> {
        let format = image_format(&self.config.diagrams.image_format);
        let output_root = self.config.paths.output_dir.as_path();
        let diagrams: Vec<(&FolderNode, &Diagram)> = tree
            .iter()
            .flat_map(|node| node.diagrams.iter().map(move |d| (node, d)))
            .collect();

        self.run_jobs(report, pool, Stage::Images, &diagrams, |(node, diagram)| {
            let job = DiagramJob {
                source_path: &diagram.path,
                name: &diagram.name,
                source: &diagram.source,
                format,
            };
            let image = self.rasterizer.rasterize(&job)?;
            let file_name = DiagramRef::from_node(node, diagram).image_file_name(format);
            let path = output_dir(output_root, &node.rel_path).join(file_name);
            write_file(&OutputFile::new(path, image))
        })
    }

    fn render_pages(
        &self,
        report: &mut BuildReport,
        pool: &WorkerPool,
        tree: &Tree,
    ) -> Result<(), BuildError> {
        let config = self.config;
        let resolver = self.markdown_resolver();
        let variant = PageVariant {
            images: ImageLinks::PageRelative,
            markup: DiagramMarkup::from_links(config.diagrams.links),
            order: self.content_order(),
            navigation: self.navigation(),
        };
        let pages = FolderPages::new(
            PageAssembler::new(tree, &resolver, &config.output.page_file, variant),
            &config.paths.output_dir,
        );

        self.run_jobs(report, pool, Stage::Pages, tree.nodes(), |node| {
            write_file(&pages.render(node))
        })
    }

    fn render_site(
        &self,
        report: &mut BuildReport,
        pool: &WorkerPool,
        tree: &Tree,
    ) -> Result<(), BuildError> {
        let config = self.config;
        let resolver = self.markdown_resolver();
        let settings = SiteSettings {
            project_name: &config.project.name,
            repository: config.project.repository.as_deref(),
            theme: &config.site.theme,
            page_file: &config.output.site_page_file,
        };
        let site = SiteRenderer::new(
            tree,
            &resolver,
            config.diagrams.links,
            self.content_order(),
            settings,
            &config.paths.output_dir,
        );

        self.run_jobs(report, pool, Stage::Site, tree.nodes(), |node| {
            write_file(&site.page(node))
        })?;
        for file in site.fixed_files() {
            write_file(&file)?;
        }
        Ok(())
    }

    fn render_aggregated_markdown(
        &self,
        report: &mut BuildReport,
        tree: &Tree,
    ) -> Result<(), BuildError> {
        let config = self.config;
        let resolver = self.markdown_resolver();
        let variant = self.aggregate_variant(ImageLinks::DocumentRoot);
        let assembler = PageAssembler::new(tree, &resolver, &config.output.page_file, variant);

        self.stage(report, Stage::AggregatedMarkdown, 1, || {
            let document =
                AggregateDocument::new(assembler, &config.project.name, AggregateFlavor::Markdown)
                    .render();
            let path = config
                .paths
                .output_dir
                .join(format!("{}.md", config.output.aggregated_file));
            write_file(&OutputFile::text(path, document))?;
            Ok(((), 1))
        })
    }

    fn render_aggregated_pdf(
        &self,
        report: &mut BuildReport,
        tree: &Tree,
        temp_dir: &TempDir,
    ) -> Result<(), BuildError> {
        let config = self.config;
        let converter = self.pdf_converter()?;
        let resolver = self.markdown_resolver();
        let variant = self.aggregate_variant(self.output_root_links());
        let assembler = PageAssembler::new(tree, &resolver, &config.output.page_file, variant);
        let options = self.pdf_options();

        self.stage(report, Stage::AggregatedPdf, 1, || {
            let document =
                AggregateDocument::new(assembler, &config.project.name, AggregateFlavor::Pdf).render();
            let pdf = convert_markdown(converter, &document, temp_dir.path(), &options)?;
            let path = config
                .paths
                .output_dir
                .join(format!("{}.pdf", config.output.aggregated_file));
            write_file(&OutputFile::new(path, pdf))?;
            Ok(((), 1))
        })
    }

    fn render_pdfs(
        &self,
        report: &mut BuildReport,
        pool: &WorkerPool,
        tree: &Tree,
        temp_dir: &TempDir,
    ) -> Result<(), BuildError> {
        let config = self.config;
        let converter = self.pdf_converter()?;
        let resolver = self.resolver(image_format(&config.diagrams.pdf_remote_format));
        let variant = PageVariant {
            images: self.output_root_links(),
            markup: DiagramMarkup::from_links(config.diagrams.links),
            order: self.content_order(),
            navigation: self.navigation(),
        };
        let options = self.pdf_options();
        let pdfs = FolderPdfs::new(
            PageAssembler::new(tree, &resolver, &config.output.page_file, variant),
            converter,
            &options,
            &config.paths.output_dir,
            &config.output.pdf_file,
            temp_dir.path(),
        );

        self.run_jobs(report, pool, Stage::Pdf, tree.nodes(), |node| {
            write_file(&pdfs.render(node)?)
        })
    }

    /// Resolver for markdown outputs: vector format when remote.
    fn markdown_resolver(&self) -> DiagramResolver {
        self.resolver(ImageFormat::Svg)
    }

    /// Resolver using local images, or the remote service with `remote_format`.
    fn resolver(&self, remote_format: ImageFormat) -> DiagramResolver {
        let diagrams = &self.config.diagrams;
        if self.config.output.local_images {
            DiagramResolver::local(image_format(&diagrams.image_format))
        } else {
            DiagramResolver::remote(diagrams.server_url.clone(), remote_format)
        }
    }

    fn output_root_links(&self) -> ImageLinks {
        ImageLinks::OutputRoot(self.config.paths.output_dir.to_string_lossy().into_owned())
    }

    fn content_order(&self) -> ContentOrder {
        ContentOrder::from_diagrams_on_top(self.config.diagrams.on_top)
    }

    fn navigation(&self) -> Navigation {
        let nav = &self.config.navigation;
        Navigation {
            breadcrumb: nav.breadcrumbs,
            toc: nav.toc,
            parent_link: nav.parent_link,
            children: nav.children,
        }
    }

    fn aggregate_variant(&self, images: ImageLinks) -> PageVariant {
        PageVariant {
            images,
            markup: DiagramMarkup::from_links(self.config.diagrams.links),
            order: self.content_order(),
            navigation: Navigation {
                breadcrumb: self.config.navigation.breadcrumbs,
                ..Navigation::NONE
            },
        }
    }

    fn pdf_converter(&self) -> Result<&dyn PdfConverter, BuildError> {
        self.pdf_converter
            .as_deref()
            .ok_or(BuildError::MissingPdfConverter)
    }

    fn pdf_options(&self) -> PdfOptions {
        PdfOptions {
            paper_format: self.config.pdf.paper_format.clone(),
            stylesheet: self.config.paths.stylesheet.clone(),
        }
    }
}

/// Scan options from the `[source]` section of `config`.
#[must_use]
pub fn scan_options(config: &Config) -> ScanOptions {
    let source = &config.source;
    ScanOptions {
        homepage_name: source.homepage_name.clone(),
        exclude_prefix: source.exclude_prefix.clone(),
        markdown_extension: source.markdown_extension.clone(),
        diagram_extension: source.diagram_extension.clone(),
    }
}

/// Parse a validated image format.
fn image_format(value: &str) -> ImageFormat {
    ImageFormat::parse(value).unwrap_or_default()
}

/// Remove the output root with everything below it and recreate it empty.
fn clean_output(output_root: &Path) -> Result<(), BuildError> {
    match fs::remove_dir_all(output_root) {
        Ok(()) => tracing::debug!(output = %output_root.display(), "Removed previous output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(BuildError::io(output_root, e)),
    }
    fs::create_dir_all(output_root).map_err(|e| BuildError::io(output_root, e))
}

fn write_file(file: &OutputFile) -> Result<(), BuildError> {
    file.write().map_err(|e| BuildError::io(&file.path, e))
}
