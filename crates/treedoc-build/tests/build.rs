//! End-to-end builds over temporary source trees.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use treedoc_build::{BuildError, Builder, Progress, Stage};
use treedoc_config::Config;
use treedoc_diagrams::{DiagramError, DiagramJob, Rasterizer};
use treedoc_render::{PdfConverter, PdfError, PdfOptions};

/// Returns a fake image naming the diagram and format.
struct StubRasterizer;

impl Rasterizer for StubRasterizer {
    fn rasterize(&self, job: &DiagramJob<'_>) -> Result<Vec<u8>, DiagramError> {
        Ok(format!("<{} {}>", job.format, job.name).into_bytes())
    }
}

/// Records the source path of every job.
#[derive(Clone, Default)]
struct PathRecorder {
    paths: Arc<Mutex<Vec<PathBuf>>>,
}

impl Rasterizer for PathRecorder {
    fn rasterize(&self, job: &DiagramJob<'_>) -> Result<Vec<u8>, DiagramError> {
        self.paths.lock().unwrap().push(job.source_path.to_path_buf());
        Ok(Vec::new())
    }
}

struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn rasterize(&self, job: &DiagramJob<'_>) -> Result<Vec<u8>, DiagramError> {
        Err(DiagramError::EmptyOutput {
            name: job.name.to_owned(),
        })
    }
}

/// "Converts" by prefixing the markdown with a PDF header.
struct StubConverter;

impl PdfConverter for StubConverter {
    fn convert(&self, markdown_path: &Path, options: &PdfOptions) -> Result<Vec<u8>, PdfError> {
        let mut pdf = format!("%PDF {}\n", options.paper_format).into_bytes();
        pdf.extend(fs::read(markdown_path).unwrap());
        Ok(pdf)
    }
}

#[derive(Clone, Default)]
struct RecordingProgress {
    events: Arc<Mutex<Vec<(Stage, usize)>>>,
    advanced: Arc<Mutex<Vec<(Stage, usize, usize)>>>,
}

impl Progress for RecordingProgress {
    fn stage_started(&self, stage: Stage, total: usize) {
        self.events.lock().unwrap().push((stage, total));
    }

    fn advanced(&self, stage: Stage, completed: usize, total: usize) {
        self.advanced.lock().unwrap().push((stage, completed, total));
    }

    fn stage_finished(&self, _stage: Stage, _elapsed: Duration) {}
}

struct Project {
    dir: tempfile::TempDir,
    config: Config,
}

impl Project {
    /// Project with only per-folder pages enabled.
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        let mut config = Config::default_with_base(dir.path());
        config.build.concurrency = Some(2);
        Self { dir, config }
    }

    fn write(&self, rel: &str, contents: &str) {
        let path = self.source().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn source(&self) -> PathBuf {
        self.dir.path().join("docs")
    }

    fn output(&self) -> PathBuf {
        self.dir.path().join("dist")
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.output().join(rel)).unwrap()
    }
}

const FLOW: &str = "@startuml\nA -> B\n@enduml\n";

#[test]
fn pages_mirror_tree_and_skip_excluded_folders() {
    let project = Project::new();
    project.write("README.md", "Hello");
    project.write("child/README.md", "World");
    project.write("_hidden/README.md", "Skip");

    let report = Builder::new(&project.config).build().unwrap();

    assert_eq!(report.folders, 2);
    let root = project.read("README.md");
    let child = project.read("child/README.md");
    assert!(root.starts_with("# Home\n\n- **[Home](README.md)**"));
    assert!(!root.contains('`'));
    assert!(root.contains("Hello"));
    assert!(child.starts_with("# child\n\n`/child`\n"));
    assert!(child.contains("[Up: Home](../README.md)"));
    assert!(child.contains("World"));
    assert!(!root.contains("Skip") && !child.contains("Skip"));
    assert!(!project.output().join("_hidden").exists());
}

#[test]
fn remote_diagram_on_top_precedes_text() {
    let mut project = Project::new();
    project.write("README.md", "Text");
    project.write("flow.puml", FLOW);
    project.config.diagrams.on_top = true;

    Builder::new(&project.config).build().unwrap();

    let page = project.read("README.md");
    let diagram = page.find("![flow](https://www.plantuml.com/plantuml/svg/").unwrap();
    let text = page.find("Text").unwrap();
    assert!(diagram < text);
}

#[test]
fn every_page_lists_whole_tree() {
    let project = Project::new();
    for dir in ["a", "a/b", "c", "c/d/e"] {
        project.write(&format!("{dir}/README.md"), dir);
    }

    Builder::new(&project.config).build().unwrap();

    let pages = ["README.md", "a/README.md", "a/b/README.md", "c/README.md", "c/d/README.md", "c/d/e/README.md"];
    for page in pages {
        let text = project.read(page);
        let blocks: Vec<_> = text.split("\n\n").collect();
        let toc = blocks.iter().find(|b| b.contains("- **[")).unwrap();
        let entries = toc.lines().filter(|l| l.trim_start().starts_with("- ")).count();
        assert_eq!(entries, pages.len(), "{page}");

        let children = match page {
            "README.md" => 2,
            "c/README.md" | "a/README.md" | "c/d/README.md" => 1,
            _ => 0,
        };
        let listed = blocks
            .iter()
            .find(|b| b.starts_with("Subfolders:"))
            .map_or(0, |b| b.lines().count() - 1);
        assert_eq!(listed, children, "{page}");
    }
}

#[test]
fn aggregated_markdown_has_section_per_folder() {
    let mut project = Project::new();
    project.write("README.md", "Intro");
    project.write("api/README.md", "Endpoints");
    project.write("api/v2/README.md", "Next");
    project.config.output.pages = false;
    project.config.output.aggregated_markdown = true;
    project.config.project.name = "Billing".to_owned();

    Builder::new(&project.config).build().unwrap();

    let doc = project.read("documentation.md");
    assert!(doc.starts_with("# Billing\n"));
    assert_eq!(doc.lines().filter(|l| l.starts_with("## ")).count(), 3);
    assert_eq!(doc.lines().filter(|l| l.trim_start().starts_with("- [")).count(), 3);
    assert_eq!(doc.matches("[Back to top](#billing)").count(), 3);
    assert!(doc.contains("- [api](#api)"));
    assert!(!project.output().join("README.md").exists());
}

#[test]
fn local_images_are_rendered_and_referenced() {
    let mut project = Project::new();
    project.write("guide/README.md", "Guide");
    project.write("guide/flow.puml", FLOW);
    project.config.output.local_images = true;
    project.config.output.aggregated_markdown = true;

    let report = Builder::new(&project.config)
        .with_rasterizer(StubRasterizer)
        .build()
        .unwrap();

    assert_eq!(report.diagrams, 1);
    assert_eq!(project.read("guide/flow.svg"), "<svg flow>");
    assert!(project.read("guide/README.md").contains("![flow](flow.svg)"));
    assert!(project.read("documentation.md").contains("![flow](guide/flow.svg)"));
}

#[test]
fn rasterizer_receives_real_source_path() {
    let mut project = Project::new();
    project.write("guide/Flow.PUML", FLOW);
    project.config.output.local_images = true;
    let recorder = PathRecorder::default();

    Builder::new(&project.config)
        .with_rasterizer(recorder.clone())
        .build()
        .unwrap();

    let paths = recorder.paths.lock().unwrap();
    assert_eq!(*paths, vec![project.source().join("guide").join("Flow.PUML")]);
    assert!(project.output().join("guide").join("Flow.svg").is_file());
}

#[test]
fn rasterizer_failure_fails_build() {
    let mut project = Project::new();
    project.write("flow.puml", FLOW);
    project.config.output.local_images = true;

    let err = Builder::new(&project.config)
        .with_rasterizer(FailingRasterizer)
        .build()
        .unwrap_err();

    assert!(matches!(err, BuildError::Diagram(_)));
}

#[test]
fn site_writes_pages_sidebar_and_shell() {
    let mut project = Project::new();
    project.write("README.md", "Hello");
    project.write("guide/README.md", "Guide");
    project.config.output.site = true;
    project.config.project.repository = Some("https://github.com/example/docs".to_owned());

    Builder::new(&project.config).build().unwrap();

    assert_eq!(project.read("site.md"), "# Home\n\nHello\n");
    assert_eq!(project.read("guide/site.md"), "# guide\n\nGuide\n");
    assert_eq!(project.read("_sidebar.md"), "- [Home](site.md)\n  - [guide](guide/site.md)\n");
    let shell = project.read("index.html");
    assert!(shell.contains("loadSidebar: true"));
    assert!(shell.contains("repo: \"https://github.com/example/docs\""));
    assert!(project.output().join(".nojekyll").is_file());
    // Per-folder pages are still written next to site pages
    assert!(project.output().join("guide").join("README.md").is_file());
}

#[test]
fn pdfs_are_converted_per_folder_and_aggregated() {
    let mut project = Project::new();
    project.write("README.md", "Hello");
    project.write("guide/README.md", "Guide");
    project.write("guide/flow.puml", FLOW);
    project.config.output.pages = false;
    project.config.output.pdf = true;
    project.config.output.aggregated_pdf = true;
    project.config.output.local_images = true;
    project.config.pdf.paper_format = "Letter".to_owned();

    Builder::new(&project.config)
        .with_rasterizer(StubRasterizer)
        .with_pdf_converter(StubConverter)
        .build()
        .unwrap();

    let output_root = project.output().to_string_lossy().into_owned();
    let guide = project.read("guide/README.pdf");
    assert!(guide.starts_with("%PDF Letter\n# guide\n"));
    assert!(guide.contains(&format!("![flow]({output_root}/guide/flow.svg)")));
    assert!(project.output().join("README.pdf").is_file());

    let aggregated = project.read("documentation.pdf");
    assert!(aggregated.starts_with("%PDF Letter\n# Documentation\n\n- Home\n  - guide\n"));
    assert!(!aggregated.contains("Back to top"));
    assert!(!project.output().join("README.md").exists());
}

#[test]
fn per_folder_pdf_uses_raster_remote_format() {
    let mut project = Project::new();
    project.write("flow.puml", FLOW);
    project.config.output.pdf = true;

    Builder::new(&project.config)
        .with_pdf_converter(StubConverter)
        .build()
        .unwrap();

    assert!(project.read("README.md").contains("/plantuml/svg/"));
    assert!(project.read("README.pdf").contains("/plantuml/png/"));
}

#[test]
fn output_root_is_cleaned_even_without_modes() {
    let mut project = Project::new();
    project.write("README.md", "Hello");
    fs::create_dir_all(project.output().join("stale")).unwrap();
    fs::write(project.output().join("stale").join("old.md"), "old").unwrap();
    project.config.output.pages = false;

    let report = Builder::new(&project.config).build().unwrap();

    assert!(project.output().is_dir());
    assert_eq!(fs::read_dir(project.output()).unwrap().count(), 0);
    assert_eq!(report.executed().collect::<Vec<_>>(), vec![Stage::Clean, Stage::Scan]);
}

#[test]
fn stages_run_in_order_with_progress() {
    let mut project = Project::new();
    project.write("README.md", "Hello");
    project.write("a/README.md", "A");
    project.write("a/flow.puml", FLOW);
    project.config.output.site = true;
    project.config.output.aggregated_markdown = true;
    project.config.output.local_images = true;
    let progress = RecordingProgress::default();

    let report = Builder::new(&project.config)
        .with_rasterizer(StubRasterizer)
        .with_progress(progress.clone())
        .build()
        .unwrap();

    let expected = vec![
        (Stage::Clean, 1),
        (Stage::Scan, 1),
        (Stage::Folders, 2),
        (Stage::Images, 1),
        (Stage::Pages, 2),
        (Stage::Site, 2),
        (Stage::AggregatedMarkdown, 1),
    ];
    assert_eq!(*progress.events.lock().unwrap(), expected);
    assert_eq!(
        report.executed().collect::<Vec<_>>(),
        expected.iter().map(|(s, _)| *s).collect::<Vec<_>>()
    );

    let mut pages: Vec<_> = progress
        .advanced
        .lock()
        .unwrap()
        .iter()
        .filter(|(stage, _, _)| *stage == Stage::Pages)
        .map(|(_, done, total)| (*done, *total))
        .collect();
    pages.sort_unstable();
    assert_eq!(pages, vec![(1, 2), (2, 2)]);
    assert!(report.total >= report.stages.iter().map(|t| t.elapsed).sum::<Duration>());
}

#[test]
fn missing_source_root_fails() {
    let project = Project::new();
    fs::remove_dir(project.source()).unwrap();

    let err = Builder::new(&project.config).build().unwrap_err();

    assert!(matches!(err, BuildError::Tree(_)));
}
