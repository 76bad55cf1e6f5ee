//! Configuration management for treedoc.
//!
//! Parses `treedoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `project.name`
//! - `project.repository`
//! - `diagrams.server_url`
//! - `diagrams.kroki_url`
//! - `site.theme`

mod expand;

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override project name.
    pub project_name: Option<String>,
    /// Override per-folder page generation.
    pub pages: Option<bool>,
    /// Override site generation.
    pub site: Option<bool>,
    /// Override aggregated markdown generation.
    pub aggregated_markdown: Option<bool>,
    /// Override aggregated PDF generation.
    pub aggregated_pdf: Option<bool>,
    /// Override per-folder PDF generation.
    pub pdf: Option<bool>,
    /// Override local image rendering.
    pub local_images: Option<bool>,
    /// Override Kroki URL for local image rendering.
    pub kroki_url: Option<String>,
    /// Override worker pool size.
    pub concurrency: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "treedoc.toml";

/// Default remote diagram service.
const DEFAULT_SERVER_URL: &str = "https://www.plantuml.com/plantuml";

/// Image formats accepted for diagram output.
const IMAGE_FORMATS: [&str; 2] = ["svg", "png"];

/// Application configuration.
///
/// Constructed once per run and passed explicitly to every component.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project information.
    pub project: ProjectConfig,
    /// Source tree scanning.
    pub source: SourceConfig,
    /// Output modes and file names.
    pub output: OutputConfig,
    /// Per-page navigation elements.
    pub navigation: NavigationConfig,
    /// Diagram resolution and rendering.
    pub diagrams: DiagramsConfig,
    /// Site shell settings.
    pub site: SiteConfig,
    /// PDF conversion settings.
    pub pdf: PdfConfig,
    /// Build execution settings.
    pub build: BuildConfig,

    /// Resolved paths (set after loading).
    #[serde(skip)]
    pub paths: PathsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Project information.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name used as document title and site name.
    pub name: String,
    /// Repository URL linked from the site shell.
    pub repository: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Documentation".to_owned(),
            repository: None,
        }
    }
}

/// Source tree scanning configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Source directory (relative to the config file).
    dir: Option<String>,
    /// Display name of the root folder.
    pub homepage_name: String,
    /// Entries starting with this prefix are skipped.
    pub exclude_prefix: String,
    /// Markdown fragment extension.
    pub markdown_extension: String,
    /// Diagram source extension.
    pub diagram_extension: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: None,
            homepage_name: "Home".to_owned(),
            exclude_prefix: "_".to_owned(),
            markdown_extension: "md".to_owned(),
            diagram_extension: "puml".to_owned(),
        }
    }
}

/// Output modes and file names.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct OutputConfig {
    /// Output directory (relative to the config file). Cleared on every build.
    dir: Option<String>,
    /// File name of per-folder pages.
    pub page_file: String,
    /// File name of site pages.
    pub site_page_file: String,
    /// File name of per-folder PDFs.
    pub pdf_file: String,
    /// Base name of aggregated documents (`.md` / `.pdf` appended).
    pub aggregated_file: String,
    /// Generate per-folder markdown pages.
    pub pages: bool,
    /// Generate the navigable site.
    pub site: bool,
    /// Generate the aggregated markdown document.
    pub aggregated_markdown: bool,
    /// Generate the aggregated PDF document.
    pub aggregated_pdf: bool,
    /// Generate per-folder PDFs.
    pub pdf: bool,
    /// Render diagrams to local image files instead of remote URLs.
    pub local_images: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            page_file: "README.md".to_owned(),
            site_page_file: "site.md".to_owned(),
            pdf_file: "README.pdf".to_owned(),
            aggregated_file: "documentation".to_owned(),
            pages: true,
            site: false,
            aggregated_markdown: false,
            aggregated_pdf: false,
            pdf: false,
            local_images: false,
        }
    }
}

impl OutputConfig {
    /// Whether any stage writes files below the output root.
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.pages
            || self.site
            || self.aggregated_markdown
            || self.aggregated_pdf
            || self.pdf
            || self.local_images
    }

    /// Whether any PDF stage is enabled.
    #[must_use]
    pub fn any_pdf(&self) -> bool {
        self.aggregated_pdf || self.pdf
    }
}

/// Navigation elements of per-folder pages.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct NavigationConfig {
    /// Show the folder path below the heading.
    pub breadcrumbs: bool,
    /// Show the whole-tree table of contents.
    pub toc: bool,
    /// Show a link to the parent page.
    pub parent_link: bool,
    /// Show links to child pages.
    pub children: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            breadcrumbs: true,
            toc: true,
            parent_link: true,
            children: true,
        }
    }
}

/// Diagram resolution and rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Remote rendering service base URL.
    pub server_url: String,
    /// Format of local images and remote URLs in markdown outputs.
    pub image_format: String,
    /// Remote format used by per-folder PDFs.
    pub pdf_remote_format: String,
    /// Place diagrams before markdown fragments.
    pub on_top: bool,
    /// Emit diagrams as links instead of embedded images.
    pub links: bool,
    /// Kroki server for local image rendering. Uses `command` when unset.
    pub kroki_url: Option<String>,
    /// Local rendering command; `{format}` is replaced with the image format.
    pub command: Vec<String>,
    /// Timeout for Kroki requests in seconds.
    pub timeout_secs: u64,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            image_format: "svg".to_owned(),
            pdf_remote_format: "png".to_owned(),
            on_top: false,
            links: false,
            kroki_url: None,
            command: ["plantuml", "-pipe", "-t{format}", "-charset", "UTF-8"]
                .map(str::to_owned)
                .to_vec(),
            timeout_secs: 30,
        }
    }
}

/// Site shell configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Theme stylesheet URL.
    pub theme: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            theme: "https://cdn.jsdelivr.net/npm/docsify@4/lib/themes/vue.css".to_owned(),
        }
    }
}

/// PDF conversion configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Paper size passed to the converter (e.g. `A4`, `Letter`).
    pub paper_format: String,
    /// Stylesheet path (relative to the config file).
    stylesheet: Option<String>,
    /// Converter command. Placeholders: `{input}`, `{paper}`, `{stylesheet}`.
    /// The PDF is read from the command's stdout.
    pub command: Vec<String>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            paper_format: "A4".to_owned(),
            stylesheet: None,
            command: [
                "pandoc",
                "{input}",
                "--from=gfm",
                "--pdf-engine=wkhtmltopdf",
                "--pdf-engine-opt=--enable-local-file-access",
                "--pdf-engine-opt=--page-size",
                "--pdf-engine-opt={paper}",
                "--css={stylesheet}",
                "--output=-",
            ]
            .map(str::to_owned)
            .to_vec(),
        }
    }
}

/// Build execution configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Maximum concurrent jobs per stage (default: available parallelism).
    pub concurrency: Option<usize>,
}

/// Resolved paths.
#[derive(Debug, Default)]
pub struct PathsConfig {
    /// Source directory.
    pub source_dir: PathBuf,
    /// Output directory.
    pub output_dir: PathBuf,
    /// PDF stylesheet.
    pub stylesheet: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`project.repository`").
        field: String,
        /// Error message (e.g., "${`REPO_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a plain file name (no path separators).
fn require_file_name(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if value.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "{field} must be a file name, not a path"
        )));
    }
    Ok(())
}

/// Require a supported image format.
fn require_image_format(value: &str, field: &str) -> Result<(), ConfigError> {
    if !IMAGE_FORMATS.contains(&value.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::Validation(format!(
            "{field} must be one of: {}",
            IMAGE_FORMATS.join(", ")
        )));
    }
    Ok(())
}

/// Absolute form of `path` with `.` and `..` resolved.
///
/// Relative paths are taken from the current directory. The longest existing
/// prefix is canonicalized so symlinked spellings compare equal.
fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    canonical_prefix(&lexical).unwrap_or(lexical)
}

/// Canonicalize the longest existing ancestor of `path` and re-append the rest.
fn canonical_prefix(path: &Path) -> Option<PathBuf> {
    let mut missing = Vec::new();
    let mut existing = path;
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return Some(missing.iter().rev().fold(canonical, |acc, name| acc.join(name)));
        }
        missing.push(existing.file_name()?);
        existing = existing.parent()?;
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `treedoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The final
    /// configuration is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(config_path, cli_settings)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration for scanning the source tree only.
    ///
    /// Like [`Config::load`], but only the `[source]` section is validated.
    /// Output, diagram and PDF settings are not used by a scan and may be
    /// incomplete.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the source settings are invalid.
    pub fn load_for_scan(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(config_path, cli_settings)?;
        config.validate_source()?;
        Ok(config)
    }

    fn load_unvalidated(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.paths.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.paths.output_dir.clone_from(output_dir);
        }
        if let Some(name) = &settings.project_name {
            self.project.name.clone_from(name);
        }
        let flags = [
            (settings.pages, &mut self.output.pages),
            (settings.site, &mut self.output.site),
            (settings.aggregated_markdown, &mut self.output.aggregated_markdown),
            (settings.aggregated_pdf, &mut self.output.aggregated_pdf),
            (settings.pdf, &mut self.output.pdf),
            (settings.local_images, &mut self.output.local_images),
        ];
        for (value, flag) in flags {
            if let Some(value) = value {
                *flag = value;
            }
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams.kroki_url = Some(kroki_url.clone());
        }
        if let Some(concurrency) = settings.concurrency {
            self.build.concurrency = Some(concurrency);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        Self {
            project: ProjectConfig::default(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            navigation: NavigationConfig::default(),
            diagrams: DiagramsConfig::default(),
            site: SiteConfig::default(),
            pdf: PdfConfig::default(),
            build: BuildConfig::default(),
            paths: PathsConfig {
                source_dir: base.join("docs"),
                output_dir: base.join("dist"),
                stylesheet: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.project.name, "project.name")?;
        self.validate_source()?;
        self.validate_output()?;
        self.validate_diagrams()?;
        self.validate_pdf()?;
        self.validate_paths()?;

        if self.build.concurrency == Some(0) {
            return Err(ConfigError::Validation(
                "build.concurrency must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Validate source scanning configuration.
    fn validate_source(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.source.homepage_name, "source.homepage_name")?;
        require_non_empty(&self.source.exclude_prefix, "source.exclude_prefix")?;
        require_non_empty(&self.source.markdown_extension, "source.markdown_extension")?;
        require_non_empty(&self.source.diagram_extension, "source.diagram_extension")?;

        if self
            .source
            .markdown_extension
            .eq_ignore_ascii_case(&self.source.diagram_extension)
        {
            return Err(ConfigError::Validation(
                "source.markdown_extension and source.diagram_extension must differ".to_owned(),
            ));
        }
        Ok(())
    }

    /// Validate output configuration.
    fn validate_output(&self) -> Result<(), ConfigError> {
        let output = &self.output;
        require_file_name(&output.page_file, "output.page_file")?;
        require_file_name(&output.site_page_file, "output.site_page_file")?;
        require_file_name(&output.pdf_file, "output.pdf_file")?;
        require_file_name(&output.aggregated_file, "output.aggregated_file")?;

        // Both write into the same mirrored folders
        if output.pages && output.site && output.page_file == output.site_page_file {
            return Err(ConfigError::Validation(
                "output.page_file and output.site_page_file must differ when pages and site are both enabled"
                    .to_owned(),
            ));
        }
        Ok(())
    }

    /// Validate diagrams configuration.
    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        let diagrams = &self.diagrams;
        require_non_empty(&diagrams.server_url, "diagrams.server_url")?;
        require_http_url(&diagrams.server_url, "diagrams.server_url")?;
        require_image_format(&diagrams.image_format, "diagrams.image_format")?;
        require_image_format(&diagrams.pdf_remote_format, "diagrams.pdf_remote_format")?;

        if let Some(ref kroki_url) = diagrams.kroki_url {
            require_non_empty(kroki_url, "diagrams.kroki_url")?;
            require_http_url(kroki_url, "diagrams.kroki_url")?;
        }

        if self.output.local_images && diagrams.kroki_url.is_none() && diagrams.command.is_empty()
        {
            return Err(ConfigError::Validation(
                "local images require diagrams.kroki_url or diagrams.command".to_owned(),
            ));
        }

        if diagrams.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Validate PDF configuration.
    fn validate_pdf(&self) -> Result<(), ConfigError> {
        if !self.output.any_pdf() {
            return Ok(());
        }
        require_non_empty(&self.pdf.paper_format, "pdf.paper_format")?;
        if self.pdf.command.is_empty() {
            return Err(ConfigError::Validation(
                "pdf.command cannot be empty when PDF output is enabled".to_owned(),
            ));
        }
        Ok(())
    }

    /// Validate resolved paths.
    ///
    /// The output directory is removed at the start of every build, so it must
    /// not contain the source directory, the config file or the current
    /// directory. Paths are compared in absolute, normalized form.
    fn validate_paths(&self) -> Result<(), ConfigError> {
        let output_dir = normalize_path(&self.paths.output_dir);
        let mut protected = vec![("source directory", normalize_path(&self.paths.source_dir))];
        if let Some(config_dir) = self.config_path.as_deref().and_then(Path::parent) {
            protected.push(("config file directory", normalize_path(config_dir)));
        }
        if let Ok(cwd) = std::env::current_dir() {
            protected.push(("current directory", normalize_path(&cwd)));
        }

        for (what, path) in protected {
            if path.starts_with(&output_dir) {
                return Err(ConfigError::Validation(format!(
                    "output directory {} must not contain the {what} {}",
                    self.paths.output_dir.display(),
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.project.name = expand::expand_env(&self.project.name, "project.name")?;
        self.project.repository =
            expand::expand_opt(self.project.repository.as_deref(), "project.repository")?;
        self.diagrams.server_url =
            expand::expand_env(&self.diagrams.server_url, "diagrams.server_url")?;
        self.diagrams.kroki_url =
            expand::expand_opt(self.diagrams.kroki_url.as_deref(), "diagrams.kroki_url")?;
        self.site.theme = expand::expand_env(&self.site.theme, "site.theme")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.paths = PathsConfig {
            source_dir: resolve(self.source.dir.as_deref(), "docs"),
            output_dir: resolve(self.output.dir.as_deref(), "dist"),
            stylesheet: self.pdf.stylesheet.as_deref().map(|s| config_dir.join(s)),
        };
    }
}
