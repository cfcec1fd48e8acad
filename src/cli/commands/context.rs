//! Project resolution shared by every command that reads the catalogs.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};

use super::super::args::CommonArgs;
use crate::config::{CONFIG_FILE_NAME, Config, ConfigLoadResult, load_config};
use crate::core::store::LoadReport;
use crate::engine::Engine;
use crate::issues::Issue;
use crate::project::{DEFAULT_ARB_DIR, DEFAULT_TEMPLATE_FILE, detect_project, find_project_root};

pub struct CommandContext {
    pub root: PathBuf,
    pub config: Config,
    /// The settings file in use, if any.
    pub config_path: Option<PathBuf>,
    pub arb_dir: PathBuf,
    pub template: String,
    pub engine: Engine,
    pub load: LoadReport,
}

impl CommandContext {
    /// Finds the project, reads its settings and loads every catalog.
    ///
    /// Fails if no catalog could be loaded.
    pub fn new(common: &CommonArgs) -> Result<Self> {
        let start = match &common.project_root {
            Some(path) => path
                .canonicalize()
                .with_context(|| format!("Project root not found: {}", path.display()))?,
            None => env::current_dir().context("Cannot read the current directory")?,
        };
        let root = find_project_root(&start).unwrap_or(start);
        let ConfigLoadResult {
            config,
            path: config_path,
        } = load_config(&root)?;
        let project = detect_project(&root)?;

        let arb_dir = match (&common.arb_dir, &project) {
            (Some(dir), _) => root.join(dir),
            (None, Some(project)) => project.arb_directory.clone(),
            (None, None) => root.join(DEFAULT_ARB_DIR),
        };
        let template = match (&common.template, &project) {
            (Some(name), _) => name.clone(),
            (None, Some(project)) if common.arb_dir.is_none() => project.template_arb_file.clone(),
            _ => DEFAULT_TEMPLATE_FILE.to_string(),
        };

        let engine = Engine::new(&config);
        let load = engine.load(&arb_dir, &template);
        if load.locales.is_empty() {
            let reason = load
                .warnings
                .first()
                .map(|w| w.error.clone())
                .unwrap_or_else(|| "no .arb files found".to_string());
            bail!(
                "No catalogs loaded from {}: {}",
                display_relative(&root, &arb_dir),
                reason
            );
        }
        tracing::debug!(
            root = %root.display(),
            arb_dir = %arb_dir.display(),
            template = %template,
            locales = load.locales.len(),
            "loaded project"
        );

        Ok(Self {
            root,
            config,
            config_path,
            arb_dir,
            template,
            engine,
            load,
        })
    }

    /// ARB files that failed to load, as issues.
    pub fn load_issues(&self) -> Vec<Issue> {
        Engine::load_warnings_as_issues(&self.load.warnings)
    }

    /// Key pattern settings that were rejected, reported against the
    /// settings file.
    pub fn pattern_issues(&self) -> Vec<Issue> {
        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| self.root.join(CONFIG_FILE_NAME));
        self.engine
            .pattern_issue(&path.to_string_lossy())
            .into_iter()
            .collect()
    }

    /// Shows issue locations relative to the project root.
    pub fn relativize(&self, issues: &mut [Issue]) {
        for issue in issues {
            issue.map_file_path(|path| self.relative(Path::new(path)));
        }
    }

    pub fn locale_files_checked(&self) -> usize {
        self.load.locales.len() + self.load.warnings.len()
    }

    /// `path` relative to the project root, for output.
    pub fn relative(&self, path: &Path) -> String {
        display_relative(&self.root, path)
    }
}

fn display_relative(root: &Path, path: &Path) -> String {
    let shown = path.strip_prefix(root).unwrap_or(path);
    format!("./{}", shown.display())
}
