use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    Env,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "env",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub export_root: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub cwd: PathBuf,
}

impl ResolutionContext {
    pub fn from_process() -> Result<Self> {
        let cwd = env::current_dir().context("failed to read current directory")?;
        Ok(Self { cwd })
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub export_root: PathBuf,
    pub config_path: PathBuf,
    pub root_source: ValueSource,
    pub config_source: ValueSource,
}

impl ResolvedPaths {
    pub fn diagnostics(&self) -> String {
        format!(
            "export_root={} ({})\nconfig_path={} ({})",
            normalize_for_display(&self.export_root),
            self.root_source.as_str(),
            normalize_for_display(&self.config_path),
            self.config_source.as_str(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeStatus {
    pub export_root_exists: bool,
    pub config_exists: bool,
    pub warnings: Vec<String>,
}

pub fn resolve_paths(
    context: &ResolutionContext,
    overrides: &PathOverrides,
) -> Result<ResolvedPaths> {
    resolve_paths_with_lookup(context, overrides, |key| env::var(key).ok())
}

fn resolve_paths_with_lookup<F>(
    context: &ResolutionContext,
    overrides: &PathOverrides,
    lookup_env: F,
) -> Result<ResolvedPaths>
where
    F: Fn(&str) -> Option<String>,
{
    let (export_root, root_source) = if let Some(path) = overrides.export_root.as_deref() {
        (absolutize(path, &context.cwd), ValueSource::Flag)
    } else if let Some(value) = lookup_env("RELINK_EXPORT_ROOT") {
        (
            absolutize(Path::new(value.trim()), &context.cwd),
            ValueSource::Env,
        )
    } else {
        (context.cwd.clone(), ValueSource::Default)
    };

    let (config_path, config_source) = if let Some(path) = overrides.config.as_deref() {
        (absolutize(path, &export_root), ValueSource::Flag)
    } else if let Some(value) = lookup_env("RELINK_CONFIG") {
        (
            absolutize(Path::new(value.trim()), &export_root),
            ValueSource::Env,
        )
    } else {
        (export_root.join("relink.toml"), ValueSource::Default)
    };

    Ok(ResolvedPaths {
        export_root,
        config_path,
        root_source,
        config_source,
    })
}

pub fn inspect_runtime(paths: &ResolvedPaths) -> RuntimeStatus {
    let export_root_exists = paths.export_root.is_dir();
    let config_exists = paths.config_path.exists();

    let mut warnings = Vec::new();
    if paths.export_root.exists() && !export_root_exists {
        warnings.push(format!(
            "export root {} exists but is not a directory",
            normalize_for_display(&paths.export_root)
        ));
    }
    if !config_exists {
        warnings.push("relink.toml is missing; built-in conversion defaults apply".to_string());
    }

    RuntimeStatus {
        export_root_exists,
        config_exists,
        warnings,
    }
}

pub fn ensure_export_root(paths: &ResolvedPaths, status: &RuntimeStatus) -> Result<()> {
    if !status.export_root_exists {
        bail!(
            "Export root is not a directory: {}\nExtract an export archive first: relink extract <ARCHIVE> --export-root {}",
            normalize_for_display(&paths.export_root),
            normalize_for_display(&paths.export_root)
        );
    }
    Ok(())
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn normalize_for_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
