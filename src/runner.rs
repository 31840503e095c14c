//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the project, runs one compilation pass and delivers the result.
//! Generated files are written to a temporary sibling and renamed into place
//! only after the whole pass succeeds, so a failed run never leaves a
//! truncated build file behind.

use crate::cli::{Cli, Commands};
use crate::graph::Statement;
use crate::hasher::StreamHasher;
use crate::variant::VariantMatrix;
use crate::{ast::Project, ir::compile_project, ninja_gen, project};
use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::{self, Write};
use std::path::Path;
use tempfile::Builder;
use tracing::{debug, info};

/// Output path that selects standard output.
const STDOUT_MARKER: &str = "-";

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error if the project cannot be loaded or compiled, or if the
/// result cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let command = cli.command.clone().unwrap_or_default();
    match command {
        Commands::Generate { output } => {
            let ninja = generate_ninja(cli)?;
            if output.as_os_str() == STDOUT_MARKER {
                io::stdout()
                    .lock()
                    .write_all(ninja.as_bytes())
                    .context("write Ninja file to stdout")?;
            } else {
                let path = resolve_in_directory(cli, &output)?;
                write_atomically(&path, &ninja)?;
            }
            Ok(())
        }
        Commands::Fingerprint => {
            let stream = compile(cli)?;
            writeln!(io::stdout().lock(), "{}", StreamHasher::digest(&stream))
                .context("write fingerprint")?;
            Ok(())
        }
        Commands::Variants { target } => {
            let (project, _) = load(cli)?;
            let declared = project
                .targets
                .iter()
                .find(|t| t.name == target)
                .ok_or_else(|| anyhow!("no target named '{target}'"))?;
            let tags = match &declared.matrix {
                None => vec![String::new()],
                Some(name) => {
                    let axes = project
                        .matrices
                        .get(name)
                        .ok_or_else(|| anyhow!("target '{target}' references unknown matrix '{name}'"))?;
                    VariantMatrix::new(axes.clone())
                        .expand()
                        .iter()
                        .map(ToString::to_string)
                        .collect()
                }
            };
            let mut out = io::stdout().lock();
            for tag in tags {
                writeln!(out, "{tag}").context("write variant list")?;
            }
            Ok(())
        }
    }
}

/// Write `content` to `path` via a temporary file in the same directory.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, written or
/// renamed over `path`.
pub fn write_atomically(path: &Utf8Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let mut tmp = Builder::new()
        .prefix(".buildmatrix.")
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_context(|| format!("create temporary file in {parent}"))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("write {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replace {path}"))?;
    info!("Generated Ninja file at {path}");
    Ok(())
}

fn to_utf8(path: &Path) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .map_err(|p| anyhow!("path is not valid UTF-8: {}", p.display()))
}

/// Resolve `path` against the `-C` directory, if one was given.
fn resolve_in_directory(cli: &Cli, path: &Path) -> Result<Utf8PathBuf> {
    let utf8 = to_utf8(path)?;
    match &cli.directory {
        Some(dir) => Ok(to_utf8(dir)?.join(utf8)),
        None => Ok(utf8),
    }
}

fn load(cli: &Cli) -> Result<(Project, Utf8PathBuf)> {
    let project_path = resolve_in_directory(cli, &cli.file)?;
    let project = project::from_path(&project_path)
        .with_context(|| format!("loading project at {project_path}"))?;
    let project_json = serde_json::to_string_pretty(&project).context("serialising project")?;
    debug!("Project:\n{project_json}");
    let root = match project_path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    };
    Ok((project, root))
}

fn compile(cli: &Cli) -> Result<Vec<Statement>> {
    let (project, root) = load(cli)?;
    let stream = compile_project(&project, &root).context("compiling build graph")?;
    let builds = stream
        .iter()
        .filter(|s| matches!(s, Statement::Build(_)))
        .count();
    debug!(statements = stream.len(), builds, "compilation pass finished");
    let stream_json = serde_json::to_string_pretty(&stream).context("serialising statement stream")?;
    debug!("Statement stream:\n{stream_json}");
    Ok(stream)
}

/// Generate the Ninja file contents for the project referenced by `cli`.
///
/// # Errors
///
/// Returns an error if the project cannot be loaded or compiled.
pub fn generate_ninja(cli: &Cli) -> Result<String> {
    Ok(ninja_gen::generate(&compile(cli)?))
}
