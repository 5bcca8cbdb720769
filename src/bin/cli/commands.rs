//! Command implementations for the CLI tool.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use svgpack::ops::{
    ChangelogFormat, ContainerFile, DirectorySink, ExportOptions, ExportSelector, ImportOptions,
    ImportSource, ListFilter, ResourceLimits, render_report,
};
use svgpack::tree::MergeStrategy;
use svgpack::{EncodePolicy, EntryPath, Error, Result, document};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{print_export_result, print_import_result, print_listing};
use crate::OutputFormat;

/// Configuration for the import command.
pub struct ImportConfig<'a> {
    pub svg: &'a Path,
    pub paths: &'a [PathBuf],
    pub preserve_structure: bool,
    pub strategy: MergeStrategy,
    pub overwrite: bool,
    pub compress: bool,
    pub abort_on_error: bool,
    pub max_file_size: Option<u64>,
    pub max_total_size: Option<u64>,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Import command implementation.
pub fn import(config: &ImportConfig<'_>) -> ExitCode {
    let file = match ContainerFile::open(config.svg) {
        Ok(f) => f,
        Err(e) => return report(&e),
    };

    let sources = match collect_sources(config.paths) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };
    if sources.is_empty() {
        eprintln!("error: nothing to import");
        return ExitCode::UsageError;
    }

    let mut limits = ResourceLimits::default();
    if let Some(bytes) = config.max_file_size {
        limits = limits.max_file_size(bytes);
    }
    if let Some(bytes) = config.max_total_size {
        limits = limits.max_total_size(bytes);
    }

    #[allow(unused_mut)]
    let mut policy = EncodePolicy::default();
    #[cfg(feature = "deflate")]
    {
        policy = policy.compress(config.compress);
    }
    #[cfg(not(feature = "deflate"))]
    if config.compress {
        eprintln!("error: this build lacks the 'deflate' feature");
        return ExitCode::UsageError;
    }

    let options = ImportOptions {
        overwrite: config.overwrite,
        preserve_structure: config.preserve_structure,
        strategy: config.strategy,
        abort_on_error: config.abort_on_error,
        limits,
        policy,
        cancel: None,
    };

    match file.import(&sources, &options) {
        Ok(result) => {
            print_import_result(&result, config.format, config.quiet);
            if result.failed() > 0 {
                ExitCode::PartialFailure
            } else {
                ExitCode::Success
            }
        }
        Err(e) => report(&e),
    }
}

/// Gathers import sources from files and directories.
///
/// A directory contributes every regular file under it, with paths
/// relative to the directory and the directory name as the origin label.
fn collect_sources(paths: &[PathBuf]) -> Result<Vec<ImportSource>> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            let origin = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "import".to_string());
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    Error::Io(std::io::Error::other(format!(
                        "cannot walk '{}': {}",
                        path.display(),
                        e
                    )))
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = EntryPath::from_fs_path(entry.path(), path)?;
                let bytes = std::fs::read(entry.path())?;
                sources.push(ImportSource::from_bytes(&origin, relative, bytes));
            }
        } else {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| Error::InvalidEntryPath(format!("'{}'", path.display())))?;
            let relative = EntryPath::new(&name)?;
            let bytes = std::fs::read(path)?;
            sources.push(ImportSource::from_bytes(&name, relative, bytes));
        }
    }
    Ok(sources)
}

/// Configuration for the export command.
pub struct ExportConfig<'a> {
    pub svg: &'a Path,
    pub patterns: &'a [String],
    pub output_dir: &'a Path,
    pub remove: bool,
    pub strict: bool,
    pub format: OutputFormat,
}

/// Export command implementation.
pub fn export(config: &ExportConfig<'_>) -> ExitCode {
    let file = match ContainerFile::open(config.svg) {
        Ok(f) => f,
        Err(e) => return report(&e),
    };

    let selector = if config.patterns.is_empty() {
        ExportSelector::All
    } else if config.patterns.len() == 1
        && config.patterns[0].contains(|c| matches!(c, '*' | '?' | '['))
    {
        ExportSelector::Pattern(config.patterns[0].clone())
    } else {
        ExportSelector::Paths(config.patterns.to_vec())
    };

    let mut sink = DirectorySink::new(config.output_dir);
    let options = ExportOptions {
        remove_after: config.remove,
        strict: config.strict,
        cancel: None,
    };

    match file.export(&selector, &mut sink, &options) {
        Ok(result) => {
            print_export_result(&result, config.format);
            if result.failed() > 0 {
                ExitCode::PartialFailure
            } else {
                ExitCode::Success
            }
        }
        Err(e) => report(&e),
    }
}

/// List command implementation.
pub fn list(svg: &Path, media_class: Option<&str>, report_mode: bool, format: OutputFormat) -> ExitCode {
    let file = match ContainerFile::open(svg) {
        Ok(f) => f,
        Err(e) => return report(&e),
    };

    let filter = match media_class {
        Some(class) => ListFilter::media_class(class),
        None => ListFilter::all(),
    };

    match file.list(&filter) {
        Ok(infos) => {
            if report_mode {
                // The report needs the container itself for metadata
                match std::fs::read_to_string(svg)
                    .map_err(Error::Io)
                    .and_then(|text| document::parse(&text))
                {
                    Ok(parsed) => println!("{}", render_report(&parsed.container, &infos)),
                    Err(e) => return report(&e),
                }
            } else {
                print_listing(&infos, format);
            }
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Exclude command implementation.
pub fn exclude(svg: &Path, names: &[String], format: OutputFormat) -> ExitCode {
    let file = match ContainerFile::open(svg) {
        Ok(f) => f,
        Err(e) => return report(&e),
    };

    match file.exclude(names) {
        Ok(result) => {
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "removed": result.removed }))
                }
                OutputFormat::Human => {
                    println!("removed {} entries", result.removed.len())
                }
            }
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Metadata subcommand implementation.
pub enum MetaAction<'a> {
    Set(&'a [String]),
    Remove(&'a [String]),
    Clean,
    Clear,
    Show,
}

pub fn meta(svg: &Path, action: MetaAction<'_>, format: OutputFormat) -> ExitCode {
    let file = match ContainerFile::open(svg) {
        Ok(f) => f,
        Err(e) => return report(&e),
    };

    let result = match action {
        MetaAction::Show => {
            return match file.metadata_snapshot() {
                Ok(map) => {
                    match serde_json::to_string_pretty(&map) {
                        Ok(json) => println!("{}", json),
                        Err(e) => eprintln!("error: {}", e),
                    }
                    ExitCode::Success
                }
                Err(e) => report(&e),
            };
        }
        MetaAction::Set(pairs) => {
            let mut updates = serde_json::Map::new();
            for pair in pairs {
                let Some((key, value)) = pair.split_once('=') else {
                    eprintln!("error: expected key=value, got '{}'", pair);
                    return ExitCode::UsageError;
                };
                // Values parse as JSON when possible, else as strings
                let value = serde_json::from_str(value)
                    .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
                updates.insert(key.to_string(), value);
            }
            file.update_metadata(updates)
        }
        MetaAction::Remove(keys) => file.remove_metadata(keys),
        MetaAction::Clean => file.clean_metadata(),
        MetaAction::Clear => file.clear_metadata(),
    };

    match result {
        Ok(r) => {
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "changed_keys": r.changed_keys }))
                }
                OutputFormat::Human => println!("{} keys changed", r.changed_keys.len()),
            }
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Changelog command implementation.
///
/// Restores the changelog persisted in the container metadata and renders
/// it; live tracking belongs to library consumers driving a batch.
pub fn changelog(svg: &Path, format_name: &str) -> ExitCode {
    let Some(format) = ChangelogFormat::parse(format_name) else {
        eprintln!(
            "error: unknown changelog format '{}' (markdown, json, xml)",
            format_name
        );
        return ExitCode::UsageError;
    };

    let file = match ContainerFile::open(svg) {
        Ok(f) => f,
        Err(e) => return report(&e),
    };

    if let Err(e) = file.restore_changelog() {
        return report(&e);
    }
    match file.generate_changelog(format) {
        Ok(rendered) => {
            println!("{}", rendered);
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Create command implementation.
pub fn create(svg: &Path) -> ExitCode {
    match ContainerFile::create(svg) {
        Ok(_) => {
            println!("created {}", svg.display());
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

fn report(error: &Error) -> ExitCode {
    eprintln!("error: {}", error);
    error_to_exit_code(error)
}
