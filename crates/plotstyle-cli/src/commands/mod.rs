//! Command implementations for the plotstyle CLI
//!
//! Each command builds a loader from the shared options and delegates to
//! plotstyle-core.

pub mod check;
pub mod resolve;
pub mod validators;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use plotstyle_core::{LoadedStyle, ResolveOptions, ResolvedStyle, StyleLoader};

use crate::OptionArgs;

const DEFAULT_CONFIG_FILE: &str = "plotstyle.toml";

/// Build resolution options: the options file first, then flags on top.
pub fn load_options(args: &OptionArgs) -> Result<ResolveOptions> {
    let config = args.config.clone().or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.is_file().then_some(default)
    });

    let mut options = match &config {
        Some(path) => {
            debug!(?path, "reading options file");
            ResolveOptions::load(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?
        }
        None => ResolveOptions::default(),
    };

    if let Some(root) = &args.root {
        options.documents_root = root.clone();
    }
    if let Some(language) = &args.language {
        options.language = Some(language.clone());
    }
    if args.keep_all {
        options.keep_all_fields = true;
    }
    if let Some(folder) = &args.base_folder {
        options.base_folder = Some(folder.clone());
    }
    Ok(options)
}

/// Names given on the command line that exist as files are used as paths;
/// anything else is searched for under the documents root.
fn document_name(arg: &str) -> String {
    let path = Path::new(arg);
    if path.is_file() {
        if let Ok(absolute) = std::fs::canonicalize(path) {
            return absolute.to_string_lossy().into_owned();
        }
    }
    arg.to_string()
}

/// Resolve the command-line documents: one document may expand into a
/// template, several are merged into a single style.
pub fn load_styles<'r>(loader: &StyleLoader<'r>, files: &[String]) -> Result<LoadedStyle<'r>> {
    let names: Vec<String> = files.iter().map(|f| document_name(f)).collect();
    match names.as_slice() {
        [single] => loader
            .from_path(single)
            .with_context(|| format!("Failed to resolve {}", files[0])),
        _ => loader
            .from_paths(names.as_slice())
            .map(LoadedStyle::Single)
            .with_context(|| format!("Failed to resolve {}", files.join(", "))),
    }
}

/// Every style the documents produce, labelled by template branch.
pub fn all_styles(loaded: LoadedStyle<'_>) -> Result<Vec<(Option<usize>, ResolvedStyle)>> {
    match loaded {
        LoadedStyle::Single(style) => Ok(vec![(None, style)]),
        LoadedStyle::Template(template) => template
            .expand()
            .enumerate()
            .map(|(index, style)| {
                style
                    .map(|style| (Some(index), style))
                    .with_context(|| format!("Failed to resolve template branch {}", index))
            })
            .collect(),
    }
}
