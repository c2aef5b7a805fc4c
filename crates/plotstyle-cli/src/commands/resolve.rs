//! Resolve command implementation.

use std::process::ExitCode;

use anyhow::{Context, Result};
use serde_json::Value as Json;

use plotstyle_core::{LoadedStyle, StyleLoader};

use super::{all_styles, load_options, load_styles};
use crate::OptionArgs;

/// Arguments for the resolve command
#[derive(Debug)]
pub struct ResolveArgs {
    pub files: Vec<String>,
    /// Template branch to resolve; all branches when unset
    pub index: Option<usize>,
    pub compact: bool,
    pub options: OptionArgs,
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs) -> Result<ExitCode> {
    let loader = StyleLoader::with_options(load_options(&args.options)?)?;
    let loaded = load_styles(&loader, &args.files)?;

    let output = match (loaded, args.index) {
        (LoadedStyle::Template(template), Some(index)) => {
            let style = template
                .resolve(index)
                .with_context(|| format!("Failed to resolve template branch {}", index))?;
            serde_json::to_value(&style)?
        }
        (LoadedStyle::Single(_), Some(_)) => {
            anyhow::bail!("--index only applies to documents that declare configs")
        }
        (loaded @ LoadedStyle::Template(_), None) => {
            let styles = all_styles(loaded)?
                .into_iter()
                .map(|(_, style)| serde_json::to_value(&style))
                .collect::<Result<Vec<_>, _>>()?;
            Json::Array(styles)
        }
        (LoadedStyle::Single(style), None) => serde_json::to_value(&style)?,
    };

    let text = if args.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{}", text);
    Ok(ExitCode::SUCCESS)
}
