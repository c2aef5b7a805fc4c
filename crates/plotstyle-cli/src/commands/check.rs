//! Check command implementation

use std::process::ExitCode;

use anyhow::Result;

use plotstyle_core::StyleLoader;

use super::{all_styles, load_options, load_styles};
use crate::OptionArgs;

/// Resolve and list diagnostics. Fails when any field was dropped.
pub fn execute(files: Vec<String>, options: OptionArgs) -> Result<ExitCode> {
    let loader = StyleLoader::with_options(load_options(&options)?)?;
    let styles = all_styles(load_styles(&loader, &files)?)?;

    let mut warnings = 0;
    for (branch, style) in &styles {
        for diagnostic in style.diagnostics() {
            match branch {
                Some(index) => println!("[{}] {}", index, diagnostic),
                None => println!("{}", diagnostic),
            }
        }
        warnings += style.warnings().count();
    }

    if warnings == 0 {
        println!("ok: {} style(s), no fields dropped", styles.len());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} field(s) dropped", warnings);
        Ok(ExitCode::FAILURE)
    }
}
