//! Validators command implementation

use std::process::ExitCode;

use anyhow::Result;

use plotstyle_core::ValidatorRegistry;

pub fn execute() -> Result<ExitCode> {
    for name in ValidatorRegistry::shared().names() {
        println!("{}", name);
    }
    Ok(ExitCode::SUCCESS)
}
