use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::CheckArgs;
use crate::display::render_report;

pub fn check_command(args: &CheckArgs) -> Result<i32> {
    let config = args.to_config();
    debug!("Checking engines with {:?}", config);

    let report = engine_check_core::check(config);

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        print!("{}", render_report(&report, !args.no_color));
    }

    Ok(report.exit_code())
}
