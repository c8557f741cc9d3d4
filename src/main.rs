//! isp_crime_stats - municipality-level descriptive statistics for the ISP dataset.
//!
//! Takes no arguments. Settings are read from `.env`, `isp_stats.toml` and
//! `ISP_STATS_*` environment variables.

use isp_crime_stats::report::{self, ReportOptions};
use isp_crime_stats::{logging, pipeline, AppConfig, PipelineError};

fn main() {
    if let Err(e) = run() {
        if logging::is_initialized() {
            logging::log_stage_failure(&e);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<(), PipelineError> {
    dotenv::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logger(config.log_level, config.log_file.as_deref(), false);

    let analysis = pipeline::run(&config)?;

    let options = ReportOptions {
        format: config.output_format,
        color: config.color,
        preview_rows: config.preview_rows,
    };
    let stdout = std::io::stdout();
    report::emit(&analysis, &options, &mut stdout.lock())?;

    Ok(())
}
