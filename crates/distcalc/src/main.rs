//! distcalc: distributed arithmetic expression evaluator.

use distcalc_cli::CLIResultPresenter;
use distcalc_lib::{app, config, errors};
use distcalc_orchestration::ResultPresenter;
use tracing_subscriber::EnvFilter;

/// Crates whose events `-v` raises to debug.
const OWN_CRATES: [&str; 5] = [
    "distcalc",
    "distcalc_lib",
    "distcalc_core",
    "distcalc_agent",
    "distcalc_orchestration",
];

fn main() {
    let config = config::AppConfig::parse();

    let mut filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    if config.verbose {
        for krate in OWN_CRATES {
            if let Ok(directive) = format!("{krate}=debug").parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let code = match app::run(&config) {
        Ok(code) => code,
        Err(err) => {
            CLIResultPresenter::new(config.verbose, config.quiet).present_error(&format!("{err:#}"));
            errors::exit_code(&err)
        }
    };
    std::process::exit(code);
}
