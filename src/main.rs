use std::io;
use std::process::ExitCode;

use dubplate_collector::common::{initialize_logging, VERSION};
use dubplate_collector::shell::Shell;
use dubplate_collector::{Config, Result, Store};
use tracing::{error, info};

fn run(config: &Config) -> Result<()> {
    info!("dubplate-collector {} starting with database {}", VERSION, config.database_path.display());
    let store = Store::open(config)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(&store, config, stdin.lock(), stdout.lock()).run()
}

fn main() -> ExitCode {
    let config = match Config::parse(None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    // Held until exit so the file writer flushes.
    let _guard = match initialize_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            None
        }
    };

    config.warn_unrecognized_keys();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
