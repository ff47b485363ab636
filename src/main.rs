use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info};
use tokio::task::LocalSet;

use msgtmpl::{App, Cli, Config, FileStorage, TemplateStore};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    debug!("Logger initialized");
}

async fn run(cli: Cli) -> msgtmpl::Result<()> {
    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path)?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    info!(
        "Using templates in {} (key '{}')",
        config.data_dir.display(),
        config.storage_key
    );
    let storage = FileStorage::new(&config.data_dir);
    let store = TemplateStore::new(storage, config.storage_key.clone());

    let mut app = App::new(store, config, config_path);
    app.run(cli.command).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    // The store is single-threaded; debounced edits run as local tasks
    let result = LocalSet::new().run_until(run(cli)).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
