//! Overdub CLI entry point

use std::process::ExitCode;

use clap::Parser;

use overdub::cli::{
    app::{default_output_dir, load_merged_config, run_record, EXIT_ERROR},
    args::{Cli, Commands, RecordOptions},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use overdub::domain::config::AppConfig;
use overdub::infrastructure::XdgConfigStore;
use overdub::logging;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle subcommands
    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        output_dir: cli
            .output_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string()),
        sample_rate: cli.sample_rate,
        notify: if cli.notify { Some(true) } else { None },
        require_storage_permission: None,
    };

    // Merge config: defaults < file < cli
    let config = load_merged_config(cli_config).await;

    let options = RecordOptions {
        source: cli.source,
        output_dir: config
            .output_dir
            .as_ref()
            .map(Into::into)
            .unwrap_or_else(default_output_dir),
        sample_rate: config.sample_rate_or_default(),
        notify: config.notify_or_default(),
        require_storage_permission: config.require_storage_permission_or_default(),
        save_as: cli.save_as,
    };

    run_record(options).await
}
