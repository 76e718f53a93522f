use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cookbook::cli::{self, Cli, Session};
use cookbook::config::AppConfig;
use cookbook::localization::{detect_language, LocalizationManager};

fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    // A second initialization (e.g. in tests) is harmless
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize logging
    init_logging(args.json_logs);

    let config = AppConfig::from_env().with_overrides(args.data_file, args.language);
    info!(data_file = %config.data_file.display(), language = %config.language, "Starting cookbook");

    let messages = LocalizationManager::new()?;
    let language = detect_language(Some(config.language.as_str()));

    let outcome = match Session::open(config, &messages) {
        Ok(mut session) => cli::run(args.command, &mut session).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(output) => {
            println!("{}", output.trim_end());
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("{}", cli::localized_error(&e, &messages, language));
            std::process::exit(1);
        }
    }
}
