//! Finchat CLI - ask questions about annual reports and registry entities.

use clap::Parser;
use finchat_chat::ReportChat;
use finchat_cli::cli::RegistryAction;
use finchat_cli::commands;
use finchat_cli::repl;
use finchat_cli::{logging, Cli, Command, Config, Formatter};
use finchat_registry::{BrregClient, RegistryChat};
use tracing::debug;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run() -> finchat_cli::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let mut config = Config::load_from(&config_path)?;
    config.apply_env();
    if !matches!(cli.command, Some(Command::Config(_))) {
        config.validate()?;
    }
    debug!("Loaded configuration from {}", config_path.display());

    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(color_enabled);

    match cli.command {
        Some(Command::Config(args)) => {
            commands::execute_config(args, &config, &config_path, &formatter)?;
        }
        Some(Command::Registry(args)) => {
            let client = BrregClient::with_base_url(config.registry.base_url.clone());
            match args.action {
                RegistryAction::Ask { entity, question } => {
                    let provider = config.build_provider()?;
                    let mut chat = RegistryChat::new(client, provider, config.registry.clone());
                    commands::execute_registry_ask(&entity, &question.join(" "), &mut chat, &formatter).await?;
                }
                RegistryAction::Repl { entity } => {
                    let provider = config.build_provider()?;
                    let mut chat = RegistryChat::new(client, provider, config.registry.clone());
                    repl::run_registry_repl(&mut chat, entity, config.settings.history_size, &formatter).await?;
                }
                action => {
                    commands::execute_lookup(action, &client, &formatter).await?;
                }
            }
        }
        Some(Command::List) => {
            let store = config.build_store()?;
            commands::execute_list(&store, &formatter).await?;
        }
        command => {
            let store = config.build_store()?;
            debug!("Reading reports from {}", store.describe());
            let mut chat = ReportChat::new(
                store,
                config.build_extractor(),
                config.build_provider()?,
                config.chat.clone(),
            );

            match command {
                None | Some(Command::Repl) => {
                    repl::run_repl(&mut chat, config.settings.history_size, &formatter).await?;
                }
                Some(Command::Ask(args)) => {
                    commands::execute_ask(args, &mut chat, &formatter).await?;
                }
                Some(Command::List) | Some(Command::Registry(_)) | Some(Command::Config(_)) => unreachable!(),
            }
        }
    }

    Ok(())
}
