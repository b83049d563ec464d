use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stickerbot")]
#[command(about = "Discord sticker bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory, a default config, and the sticker root.
    Init {
        /// Config file path (default: STICKERBOT_CONFIG_PATH or ~/.stickerbot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Build the sticker catalog and run the bot until Ctrl+C. Needs a bot token (discord.botToken or DISCORD_BOT_TOKEN).
    Run {
        /// Config file path (default: STICKERBOT_CONFIG_PATH or ~/.stickerbot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Sticker root (default from config or `stickers` next to the config file)
        #[arg(long, short, value_name = "DIR")]
        stickers: Option<PathBuf>,
    },

    /// Build the sticker catalog and print it without connecting to Discord.
    Catalog {
        /// Config file path (default: STICKERBOT_CONFIG_PATH or ~/.stickerbot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Sticker root (default from config or `stickers` next to the config file)
        #[arg(long, short, value_name = "DIR")]
        stickers: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("stickerbot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Run { config, stickers }) => {
            if let Err(e) = run_bot(config, stickers).await {
                log::error!("bot failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Catalog { config, stickers }) => {
            if let Err(e) = run_catalog(config, stickers) {
                log::error!("catalog failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let stickers_dir = lib::init::init_config_dir(&path)?;
    println!(
        "initialized configuration at {} (stickers in {})",
        path.display(),
        stickers_dir.display()
    );
    Ok(())
}

async fn run_bot(config_path: Option<PathBuf>, stickers: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, path) = lib::config::load_config(config_path)?;
    lib::bot::run_bot(config, path, stickers).await
}

fn run_catalog(config_path: Option<PathBuf>, stickers: Option<PathBuf>) -> anyhow::Result<()> {
    use lib::commands::CommandFramework;
    use lib::stickers::ActionDescriptor;
    use std::sync::Arc;

    let (config, path) = lib::config::load_config(config_path)?;
    let stickers_dir =
        stickers.unwrap_or_else(|| lib::config::resolve_stickers_dir(&config, &path));
    let catalog = lib::bot::build_catalog(&config, &stickers_dir)?;
    let commands = CommandFramework::new(config.discord.command_prefix.clone(), Arc::new(catalog));
    let catalog = commands.catalog();
    let prefix = commands.prefix();

    for name in catalog.index.categories() {
        let Some(ActionDescriptor::Category(category)) =
            catalog.registry.get(name).map(|a| a.as_ref())
        else {
            println!("{}{} (replaced by another action)", prefix, name);
            continue;
        };
        let visibility = if category.hidden { " [hidden]" } else { "" };
        println!("{}{}{}", prefix, category.name, visibility);
        for item_name in &category.item_names {
            match catalog.registry.get(item_name).map(|a| a.as_ref()) {
                Some(ActionDescriptor::Item(item)) => {
                    let aliases = if item.aliases.is_empty() {
                        String::new()
                    } else {
                        format!(" (aliases: {})", item.aliases.join(", "))
                    };
                    let file = item
                        .file
                        .as_ref()
                        .map(|f| format!(" -> {}", f.display()))
                        .unwrap_or_default();
                    println!("  {}{}{}{}", prefix, item.name, aliases, file);
                }
                _ => println!("  {}{} (replaced by another action)", prefix, item_name),
            }
        }
    }
    println!(
        "{} categories, {} action names",
        catalog.index.categories().len(),
        catalog.registry.len()
    );
    Ok(())
}
