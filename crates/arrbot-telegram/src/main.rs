//! arrbot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx cargo run -p arrbot-telegram
//! ```

use std::path::PathBuf;

use arrbot_core::{BotConfig, CheckReport};
use arrbot_telegram::ArrBot;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// arrbot - download status and VPN container alerts over Telegram
#[derive(Parser, Debug)]
#[command(name = "arrbot")]
#[command(about = "Telegram bot for Transmission, Sonarr and Radarr status")]
struct Args {
    /// Load environment variables from this file (default: .env.local, then .env)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Run one container check, print the result and exit
    #[arg(long)]
    check_now: bool,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "arrbot_telegram=info,arrbot_core=info,teloxide=warn",
        1 => "arrbot_telegram=debug,arrbot_core=debug,arrbot_backends=debug,teloxide=info",
        2 => "arrbot_telegram=trace,arrbot_core=trace,arrbot_backends=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match &args.env_file {
        Some(path) => BotConfig::from_env_file(path)?,
        None => {
            // Local files are optional.
            let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());
            BotConfig::from_env()?
        }
    };

    let bot = ArrBot::new(config)?;

    if args.check_now {
        match bot.check_now().await {
            None => println!("Container management is not enabled."),
            Some(CheckReport::Checked { outcome, alert }) => {
                println!("{}: {}", outcome.process_name, outcome.current);
                if let Some(report) = alert {
                    println!("alert delivered to {} of {} admins", report.delivered().len(), report.len());
                }
            }
            Some(CheckReport::ProbeFailed(e)) => return Err(e.into()),
            Some(CheckReport::Skipped) => println!("check skipped"),
        }
        return Ok(());
    }

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[robot] arrbot");
            println!("   Bot: @{}", username);
            println!("   Container monitoring: {}", if bot.state().monitoring_enabled() { "on" } else { "off" });
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n   Press Ctrl+C to stop\n");

    bot.start_polling().await?;

    Ok(())
}
