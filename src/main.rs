use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use portfolio_contact::contact::cooldown::check_cooldown;
use portfolio_contact::utils::block_on;
use portfolio_contact::{
    AppConfig, AutoReply, ContactGateway, ContactMessage, CooldownStatus, EmailJsClient,
    GatewaySettings, SqliteStore,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "portfolio-contact", about = "Send a portfolio contact message through EmailJS")]
struct Args {
    /// Config file (defaults to <config dir>/portfolio-contact.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cooldown database (defaults to the platform data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and deliver one message
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    /// Show whether an email may send right now
    Status {
        #[arg(long)]
        email: String,
    },
    /// Write a config file with placeholder values
    InitConfig,
}

fn open_store(db: Option<PathBuf>) -> Result<SqliteStore, String> {
    let store = match db {
        Some(path) => SqliteStore::open(path),
        None => SqliteStore::open_default(),
    };
    store.map_err(|e| format!("Failed to open cooldown store: {}", e))
}

fn run(args: Args) -> Result<(), String> {
    match args.command {
        Command::InitConfig => {
            let template = AppConfig::template();
            let path = match args.config {
                Some(path) => template.save_to(&path).map(|_| path),
                None => template.save(),
            }
            .map_err(|e| format!("Failed to save settings: {}", e))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Command::Status { email } => {
            let store = open_store(args.db)?;
            let email = email.trim();
            match check_cooldown(&store, email, Utc::now()) {
                CooldownStatus::Allowed => println!("{} may send a message now.", email),
                CooldownStatus::Blocked(remaining) => {
                    println!("{} can send another message in {}.", email, remaining)
                }
            }
            Ok(())
        }
        Command::Send {
            name,
            email,
            subject,
            message,
        } => {
            let config =
                AppConfig::load(args.config.as_deref()).map_err(|e| e.to_string())?;
            config.validate().map_err(|e| e.to_string())?;
            let client = EmailJsClient::new(&config).map_err(|e| e.to_string())?;
            let store = open_store(args.db)?;
            let gateway = ContactGateway::new(store, client, GatewaySettings::from(&config));

            let msg = ContactMessage::new(name, email, subject, message);
            let outcome =
                block_on(gateway.submit(&msg, Utc::now())).map_err(|e| e.to_string())?;
            info!(
                "provider answered {} {}",
                outcome.response.status, outcome.response.text
            );
            println!("Thank you! Your message has been sent successfully.");
            if let AutoReply::Failed(err) = outcome.auto_reply {
                eprintln!("Note: the confirmation email could not be sent ({}).", err);
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{}", msg);
            ExitCode::FAILURE
        }
    }
}
