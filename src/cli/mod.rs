use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub mod render;
pub mod shell;

use crate::app::{App, View};
use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Submit a lead from the public landing page
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Preferred appointment start, e.g. "2024-06-01 10:00" (local time)
        #[arg(long, default_value = "")]
        requested_start: String,
        /// Preferred appointment length in minutes
        #[arg(long, default_value = "")]
        duration: String,
    },
    /// Log in as the freelancer and persist the session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the persisted session token
    Logout {},
    /// List every lead (requires login)
    Leads {},
    /// Show the calendar around today, private when logged in
    Calendar {},
    /// Start an interactive session (default)
    Shell {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Backend base URL, overrides LEADBOOK_API_BASE_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Logs go to stderr so they never mix with rendered output
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = AppConfig::default();
    if let Some(url) = &args.api_url {
        config = config.with_api_base_url(url);
    }
    tracing::debug!(api = %config.api_base_url, storage = ?config.storage_file(), "Config loaded");

    let mut app = App::from_config(&config);

    match args.command {
        Some(Command::Submit {
            name,
            email,
            phone,
            notes,
            requested_start,
            duration,
        }) => {
            app.start().await?;
            if app.view() != View::Public {
                bail!("The lead form is only available when logged out");
            }
            let form = app.form_mut();
            form.name = name;
            form.email = email;
            form.phone = phone;
            form.notes = notes;
            form.requested_start = requested_start;
            form.duration_minutes = duration;

            let result = app.submit_lead().await;
            println!("Status: {}", app.submission_status());
            result?;
        }
        Some(Command::Login { username, password }) => {
            app.start().await?;
            if app.view() == View::Authenticated {
                println!("Already logged in");
                return Ok(());
            }
            app.request_login()?;
            app.login(&username, &password).await?;
            println!("Logged in");
        }
        Some(Command::Logout {}) => {
            app.start().await?;
            if app.view() == View::Authenticated {
                app.logout().await?;
            }
            println!("Logged out");
        }
        Some(Command::Leads {}) => {
            app.start().await?;
            if let Some(notice) = app.take_notice() {
                bail!(notice);
            }
            if app.view() != View::Authenticated {
                bail!("Not logged in. Run `login` first.");
            }
            let roster = app.roster();
            println!("{}", render::roster(&roster.leads(), &roster.status()));
        }
        Some(Command::Calendar {}) => {
            app.start().await?;
            if let Some(notice) = app.take_notice() {
                eprintln!("{}", notice);
            }
            let calendar = app.calendar();
            println!(
                "{}",
                render::calendar(&calendar.events(), calendar.mode(), &calendar.status())
            );
        }
        Some(Command::Shell {}) | None => {
            shell::run(&mut app).await?;
        }
    }

    Ok(())
}
