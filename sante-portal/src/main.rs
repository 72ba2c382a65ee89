//! sante-portal command line entry point

use clap::{Parser, Subcommand};
use sante_core::{Credentials, Decision, Registration, Role};
use sante_portal::{config::PortalConfig, error::PortalError, Portal};
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "sante.yaml";

#[derive(Parser)]
#[command(name = "sante-portal")]
#[command(about = "Dawini portal client")]
struct Cli {
    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        username: String,
        #[arg(short, long, env = "SANTE_PASSWORD")]
        password: String,
    },
    /// Create an account and sign in with it
    Register {
        username: String,
        #[arg(short, long, env = "SANTE_PASSWORD")]
        password: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// patient, doctor, clinic_staff, clinic_admin or admin
        #[arg(long)]
        role: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user and the active clinic
    Whoami,
    /// Enter a clinic as a patient
    EnterClinic { id: String },
    /// Leave the active clinic
    ExitClinic,
    /// Show what navigating to a path would display
    Open { path: String },
    /// List the sidebar links of the signed-in role
    Sidebar {
        /// Mark the link matching this path
        #[arg(long)]
        current: Option<String>,
    },
    /// Ask the assistant
    Chat { message: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::path::Path::new(DEFAULT_CONFIG).exists().then(|| DEFAULT_CONFIG.to_string()));
    let (config, load_error) = match PortalConfig::load(config_path.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (PortalConfig::default(), Some(e.to_string())),
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level)),
        )
        .init();

    if let Some(e) = load_error {
        tracing::warn!("Failed to load config, using defaults: {}", e);
    }

    let portal = Portal::open(config).unwrap_or_else(|e| {
        tracing::error!("Failed to open portal state: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = run(cli.command, &portal).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, portal: &Portal) -> Result<(), PortalError> {
    match command {
        Commands::Login { username, password } => {
            let user = portal.login(&Credentials::new(username, password)).await?;
            println!("Signed in as {} ({})", user.display_name(), user.role.portal_label());
            print_clinic(portal);
        }
        Commands::Register {
            username,
            password,
            email,
            first_name,
            last_name,
            role,
        } => {
            let mut registration = Registration::new(username, password);
            registration.email = email;
            registration.first_name = first_name;
            registration.last_name = last_name;
            registration.role = role.map(|r| r.parse::<Role>()).transpose()?;
            let user = portal.register(&registration).await?;
            println!("Registered and signed in as {}", user.username);
        }
        Commands::Logout => {
            portal.logout()?;
            println!("Signed out");
        }
        Commands::Whoami => {
            let snapshot = portal.load().await?;
            match &snapshot.user {
                Some(user) => println!("{} <{}> {}", user.display_name(), user.username, user.role),
                None if snapshot.authenticated => println!("Signed in, profile unavailable"),
                None => println!("Not signed in"),
            }
            print_clinic(portal);
        }
        Commands::EnterClinic { id } => {
            portal.load().await?;
            match portal.enter_clinic(Some(&id)).await? {
                Some(_) => print_clinic(portal),
                None => println!("No clinic entered"),
            }
        }
        Commands::ExitClinic => {
            portal.exit_clinic()?;
            println!("Left clinic");
        }
        Commands::Open { path } => {
            portal.load().await?;
            match portal.navigate(&path) {
                Decision::Render(entry) => println!("{} -> {:?}", entry.path, entry.view),
                Decision::Redirect(target) => println!("redirect -> {}", target),
                Decision::Pending => println!("loading"),
            }
        }
        Commands::Sidebar { current } => {
            portal.load().await?;
            for link in portal.sidebar() {
                let marker = match &current {
                    Some(path) if link.is_active(path) => "*",
                    _ => " ",
                };
                println!("{} {:<28} {}", marker, link.label, link.path);
            }
        }
        Commands::Chat { message } => {
            let snapshot = portal.load().await?;
            let username = snapshot.username().ok_or(PortalError::NotSignedIn)?.to_string();
            let chat = portal.chat();
            let mut transcript = chat.history().await;
            let mut stdout = std::io::stdout();
            chat.send_with(&mut transcript, &message, &username, |delta| {
                let _ = write!(stdout, "{}", delta);
                let _ = stdout.flush();
            })
            .await?;
            println!();
        }
    }
    Ok(())
}

fn print_clinic(portal: &Portal) {
    if let Some(clinic) = portal.clinic().current() {
        let theme = portal.theme();
        println!("Clinic: {} [{}]", clinic.name, clinic.id);
        for (property, value) in theme.css_properties() {
            println!("  {}: {}", property, value);
        }
        println!("  title: {}", theme.title);
    }
}
