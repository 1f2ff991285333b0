use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use petclinic::auth::{
    CredentialVerifier, PasswordManager, generate_signing_key, load_signing_key,
};
use petclinic::config::{ClinicConfig, ServerConfig};
use petclinic::server::{AppState, create_router};
use petclinic::service::{AccountDetails, UserService};
use petclinic::store::{SqliteStore, Store};
use petclinic::types::Role;

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "petclinic")]
#[command(about = "A clinic backend for owners, pets, and appointments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database, config and signing key
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (database, config, signing key and first admin)
    Init {
        /// Data directory for the database, config and signing key
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,

        /// Admin username
        #[arg(long)]
        username: Option<String>,

        /// Admin password
        #[arg(long)]
        password: Option<String>,

        /// Admin email
        #[arg(long)]
        email: Option<String>,
    },
}

struct AdminArgs {
    username: Option<String>,
    password: Option<String>,
    email: Option<String>,
}

fn run_init(data_dir: String, non_interactive: bool, args: AdminArgs) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir: PathBuf::from(data_dir),
        ..ServerConfig::default()
    };
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    if store.has_admin_user()? {
        bail!(
            "Server already initialized. An admin account exists in {}",
            config.db_path().display()
        );
    }

    let config_path = config.config_path();
    let clinic = if config_path.exists() {
        ClinicConfig::load(&config_path)?
    } else {
        let clinic = ClinicConfig::default();
        clinic.save(&config_path)?;
        info!("Wrote default clinic settings to {}", config_path.display());
        clinic
    };

    let key_path = config.signing_key_path();
    if !key_path.exists() {
        fs::write(&key_path, generate_signing_key())?;

        #[cfg(unix)]
        set_restrictive_permissions(&key_path);
    }
    let key = load_signing_key(&key_path)?;

    let details = if non_interactive {
        let (Some(username), Some(password), Some(email)) =
            (args.username, args.password, args.email)
        else {
            bail!("--username, --password and --email are required with --non-interactive");
        };
        AccountDetails {
            name: username.clone(),
            username,
            password,
            email,
            contact: String::new(),
        }
    } else {
        prompt_admin_details(args)?
    };

    let passwords = PasswordManager::new();
    let credentials = CredentialVerifier::new(
        &key,
        clinic.auth.token_ttl()?,
    );
    let users = UserService::new(&store, &passwords, &credentials);
    let admin = users.register(details, Role::Admin)?;

    println!();
    println!("========================================");
    println!("Created admin '{}' (id {})", admin.username, admin.id);
    println!();
    println!("Database:     {}", config.db_path().display());
    println!("Settings:     {}", config_path.display());
    println!("Signing key:  {}", key_path.display());
    println!("========================================");
    println!();

    Ok(())
}

fn prompt_admin_details(args: AdminArgs) -> anyhow::Result<AccountDetails> {
    let username = match args.username {
        Some(username) => username,
        None => inquire::Text::new("Admin username:")
            .with_validator(|input: &str| {
                if input.trim().is_empty() {
                    Err("Username cannot be empty".into())
                } else if input.contains(char::is_whitespace) {
                    Err("Username cannot contain whitespace".into())
                } else {
                    Ok(inquire::validator::Validation::Valid)
                }
            })
            .prompt()?,
    };

    let name = inquire::Text::new("Full name:")
        .with_default(&username)
        .prompt()?;

    let email = match args.email {
        Some(email) => email,
        None => inquire::Text::new("Email:").prompt()?,
    };

    let password = match args.password {
        Some(password) => password,
        None => inquire::Password::new("Password:")
            .with_validator(|input: &str| {
                if input.chars().count() < 8 {
                    Err("Password must be at least 8 characters".into())
                } else {
                    Ok(inquire::validator::Validation::Valid)
                }
            })
            .prompt()?,
    };

    Ok(AccountDetails {
        username,
        password,
        name,
        email,
        contact: String::new(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("petclinic=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
                username,
                password,
                email,
            } => {
                run_init(
                    data_dir,
                    non_interactive,
                    AdminArgs {
                        username,
                        password,
                        email,
                    },
                )?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
            };

            let key_path = config.signing_key_path();
            if !key_path.exists() {
                bail!(
                    "Server not initialized. Run 'petclinic admin init' first to create the database and signing key."
                );
            }

            let store = SqliteStore::new(config.db_path())?;
            store.initialize()?;
            if !store.has_admin_user()? {
                bail!(
                    "Server not initialized. Run 'petclinic admin init' first to create the first admin."
                );
            }

            let clinic = ClinicConfig::load(&config.config_path())?;
            let hours = clinic.clinic.business_hours()?;
            let credentials = CredentialVerifier::new(
                &load_signing_key(&key_path)?,
                clinic.auth.token_ttl()?,
            );

            info!(
                "Clinic hours {:02}:00-{:02}:00 at UTC{:+} minutes",
                clinic.clinic.opening_hour, clinic.clinic.closing_hour, clinic.clinic.utc_offset_minutes
            );

            let state = Arc::new(AppState::new(Arc::new(store), credentials, hours));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
