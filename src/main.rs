use std::path::PathBuf;

use clap::{Parser, Subcommand};
use linkmark::config::ClientConfig;
use linkmark::controller::ClientFormController;
use linkmark::error::{ApiError, ConfigError, FlowError};
use linkmark::forms::{LinkForm, LoginForm, SignupForm};
use linkmark::session::{FileTokenStore, Session};
use linkmark::ui::terminal::TerminalSurface;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("client setup failed: {0}")]
    Api(#[from] ApiError),
    #[error("could not open token file: {0}")]
    TokenFile(#[from] std::io::Error),
    #[error("{0}")]
    Flow(#[from] FlowError),
}

#[derive(Parser, Debug)]
#[command(name = "linkmark", about = "Save and manage bookmarks on a linkmark server")]
struct Cli {
    /// Backend origin; overrides `LINKMARK_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Where the bearer token is kept; overrides `LINKMARK_TOKEN_FILE`.
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// Log more (`-v` info, `-vv` debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server is reachable.
    Ping,
    /// Create an account.
    Signup {
        username: String,
        email: String,
        #[arg(env = "LINKMARK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in and store the session token.
    Login {
        email: String,
        #[arg(env = "LINKMARK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in user.
    Whoami,
    /// Show the signed-in user and their links.
    Dashboard,
    /// List saved links.
    Links,
    /// Save a link.
    Add { title: String, url: String },
    /// Delete a link by id.
    Delete { id: String },
    /// Forget the stored session token.
    Logout,
}

impl Command {
    fn surface(&self) -> TerminalSurface {
        match self {
            Self::Dashboard => TerminalSurface::dashboard(),
            Self::Links | Self::Add { .. } | Self::Delete { .. } => TerminalSurface::list(),
            _ => TerminalSurface::form(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(path) = cli.token_file {
        config = config.with_token_file(path);
    }

    let mut session = Session::open(FileTokenStore::new(&config.token_file))?;
    let controller = ClientFormController::from_config(&config, cli.command.surface())?;
    tracing::debug!(base_url = controller.api().base_url(), "client ready");

    run(&controller, &mut session, cli.command).await?;
    Ok(())
}

async fn run(
    controller: &ClientFormController<TerminalSurface>,
    session: &mut Session,
    command: Command,
) -> Result<(), FlowError> {
    match command {
        Command::Ping => {
            let message = controller.ping(session).await?;
            println!("{message}");
            Ok(())
        }
        Command::Signup { username, email, password } => {
            controller.signup(session, &SignupForm { username, email, password }).await
        }
        Command::Login { email, password } => controller.login(session, &LoginForm { email, password }).await,
        Command::Whoami => controller.bootstrap_dashboard(session).await.map(|_| ()),
        Command::Dashboard => controller.on_page_load(session).await,
        Command::Links => controller.load_links(session).await.map(|_| ()),
        Command::Add { title, url } => controller.add_link(session, &LinkForm { title, url }).await,
        Command::Delete { id } => controller.delete_link(session, &id).await,
        Command::Logout => controller.logout(session),
    }
}
