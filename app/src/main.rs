#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use siteassist_config::Config;
use siteassist_conversation::{ChatManager, Provisioner, SiteReadiness};
use siteassist_gateway::{ChatRequest, ResetRequest, TokenValidator};
use siteassist_providers::{BackendConfig, HttpAssistantClient};
use siteassist_session::{BootstrapContent, SqliteSessionStore};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "siteassist")]
#[command(about = "Site assistant conversation service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Check backend provisioning for this site and enable chat
    Activate,
    /// Clear every user's session and disable chat
    Deactivate,
    /// Chat as a user (interactive unless -m is given)
    Chat {
        /// User identity to chat as
        #[arg(short, long)]
        user: String,

        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,
    },
    /// Reset a user's conversation
    Reset {
        /// User identity to reset
        #[arg(short, long)]
        user: String,
    },
    /// Show version
    Version,
}

type Backend = Arc<HttpAssistantClient>;
type Store = Arc<SqliteSessionStore>;

struct App {
    config: Config,
    manager: ChatManager<Backend, Store>,
    provisioner: Provisioner<Backend, Store>,
    validator: TokenValidator,
}

impl App {
    async fn build() -> anyhow::Result<Self> {
        let config = Config::load()?;
        info!("Loaded config from ~/siteassist/config.json");

        let backend_config = BackendConfig::new(
            config.backend.url.clone(),
            config.backend.api_key.clone(),
        )
        .with_timeout(Duration::from_secs(config.backend.timeout_secs));
        let backend: Backend = Arc::new(HttpAssistantClient::new(backend_config)?);

        info!("Session database: {}", config.database.path.display());
        let store: Store = Arc::new(
            SqliteSessionStore::new(
                &config.database.path,
                BootstrapContent {
                    system_prompt: config.chat.system_prompt.clone(),
                    greeting: config.chat.greeting.clone(),
                },
            )
            .await?,
        );

        let readiness = Arc::new(SiteReadiness::new());
        let manager = ChatManager::new(
            Arc::clone(&backend),
            Arc::clone(&store),
            config.site.url.clone(),
            Arc::clone(&readiness),
        );
        let provisioner = Provisioner::new(backend, store, readiness);
        let validator = TokenValidator::new(config.site.secret.clone());

        Ok(Self {
            config,
            manager,
            provisioner,
            validator,
        })
    }

    /// The CLI runs one process per command, so the readiness check happens
    /// at the start of every chat invocation, the way a long-running
    /// deployment checks once at activation.
    async fn ensure_ready(&self) -> anyhow::Result<()> {
        let present = self.provisioner.activate(&self.config.site.url).await?;
        if !present {
            anyhow::bail!(
                "backend has no database for {}; run the backend-side indexing first",
                self.config.site.url
            );
        }
        Ok(())
    }

    async fn submit(&self, user: &str, text: &str) -> Result<String, siteassist_gateway::Error> {
        let reply = siteassist_gateway::submit_message(
            &self.manager,
            &self.validator,
            ChatRequest {
                user_id: user.to_string(),
                token: self.validator.issue(user),
                text: text.to_string(),
            },
        )
        .await?;
        Ok(reply.text)
    }

    async fn run_interactive(&self, user: &str) -> anyhow::Result<()> {
        println!("=== Chatting as {user} ===");
        println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            let input = input.trim();

            if matches!(input, "exit" | "quit" | "q") {
                break;
            }
            if input.is_empty() {
                continue;
            }

            match self.submit(user, input).await {
                Ok(reply) => println!("\n{reply}\n"),
                Err(siteassist_gateway::Error::Chat(e)) => {
                    tracing::error!("Chat turn failed: {e}");
                    eprintln!("{}", e.user_facing_message());
                }
                Err(e) => eprintln!("Error: {e}"),
            }
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            Config::create_config()?;
        }
        Commands::Activate => {
            let app = App::build().await?;
            let present = app.provisioner.activate(&app.config.site.url).await?;
            if present {
                println!("Backend database present; chat is enabled.");
            } else {
                println!("Backend reachable, but no database for this site yet.");
            }
        }
        Commands::Deactivate => {
            let app = App::build().await?;
            let report = app.provisioner.deactivate().await?;
            println!("Cleared {} session(s).", report.cleared);
            for (user, error) in &report.failures {
                println!("Failed to clear session for {user}: {error}");
            }
        }
        Commands::Chat { user, message } => {
            let app = App::build().await?;
            app.ensure_ready().await?;

            if let Some(text) = message {
                let reply = app.submit(&user, &text).await?;
                println!("{reply}");
            } else {
                app.run_interactive(&user).await?;
            }
        }
        Commands::Reset { user } => {
            let app = App::build().await?;
            siteassist_gateway::reset_conversation(
                &app.manager,
                &app.validator,
                ResetRequest {
                    user_id: user.clone(),
                    token: app.validator.issue(&user),
                },
            )
            .await?;
            println!("Conversation reset for {user}.");
        }
        Commands::Version => {
            println!("siteassist {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
