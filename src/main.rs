use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use yail_live::blocks::{Workspace, WorkspaceDocument};
use yail_live::compiler::CodeBundle;
use yail_live::config::{Config, ConfigLoader};
use yail_live::logger;
use yail_live::server::CompanionServer;
use yail_live::session::EditorSession;
use yail_live::transport::{CompanionClient, Request, Transport, Value};

/// Compile block programs to Yail and run them on a companion
#[derive(Parser)]
#[command(name = "yail")]
#[command(about = "Compile block programs to Yail and run them live on a companion")]
struct Args {
    /// Config file (defaults to the per-user config)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overrides the config
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a reference companion: a Yail interpreter behind a TCP REPL server
    Companion {
        /// IP address to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Compile a workspace document and print the bundle
    Compile {
        /// Workspace document (JSON)
        workspace: PathBuf,

        /// Fail on incomplete blocks instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Write the bundle here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compile a workspace document, or take raw Yail, and run it on a companion
    Send {
        /// Workspace document (JSON)
        workspace: Option<PathBuf>,

        /// Yail source to run instead of a workspace
        #[arg(short = 'e', long, conflicts_with = "workspace")]
        code: Option<String>,

        /// Companion address, host:port
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// Raise a component event on a companion
    Raise {
        component: String,
        event: String,
        /// Event arguments. Numbers and true/false are passed as such
        args: Vec<String>,

        /// Companion address, host:port
        #[arg(short, long)]
        addr: Option<String>,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from(path),
        None => ConfigLoader::new()?.load_or_create(),
    }
}

fn compile(config: &Config, path: &Path, strict: bool) -> Result<CodeBundle> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read workspace {:?}", path))?;
    let document: WorkspaceDocument =
        serde_json::from_str(&json).with_context(|| format!("Invalid workspace document {:?}", path))?;

    let mut settings = config.editor.clone();
    settings.strict_assembly |= strict;
    let session = EditorSession::new(Workspace::default(), settings);
    session.load(&document).context("Failed to load workspace")?;

    let bundle = session.compile()?;
    for warning in &bundle.warnings {
        warn!("{}", warning);
    }
    Ok(bundle)
}

fn parse_arg(arg: &str) -> Value {
    match arg {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => match arg.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::text(arg),
        },
    }
}

async fn connect(config: &Config, addr: Option<String>) -> Result<CompanionClient> {
    let addr = addr.unwrap_or_else(|| config.companion.address());
    CompanionClient::connect(addr.as_str(), config.transport.timeout())
        .await
        .with_context(|| format!("Failed to connect to companion at {}", addr))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    logger::init(args.log_level.as_deref().unwrap_or(&config.logging.level));

    match args.command {
        Command::Companion { host, port } => {
            let ip = host.unwrap_or_else(|| config.companion.ip.clone());
            let port = port.unwrap_or(config.companion.port);
            info!("Starting yail companion v{}", env!("CARGO_PKG_VERSION"));
            let server = CompanionServer::new(ip, port, config.transport.timeout())
                .context("Failed to start interpreter")?;
            server.start().await.context("Companion server failed")?;
            info!("Companion stopped");
        }
        Command::Compile {
            workspace,
            strict,
            output,
        } => {
            let bundle = compile(&config, &workspace, strict)?;
            match output {
                Some(path) => fs::write(&path, bundle.text())
                    .with_context(|| format!("Failed to write {:?}", path))?,
                None => println!("{}", bundle.text()),
            }
        }
        Command::Send {
            workspace,
            code,
            addr,
        } => {
            let code = match (workspace, code) {
                (_, Some(code)) => code,
                (Some(path), None) => compile(&config, &path, false)?.text(),
                (None, None) => bail!("Nothing to send: give a workspace file or --code"),
            };
            let client = connect(&config, addr).await?;
            let value = client.execute_code(&code).await?;
            println!("{}", value);
        }
        Command::Raise {
            component,
            event,
            args,
            addr,
        } => {
            let client = connect(&config, addr).await?;
            let request = Request::Raise {
                component,
                event,
                args: args.iter().map(|a| parse_arg(a)).collect(),
            };
            let handled = client.request(request).await?;
            println!("{}", handled);
        }
    }
    Ok(())
}
