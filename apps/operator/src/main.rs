use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::domain::SessionId;
use tracing_subscriber::EnvFilter;

mod client;
mod render;

use client::SessionClient;

/// Drives a workflow session on a running server.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "OPERATOR_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    NewSession,
    Show {
        session: SessionId,
    },
    Delete {
        session: SessionId,
    },
    Switch {
        session: SessionId,
        /// R189, QPE, SPB, NFSERV or MUN_CODE (case-insensitive).
        stage: String,
    },
    List {
        session: SessionId,
    },
    Toggle {
        session: SessionId,
        name: String,
    },
    ToggleAll {
        session: SessionId,
    },
    Process {
        session: SessionId,
    },
    Validate {
        session: SessionId,
        /// e.g. `qpe_r189` or `mun-code-r189`.
        check: String,
    },
    Consolidate {
        session: SessionId,
    },
    Reset {
        session: SessionId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = SessionClient::new(cli.server_url);

    let snapshot = match cli.command {
        Command::NewSession => {
            let created = client.create_session().await?;
            println!("session_id={}", created.session_id);
            created.snapshot
        }
        Command::Show { session } => client.snapshot(session).await?,
        Command::Delete { session } => {
            client.delete_session(session).await?;
            println!("deleted session_id={session}");
            return Ok(());
        }
        Command::Switch { session, stage } => client.switch_stage(session, &stage).await?,
        Command::List { session } => client.list_files(session).await?,
        Command::Toggle { session, name } => client.toggle_file(session, &name).await?,
        Command::ToggleAll { session } => client.toggle_select_all(session).await?,
        Command::Process { session } => client.process(session).await?,
        Command::Validate { session, check } => client.validate(session, &check).await?,
        Command::Consolidate { session } => client.consolidate(session).await?,
        Command::Reset { session } => client.reset(session).await?,
    };

    print!("{}", render::snapshot(&snapshot));
    Ok(())
}
