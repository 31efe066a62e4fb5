use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use dispatcher::{load_settings, Dispatcher, HttpRemoteChannel, NativeCapability, Outcome};
use shared::{domain::IntentKind, protocol::Sender};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod command;
mod render;

use command::Command;
use render::render;

#[derive(Parser, Debug)]
#[command(about = "Operator console for the CAD design agent")]
struct Args {
    /// Overrides `remote_url` from dispatcher.toml / APP__REMOTE_URL.
    #[arg(long)]
    remote_url: Option<String>,
    /// Per-channel deadline in milliseconds; 0 disables it.
    #[arg(long)]
    deadline_ms: Option<u64>,
    /// Do not record turns on the service's /log endpoint.
    #[arg(long)]
    no_log: bool,
}

struct Console {
    dispatcher: Dispatcher,
    remote: HttpRemoteChannel,
    log_turns: bool,
    /// What the operator currently sees; each turn replaces it wholesale.
    shown: Outcome,
}

impl Console {
    async fn say(&mut self, text: &str) {
        self.log(Sender::User, text).await;

        let turn = self.dispatcher.converse(&self.remote, text).await;
        if let Some(envelope) = &turn.envelope {
            let is_action = matches!(
                envelope.kind,
                IntentKind::Airfoil | IntentKind::Propulsion | IntentKind::Cg | IntentKind::Drc
            );
            if is_action && !envelope.summary.is_empty() {
                println!("> {}", envelope.summary);
                self.log(Sender::Agent, &envelope.summary).await;
            }
        }
        self.show(turn.outcome).await;
    }

    async fn select(&mut self, index: usize) {
        let Some(option) = index
            .checked_sub(1)
            .and_then(|i| self.shown.propulsion_options.get(i))
            .cloned()
        else {
            println!("No propulsion option #{index} on screen.");
            return;
        };
        let outcome = self.dispatcher.select_propulsion(&option).await;
        self.show(outcome).await;
    }

    async fn show(&mut self, outcome: Outcome) {
        print!("{}", render(&outcome));
        if !outcome.message.is_empty() {
            self.log(Sender::Agent, &outcome.message).await;
        }
        self.shown = outcome;
    }

    async fn log(&self, sender: Sender, text: &str) {
        if !self.log_turns {
            return;
        }
        if let Err(error) = self.remote.log_turn(sender, text).await {
            debug!(%error, "turn not logged");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.remote_url {
        settings.remote_url = url;
    }
    if let Some(ms) = args.deadline_ms {
        settings.channel_deadline = (ms > 0).then(|| Duration::from_millis(ms));
    }

    let remote = HttpRemoteChannel::new(&settings.remote_url)?;
    info!(remote = remote.base_url(), "console starting");
    let dispatcher = Dispatcher::new(
        Arc::new(remote.clone()),
        NativeCapability::absent(),
        settings,
    );
    let mut console = Console {
        dispatcher,
        remote,
        log_turns: !args.no_log,
        shown: Outcome::default(),
    };

    println!("Type a request (\"help\" for usage, \"quit\" to leave).");
    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Select(index) => console.select(index).await,
            Command::Say(text) => console.say(&text).await,
        }
    }
    Ok(())
}
