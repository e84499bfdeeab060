use clap::Parser;
use spoor_common::protocol::{Command, CommandAck};
use spoor_engine::config::ConfigLoader;
use spoor_relay::server::{Inbound, RelayServer};
use spoor_relay::session::Session;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::sync::oneshot;

#[derive(Parser, Debug)]
#[command(author, version, about = "Records user interactions reported by capture shims")]
struct Args {
    /// WebSocket port for capture shims (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Config file; defaults to ./spoor.yaml then ~/.spoor/config.yaml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory receiving exported traces (overrides the config file)
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Durable state file (overrides the config file)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so the prompt stays readable.
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    let mut config = ConfigLoader::load_or_default(args.config.as_deref()).await?;
    if let Some(port) = args.port {
        config.relay.port = port;
    }
    if let Some(dir) = args.export_dir {
        config.export.dir = Some(dir);
    }
    if let Some(path) = args.state_file {
        config.storage.path = Some(path);
    }

    let server = RelayServer::new(config.relay.port);
    let handle = server.start().await?;
    println!("Relay listening on ws://{}", handle.local_addr);
    println!("Connect the capture shim, then drive recording with: start | stop | download | status");

    let session = Session::new(&config, handle.control_tx.clone());
    let inbound_tx = handle.inbound_tx.clone();
    tokio::spawn(session.run(handle.inbound_rx));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();

    loop {
        print!("> ");
        stdout.flush()?;
        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }

        let command = match trimmed {
            "start" => Command::StartRecording,
            "stop" => Command::StopRecording,
            "download" => Command::DownloadActionTrace,
            "status" => Command::GetStatus,
            other => {
                println!("Unknown command: {} (expected start, stop, download or status)", other);
                continue;
            }
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        if inbound_tx.send(Inbound::Command(command, reply_tx)).await.is_err() {
            break;
        }
        match reply_rx.await {
            Ok(Some(CommandAck::Status { status })) => println!("{}", status),
            Ok(Some(CommandAck::State { is_recording, trace })) => {
                let label = if is_recording { "Recording..." } else { "Stopped" };
                println!("{} ({} actions in trace)", label, trace.len());
            }
            Ok(None) => println!("OK"),
            Err(_) => break,
        }
    }

    Ok(())
}
