use clap::Parser;
use client::network::Client;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:55555")]
    server: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    info!("Connecting to {}", args.server);
    info!("Controls: W/S player 1, I/K player 2, F/G player 3");
    info!("Type a key and press enter; the same key again releases it");

    let mut client = Client::connect(&args.server).await?;

    // Terminal input: one key per line, forwarded to the protocol loop.
    let (key_tx, key_rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(key) = line.trim().chars().next() {
                if key_tx.send(key).await.is_err() {
                    return;
                }
            }
        }
    });

    client.run(key_rx).await?;
    Ok(())
}
