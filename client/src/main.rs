use clap::Parser;
use client::network::ServerProxy;
use client::view;
use log::{info, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:1234")]
    server: String,

    /// Name to register under (must be unique on the server)
    #[arg(short, long)]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    info!("connecting to {}", args.server);
    let mut commands = ServerProxy::connect(&args.server).await?;

    let (x, y, grid) = commands.register(&args.name).await?;
    info!("registered as {} at ({}, {})", args.name, x, y);
    print!("{}", view::render(&grid, &args.name, x, y));

    // Last position the server reported, shared with the update task so
    // moves are computed relative to the freshest known spot.
    let position = Arc::new(Mutex::new((x, y)));

    // A session blocked in PollUpdate occupies its whole connection, so
    // updates get a dedicated one.
    let mut updates = ServerProxy::connect(&args.server).await?;
    {
        let name = args.name.clone();
        let position = Arc::clone(&position);
        tokio::spawn(async move {
            loop {
                match updates.poll_update(&name).await {
                    Ok((x, y, grid)) => {
                        *position.lock().await = (x, y);
                        print!("{}", view::render(&grid, &name, x, y));
                    }
                    Err(e) => {
                        warn!("update session ended: {}", e);
                        return;
                    }
                }
            }
        });
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await? {
        let (dx, dy) = match line.trim() {
            "w" => (0, -1),
            "s" => (0, 1),
            "a" => (-1, 0),
            "d" => (1, 0),
            "q" => break,
            other => {
                if !other.is_empty() {
                    warn!("unknown command {:?}", other);
                }
                continue;
            }
        };

        let (x, y) = *position.lock().await;
        // The server validates the target; a blocked step is simply absorbed.
        commands.send_move(&args.name, x + dx, y + dy).await?;
    }

    info!("bye");
    Ok(())
}
