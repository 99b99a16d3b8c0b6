use clap::Parser;
use log::info;
use server::network::Server;
use server::service::SyncService;
use shared::Grid;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the listener to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "1234")]
    port: u16,

    /// World map file, one row of cells per line
    #[arg(short, long, default_value = "map.txt")]
    map: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    // An unreadable or empty map is fatal; there is no world to serve.
    let grid = Grid::load(&args.map)?;
    info!(
        "loaded {}x{} world from {}",
        grid.width(),
        grid.height(),
        args.map.display()
    );

    let service = Arc::new(SyncService::new(grid));
    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address, service).await?;

    server.run().await?;
    Ok(())
}
