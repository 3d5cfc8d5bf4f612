mod api;
mod blockchain;
mod config;
mod miner;
mod network;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use env_logger::Env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use api::AppState;
use config::{DEFAULT_HOST, DEFAULT_PORT, NetworkConfig};
use network::Network;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // `.env` may only carry RUST_LOG.
    let _ = dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let miner_count = prompt_miner_count(&mut io::stdin().lock(), &mut io::stdout())?;
    let network = Arc::new(Network::launch(NetworkConfig::with_miners(miner_count))?);

    println!("⛓️ Starting PoW network API at http://{DEFAULT_HOST}:{DEFAULT_PORT}");

    let state = web::Data::new(AppState::new(Arc::clone(&network)));

    let served = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((DEFAULT_HOST, DEFAULT_PORT))?
    .run()
    .await;

    network.shutdown();
    served
}

/// Ask for the initial number of miners and read it from `input`.
fn prompt_miner_count(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<usize> {
    write!(output, "Initial miner count: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    parse_miner_count(&line)
}

fn parse_miner_count(line: &str) -> io::Result<usize> {
    let trimmed = line.trim();
    trimmed.parse().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid miner count {trimmed:?}: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_miner_count_after_prompt() {
        let mut input = io::Cursor::new(b"4\n".to_vec());
        let mut output = Vec::new();
        assert_eq!(prompt_miner_count(&mut input, &mut output).unwrap(), 4);
        assert_eq!(output, b"Initial miner count: ".to_vec());
    }

    #[test]
    fn malformed_count_is_invalid_input() {
        for bad in ["", "two", "-1", "3.5"] {
            let err = parse_miner_count(bad).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }
        assert_eq!(parse_miner_count("  0 \r\n").unwrap(), 0);
    }
}
