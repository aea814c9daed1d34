//! Real-time chess match coordinator.
//!
//! Pairs players from the matchmaking queue, relays validated moves between
//! them over WebSocket and updates ratings when a game concludes.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kingside-server -- --users users.json
//! cargo run --bin kingside-server -- --host 0.0.0.0 --port 3000 --users users.json
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use kingside_server::{
    infrastructure::{
        registry::{DEFAULT_OUTBOUND_CAPACITY, InMemoryConnectionRegistry},
        repository::{InMemorySessionRepository, InMemoryUserRepository},
    },
    ui::{PumpConfig, Server},
    usecase::{
        ConnectUserUseCase, DEFAULT_MATCHMAKING_CAPACITY, DisconnectUserUseCase,
        JoinMatchmakingUseCase, Matchmaker, QueryPositionUseCase, SubmitMoveUseCase,
        UpdateRatingUseCase, matchmaking_channel,
    },
};
use kingside_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "kingside-server")]
#[command(about = "Real-time chess match coordinator", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// JSON file with the user records allowed to connect
    #[arg(long)]
    users: Option<PathBuf>,

    /// Per-connection outbound queue bound (never below 10)
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_CAPACITY)]
    outbound_capacity: usize,

    /// Capacity of the matchmaking join channel
    #[arg(long, default_value_t = DEFAULT_MATCHMAKING_CAPACITY)]
    matchmaking_capacity: usize,

    /// Read deadline in seconds, refreshed on every pong
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pong_wait_secs: u64,

    /// Write deadline in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    write_wait_secs: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. Connection registry
    // 3. Matchmaker
    // 4. UseCases
    // 5. Server

    // 1. Create Repositories (in-memory database)
    let users = match &args.users {
        Some(path) => match InMemoryUserRepository::from_file(path).await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("Failed to load users from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No --users file given, nobody will be able to authenticate");
            InMemoryUserRepository::new()
        }
    };
    tracing::info!("{} users loaded", users.count().await);
    let users = Arc::new(users);
    let sessions = Arc::new(InMemorySessionRepository::new());
    let clock = Arc::new(SystemClock);

    // 2. Create Connection registry
    let registry = Arc::new(InMemoryConnectionRegistry::new());

    // 3. Start Matchmaker
    let (join_tx, join_rx) = matchmaking_channel(args.matchmaking_capacity);
    Matchmaker::new(join_rx, sessions.clone(), registry.clone(), clock.clone()).spawn();

    // 4. Create UseCases
    let connect_user_usecase = Arc::new(ConnectUserUseCase::new(
        users.clone(),
        sessions.clone(),
        registry.clone(),
    ));
    let disconnect_user_usecase = Arc::new(DisconnectUserUseCase::new(registry.clone()));
    let join_matchmaking_usecase = Arc::new(JoinMatchmakingUseCase::new(users.clone(), join_tx));
    let update_rating_usecase = Arc::new(UpdateRatingUseCase::new(
        sessions.clone(),
        users.clone(),
        clock.clone(),
    ));
    let submit_move_usecase = Arc::new(SubmitMoveUseCase::new(
        sessions.clone(),
        registry.clone(),
        update_rating_usecase,
        clock,
    ));
    let query_position_usecase = Arc::new(QueryPositionUseCase::new(registry.clone()));

    // 5. Create and run the server
    let pump = PumpConfig {
        pong_wait: Duration::from_secs(args.pong_wait_secs),
        write_wait: Duration::from_secs(args.write_wait_secs),
        outbound_capacity: args.outbound_capacity,
    };
    let server = Server::new(
        connect_user_usecase,
        disconnect_user_usecase,
        join_matchmaking_usecase,
        submit_move_usecase,
        query_position_usecase,
        pump,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
