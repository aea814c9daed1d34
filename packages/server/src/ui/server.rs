//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{
    ConnectUserUseCase, DisconnectUserUseCase, JoinMatchmakingUseCase, QueryPositionUseCase,
    SubmitMoveUseCase,
};

use super::{
    handler::{health_check, join_matchmaking, websocket_handler},
    signal::shutdown_signal,
    state::{AppState, PumpConfig},
};

/// Chess match coordinator server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_user_usecase,
///     disconnect_user_usecase,
///     join_matchmaking_usecase,
///     submit_move_usecase,
///     query_position_usecase,
///     PumpConfig::default(),
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ConnectUserUseCase（ユーザー接続のユースケース）
    connect_user_usecase: Arc<ConnectUserUseCase>,
    /// DisconnectUserUseCase（ユーザー切断のユースケース）
    disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    /// JoinMatchmakingUseCase（マッチメイキング参加のユースケース）
    join_matchmaking_usecase: Arc<JoinMatchmakingUseCase>,
    /// SubmitMoveUseCase（指し手送信のユースケース）
    submit_move_usecase: Arc<SubmitMoveUseCase>,
    /// QueryPositionUseCase（局面問い合わせのユースケース）
    query_position_usecase: Arc<QueryPositionUseCase>,
    pump: PumpConfig,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        connect_user_usecase: Arc<ConnectUserUseCase>,
        disconnect_user_usecase: Arc<DisconnectUserUseCase>,
        join_matchmaking_usecase: Arc<JoinMatchmakingUseCase>,
        submit_move_usecase: Arc<SubmitMoveUseCase>,
        query_position_usecase: Arc<QueryPositionUseCase>,
        pump: PumpConfig,
    ) -> Self {
        Self {
            connect_user_usecase,
            disconnect_user_usecase,
            join_matchmaking_usecase,
            submit_move_usecase,
            query_position_usecase,
            pump,
        }
    }

    /// Build the router with every endpoint
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_user_usecase: self.connect_user_usecase,
            disconnect_user_usecase: self.disconnect_user_usecase,
            join_matchmaking_usecase: self.join_matchmaking_usecase,
            submit_move_usecase: self.submit_move_usecase,
            query_position_usecase: self.query_position_usecase,
            pump: self.pump,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/events", get(websocket_handler))
            // HTTP エンドポイント
            .route("/matchmaking", post(join_matchmaking))
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/events", bind_addr);
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl+C / SIGTERM
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!("Kingside server listening on {}", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
