//! The turn protocol.
//!
//! ```text
//! AwaitingStart -> Running --BEGIN--> send identity
//!                          --GET_READY--> read board, send READY
//!                          --MOVE--> read turn, decide, send response | NO_RESPONSE
//!                          --END--> Terminated
//! ```
//!
//! Any other token, a malformed frame or a broken connection terminates the session with an
//! error. Slow or failing decision routines never do.

use std::sync::Arc;

use luminis_game::{decode_initial_state, decode_turn, Board};
use luminis_nav::NavigationTable;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::executor::{DeadlineExecutor, DecisionRoutine, TurnOutcome};
use crate::framing::Channel;
use crate::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingStart,
    Running,
    Terminated,
}

/// Counters reported when a match ends normally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns: u64,
    pub timeouts: u64,
}

pub struct Session<S> {
    channel: Channel<S>,
    config: ClientConfig,
    executor: DeadlineExecutor,
    navigation: Option<Arc<NavigationTable>>,
    board: Option<Board>,
    phase: Phase,
    summary: SessionSummary,
}

impl Session<TcpStream> {
    /// Connects to the match server named by `config`.
    pub async fn connect(
        config: ClientConfig,
        routine: impl DecisionRoutine,
    ) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(config.address()).await?;
        stream.set_nodelay(true)?;
        info!(host = %config.host, port = config.port, "Connected to match server");
        Ok(Self::new(stream, config, routine))
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: ClientConfig, routine: impl DecisionRoutine) -> Self {
        let executor = DeadlineExecutor::new(routine, config.max_response_time());
        Self {
            channel: Channel::new(stream),
            config,
            executor,
            navigation: None,
            board: None,
            phase: Phase::AwaitingStart,
            summary: SessionSummary::default(),
        }
    }

    /// Uses `table` for every turn's navigation queries, if it fits the board sent at GET_READY.
    pub fn with_navigation(mut self, table: Arc<NavigationTable>) -> Self {
        self.navigation = Some(table);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Plays the match until END, or until a fatal error closes the connection.
    pub async fn run(mut self) -> Result<SessionSummary, ClientError> {
        while self.phase != Phase::Terminated {
            if let Err(err) = self.step().await {
                self.phase = Phase::Terminated;
                error!(error = %err, turns = self.summary.turns, "Session terminated");
                let _ = self.channel.shutdown().await;
                return Err(err);
            }
        }

        let _ = self.channel.shutdown().await;
        info!(
            turns = self.summary.turns,
            timeouts = self.summary.timeouts,
            "Match finished"
        );
        Ok(self.summary)
    }

    async fn step(&mut self) -> Result<(), ClientError> {
        let token = self.next_message().await?;
        let signal = Signal::parse(&token).ok_or_else(|| ClientError::Protocol {
            token: token.clone(),
        })?;
        debug!(%signal, "Received signal");
        if self.phase == Phase::AwaitingStart {
            self.phase = Phase::Running;
        }

        match signal {
            Signal::Begin => self.channel.send(&self.config.player_uuid).await,
            Signal::GetReady => self.prepare().await,
            Signal::Move => self.play_turn().await,
            Signal::End => {
                self.phase = Phase::Terminated;
                Ok(())
            }
            Signal::Ready | Signal::NoResponse => Err(ClientError::Protocol { token }),
        }
    }

    /// Next non-blank message, trimmed.
    async fn next_message(&mut self) -> Result<String, ClientError> {
        loop {
            let message = self.channel.receive().await?;
            let trimmed = message.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
        }
    }

    async fn prepare(&mut self) -> Result<(), ClientError> {
        let payload = self.next_message().await?;
        let initial = decode_initial_state(&payload)?;
        let grid = initial.grid_for(&self.config.player_uuid)?;
        info!(
            map = %self.config.map_name,
            width = grid.width(),
            height = grid.height(),
            "Received board"
        );

        let mut board = Board::new(grid);
        if let Some(table) = &self.navigation {
            board = board.with_navigation(Arc::clone(table));
        }
        self.board = Some(board);

        self.channel.send(Signal::Ready.as_str()).await
    }

    async fn play_turn(&mut self) -> Result<(), ClientError> {
        let board = self.board.clone().ok_or_else(|| ClientError::OutOfOrder {
            token: Signal::Move.to_string(),
        })?;
        let payload = self.next_message().await?;
        let world = decode_turn(&payload, &board, &self.config.player_uuid)?;

        self.summary.turns += 1;
        let turn = self.summary.turns;
        match self.executor.run(world, turn).await {
            TurnOutcome::Completed(response) => {
                let json = response.to_json()?;
                self.channel.send(&json).await
            }
            TurnOutcome::TimedOut => {
                self.summary.timeouts += 1;
                self.channel.send(Signal::NoResponse.as_str()).await
            }
        }
    }
}
