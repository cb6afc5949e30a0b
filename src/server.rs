//! TCP accept loop and the per-connection conversation.
//!
//! Every accepted connection gets its own tokio task and its own session.
//! The task only awaits client lines; game transitions go through the
//! [`Coordinator`] and are rendered after its locks are released.

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::net::TcpListener;
use tokio::time::Duration;

use crate::core::game::{GameError, Phase, Side, TurnEvent};
use crate::protocol::{
    parse_bombing_choice, parse_line_index, parse_placement, parse_target, BombingChoice, Reply,
};
use crate::session::{
    Action, Command, ConnectionId, Coordinator, Participant, SessionConfig, SessionError,
    SessionId, TurnOutcome,
};
use crate::transport::tcp::{TcpTransport, DEFAULT_MAX_LINE_LEN};
use crate::transport::Transport;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:5555";

/// Per-connection transport limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    pub max_line_len: usize,
    /// A client silent for this long forfeits. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            idle_timeout: None,
        }
    }
}

/// Everything needed to run the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub sessions: SessionConfig,
    pub limits: ConnectionLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            sessions: SessionConfig::default(),
            limits: ConnectionLimits::default(),
        }
    }
}

/// Bind and serve until the process is terminated.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.bind).await?;
    info!("listening on {}", listener.local_addr()?);
    if let Some(seed) = config.sessions.seed {
        info!("using fixed seed {} (sessions are reproducible)", seed);
    }
    let coordinator = Arc::new(Coordinator::new(config.sessions));
    serve(listener, coordinator, config.limits).await
}

/// Accept connections on `listener` forever, one task each.
pub async fn serve(
    listener: TcpListener,
    coordinator: Arc<Coordinator>,
    limits: ConnectionLimits,
) -> anyhow::Result<()> {
    let mut next_connection: ConnectionId = 1;
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("failed to accept connection: {}", e);
                continue;
            }
        };
        let connection = next_connection;
        next_connection += 1;
        info!("connection {} from {}", connection, addr);
        let transport = TcpTransport::with_config(stream, limits.max_line_len, limits.idle_timeout);
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(transport, coordinator, connection).await {
                warn!("connection {} ended with an error: {}", connection, e);
            }
            info!("connection {} closed", connection);
        });
    }
}

/// How a conversation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Finished,
    Disconnected,
}

/// Drive one client through a whole game. A client that goes away early,
/// cleanly or not, forfeits.
pub async fn handle_connection<T: Transport>(
    mut transport: T,
    coordinator: Arc<Coordinator>,
    connection: ConnectionId,
) -> anyhow::Result<()> {
    let session = match coordinator.open(connection) {
        Ok(id) => id,
        Err(SessionError::CapacityReached(max)) => {
            warn!("connection {} refused, {} sessions open", connection, max);
            transport.send(&Reply::ServerFull).await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let participant = Participant::Human(connection);

    let mut conversation = Conversation {
        transport,
        coordinator: Arc::clone(&coordinator),
        session,
        participant,
    };
    let result = conversation.run().await;

    match result {
        Ok(Flow::Finished) => {
            coordinator.close(session)?;
            Ok(())
        }
        Ok(Flow::Disconnected) => {
            info!("connection {} left session {} early", connection, session);
            coordinator.disconnect(session, participant)?;
            Ok(())
        }
        Err(e) => {
            // Best effort; the connection error is the one worth reporting.
            if let Err(forfeit) = coordinator.disconnect(session, participant) {
                warn!("session {}: forfeit failed: {}", session, forfeit);
            }
            Err(e)
        }
    }
}

struct Conversation<T> {
    transport: T,
    coordinator: Arc<Coordinator>,
    session: SessionId,
    participant: Participant,
}

impl<T: Transport> Conversation<T> {
    async fn run(&mut self) -> anyhow::Result<Flow> {
        self.transport.send(&Reply::Welcome).await?;
        if self.setup().await? == Flow::Disconnected {
            return Ok(Flow::Disconnected);
        }
        self.play().await
    }

    fn take_turn(&self, command: Command) -> Result<TurnOutcome, SessionError> {
        self.coordinator
            .take_turn(self.session, self.participant, command)
    }

    async fn setup(&mut self) -> anyhow::Result<Flow> {
        loop {
            let view = self.coordinator.view(self.session)?;
            let Some(length) = view.next_ship_length else {
                self.transport
                    .send(&Reply::SetupComplete {
                        own_board: view.own_board,
                    })
                    .await?;
                return Ok(Flow::Finished);
            };
            self.transport.send(&Reply::PlacePrompt { length }).await?;
            let Some(line) = self.transport.recv_line().await? else {
                return Ok(Flow::Disconnected);
            };

            let (origin, orientation) = match parse_placement(&line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!("session {}: {}", self.session, e);
                    self.transport.send(&Reply::InvalidPlacement).await?;
                    continue;
                }
            };
            match self.take_turn(Command::Place {
                origin,
                orientation,
            }) {
                Ok(_) => {}
                Err(SessionError::Game(GameError::InvalidPlacement(e))) => {
                    debug!("session {}: {}", self.session, e);
                    self.transport.send(&Reply::InvalidPlacement).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn play(&mut self) -> anyhow::Result<Flow> {
        loop {
            self.transport.send(&Reply::TurnPrompt).await?;
            let Some(line) = self.transport.recv_line().await? else {
                return Ok(Flow::Disconnected);
            };
            let target = match parse_target(&line) {
                Ok(target) => target,
                Err(e) => {
                    debug!("session {}: {}", self.session, e);
                    self.transport.send(&Reply::InvalidTarget).await?;
                    continue;
                }
            };

            let mut outcome = match self.take_turn(Command::Attack(target)) {
                Ok(outcome) => outcome,
                Err(SessionError::Game(GameError::InvalidTarget(e))) => {
                    debug!("session {}: {}", self.session, e);
                    self.transport.send(&Reply::InvalidTarget).await?;
                    continue;
                }
                Err(SessionError::NotYourTurn) => {
                    self.transport.send(&Reply::NotYourTurn).await?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            self.report(&outcome).await?;

            if let Action::Attacked(attack) = outcome.action {
                if attack.event == Some(TurnEvent::BombingUnlocked) {
                    match self.bombing().await? {
                        Some(bombing) => {
                            self.report(&bombing).await?;
                            outcome = bombing;
                        }
                        None => return Ok(Flow::Disconnected),
                    }
                }
            }

            if let Phase::GameOver { winner, .. } = outcome.phase {
                self.transport
                    .send(&Reply::GameOver {
                        won: winner == Side::Human,
                    })
                    .await?;
                return Ok(Flow::Finished);
            }
        }
    }

    /// Ask how to use an unlocked bombing until a valid answer is applied.
    /// `None` if the client left.
    async fn bombing(&mut self) -> anyhow::Result<Option<TurnOutcome>> {
        self.transport.send(&Reply::BombingUnlocked).await?;
        loop {
            self.transport.send(&Reply::BombingChoicePrompt).await?;
            let Some(line) = self.transport.recv_line().await? else {
                return Ok(None);
            };
            let command = match parse_bombing_choice(&line) {
                Ok(BombingChoice::Decline) => Command::DeclineBombing,
                Ok(BombingChoice::Axis(axis)) => {
                    self.transport.send(&Reply::BombingAxisPrompt(axis)).await?;
                    let Some(line) = self.transport.recv_line().await? else {
                        return Ok(None);
                    };
                    match parse_line_index(axis, &line) {
                        Ok(target) => Command::Bomb(target),
                        Err(e) => {
                            debug!("session {}: {}", self.session, e);
                            self.transport.send(&Reply::InvalidTarget).await?;
                            continue;
                        }
                    }
                }
                Err(e) => {
                    debug!("session {}: {}", self.session, e);
                    self.transport.send(&Reply::InvalidBombingChoice).await?;
                    continue;
                }
            };

            match self.take_turn(command) {
                Ok(outcome) => return Ok(Some(outcome)),
                Err(SessionError::Game(GameError::InvalidTarget(e))) => {
                    debug!("session {}: {}", self.session, e);
                    self.transport.send(&Reply::InvalidTarget).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Render what the client's command did, then the opponent's reply.
    async fn report(&mut self, outcome: &TurnOutcome) -> anyhow::Result<()> {
        let view = self.coordinator.view(self.session)?;
        match outcome.action {
            Action::Attacked(attack) => {
                self.transport.send(&Reply::Outcome(attack.outcome)).await?;
                self.transport.send(&Reply::EnemyBoard(view.enemy_board)).await?;
            }
            Action::Bombed(bombing) => {
                self.transport
                    .send(&Reply::Bombed {
                        line: bombing.line,
                        hits: bombing.hits,
                        misses: bombing.misses,
                    })
                    .await?;
                self.transport.send(&Reply::EnemyBoard(view.enemy_board)).await?;
            }
            Action::BombingDeclined => self.transport.send(&Reply::BombingDeclined).await?,
            Action::Placed(_) => {}
        }

        if let Some(turn) = outcome.automated {
            self.transport
                .send(&Reply::AutomatedAttack {
                    target: turn.attack.target,
                    outcome: turn.attack.outcome,
                })
                .await?;
            if let Some(bombing) = turn.bombing {
                self.transport.send(&Reply::AutomatedBombing(bombing.line)).await?;
            }
            self.transport.send(&Reply::OwnBoard(view.own_board)).await?;
        }
        Ok(())
    }
}
