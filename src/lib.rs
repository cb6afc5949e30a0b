#![cfg_attr(not(feature = "std"), no_std)]

pub mod core;
pub mod player;

#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;

pub use crate::core::*;
pub use player::{take_automated_turn, AiPlayer, AutomatedTurn, Player};

#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use session::{Command, Coordinator, Participant, SessionError, TurnOutcome};
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
