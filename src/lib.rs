//! Cautious move selection for a chess opponent: every legal move is probed
//! one ply deep for tactical hazards and the safest one is played.
pub mod board;
pub mod config;
pub mod error;
pub mod perft;
pub mod search;
pub mod selfplay;
pub mod session;
pub mod uci;

pub use board::{ColoredPiece, Position, Probe};
pub use config::{Selection, SelectorConfig};
pub use error::{EngineError, Result};
pub use search::safety::{Hazard, HazardReport, RuleSet, Severity};
pub use search::{Choice, MoveSelector, Verdict};
pub use session::{GameSession, Outcome};
