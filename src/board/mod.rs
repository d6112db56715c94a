pub mod cozy;

pub use cozy::{ColoredPiece, Position, Probe};
