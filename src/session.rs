use cozy_chess::{Color, Move};
use log::info;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::Serialize;

use crate::board::Position;
use crate::error::{EngineError, Result};
use crate::search::MoveSelector;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Ongoing,
    EngineWon,
    OpponentWon,
    Draw,
}

/// One game between the engine and an outside opponent.
pub struct GameSession<R = SmallRng> {
    position: Position,
    engine: Color,
    selector: MoveSelector<R>,
}

impl<R: Rng> GameSession<R> {
    pub fn new(engine: Color, selector: MoveSelector<R>) -> Self {
        Self::from_position(Position::startpos(), engine, selector)
    }

    pub fn from_position(position: Position, engine: Color, selector: MoveSelector<R>) -> Self {
        Self { position, engine, selector }
    }

    pub fn position(&self) -> &Position { &self.position }

    pub fn engine_color(&self) -> Color { self.engine }

    pub fn is_engine_turn(&self) -> bool { self.position.side_to_move() == self.engine }

    /// Moves played in this session, as UCI text.
    pub fn moves(&self) -> Vec<String> { self.position.history_uci() }

    pub fn outcome(&self) -> Outcome {
        if self.position.is_checkmate() {
            if self.is_engine_turn() { Outcome::OpponentWon } else { Outcome::EngineWon }
        } else if self.position.is_stalemate() || self.position.is_fifty_move_draw() {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }

    pub fn play_opponent(&mut self, uci: &str) -> Result<Move> {
        self.ensure_ongoing()?;
        if self.is_engine_turn() {
            return Err(EngineError::NotOpponentTurn);
        }
        self.position.make_move_uci(uci)
    }

    pub fn play_engine(&mut self) -> Result<Move> {
        self.ensure_ongoing()?;
        if !self.is_engine_turn() {
            return Err(EngineError::NotEngineTurn);
        }
        let mv = self.selector.choose_move(&mut self.position)?;
        info!("engine plays {}", self.position.to_uci(mv));
        self.position.apply(mv)?;
        Ok(mv)
    }

    /// Rewinds to the last position in which the opponent was to move,
    /// taking back the engine's reply and the opponent's move before it.
    pub fn undo_turn(&mut self) -> Result<()> {
        let plies = if self.is_engine_turn() { 1 } else { 2 };
        if self.position.ply_count() < plies {
            return Err(EngineError::NothingToUndo);
        }
        for _ in 0..plies {
            self.position.undo();
        }
        Ok(())
    }

    fn ensure_ongoing(&self) -> Result<()> {
        match self.outcome() {
            Outcome::Ongoing => Ok(()),
            _ => Err(EngineError::GameOver),
        }
    }
}
