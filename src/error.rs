use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },
    #[error("no legal moves in position {fen}")]
    NoLegalMoves { fen: String },
    #[error("invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("unknown move: {text}")]
    UnknownMove { text: String },
    #[error("it is not the engine's turn")]
    NotEngineTurn,
    #[error("it is not the opponent's turn")]
    NotOpponentTurn,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("the game is already over")]
    GameOver,
    #[error("cannot read openings file {path}: {source}")]
    Openings {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
