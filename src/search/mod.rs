pub mod mate;
pub mod rating;
pub mod safety;
pub mod selector;

pub use selector::{Choice, MoveSelector, Verdict};
