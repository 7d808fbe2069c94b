pub mod board;
pub mod evaluate;
pub mod movegen;
pub mod moves;
pub mod perft;
pub mod pieces;

pub use board::*;
pub use evaluate::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use pieces::*;
