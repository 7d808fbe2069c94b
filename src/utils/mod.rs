pub mod bitboard;
pub mod magic;

pub use bitboard::*;
pub use magic::*;
