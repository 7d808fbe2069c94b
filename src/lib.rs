pub mod game;
pub mod utils;


pub use crate::game::*;
pub use crate::utils::*;
