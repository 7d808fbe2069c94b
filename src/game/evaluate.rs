use strum::IntoEnumIterator;

use crate::game::board::Game;
use crate::game::pieces::{Color, Piece};

pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;
pub const KING_VALUE: i32 = 0;

pub const BISHOP_PAIR_BONUS: i32 = 30;
pub const TEMPO_BONUS: i32 = 10;

pub fn get_piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => KING_VALUE,
    }
}

impl Game {
    /// Static material balance in centipawns, positive when white is ahead.
    pub fn evaluate(&self) -> i32 {
        let material = self.evaluate_side(Color::White) - self.evaluate_side(Color::Black);

        match self.side {
            Color::White => material + TEMPO_BONUS,
            Color::Black => material - TEMPO_BONUS,
        }
    }

    fn evaluate_side(&self, color: Color) -> i32 {
        let pieces = self.color_bitboards[color as usize];

        let mut value = 0;

        for piece in Piece::iter() {
            let count = (self.piece_bitboards[piece as usize] & pieces).count_ones() as i32;
            value += count * get_piece_value(piece);
        }

        if (self.piece_bitboards[Piece::Bishop as usize] & pieces).count_ones() >= 2 {
            value += BISHOP_PAIR_BONUS;
        }

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::{BoardMove, BoardMoveExt};
    use crate::utils::magic::AttackTables;

    #[test]
    fn test_start_position_is_balanced() {
        let game = Game::new(None).unwrap();
        assert_eq!(game.evaluate(), TEMPO_BONUS);
    }

    #[test]
    fn test_missing_queen_shifts_material() {
        let game =
            Game::new(Some("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")).unwrap();

        assert_eq!(game.evaluate(), QUEEN_VALUE + TEMPO_BONUS);
    }

    #[test]
    fn test_bishop_pair_and_tempo_sign() {
        let game = Game::new(Some("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1")).unwrap();
        assert_eq!(
            game.evaluate(),
            2 * BISHOP_VALUE + BISHOP_PAIR_BONUS + TEMPO_BONUS
        );

        let game = Game::new(Some("4k3/8/8/8/8/8/8/2B1KB2 b - - 0 1")).unwrap();
        assert_eq!(
            game.evaluate(),
            2 * BISHOP_VALUE + BISHOP_PAIR_BONUS - TEMPO_BONUS
        );
    }

    #[test]
    fn test_capture_updates_balance() {
        let tables = AttackTables::new();
        let mut game = Game::new(Some("4k3/8/8/3q4/8/8/8/3QK3 w - - 0 1")).unwrap();

        assert_eq!(game.evaluate(), TEMPO_BONUS);

        let capture = BoardMove::parse("d1d5").unwrap();
        let (count, moves) = game.get_moves(&tables);
        let board_move = moves[0..count]
            .iter()
            .find(|board_move| board_move.matches(capture))
            .copied()
            .unwrap();

        game.make_move(board_move);
        assert_eq!(game.evaluate(), QUEEN_VALUE - TEMPO_BONUS);

        game.unmake_move();
        assert_eq!(game.evaluate(), TEMPO_BONUS);
    }
}
