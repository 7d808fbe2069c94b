use crate::game::pieces::Piece;
use crate::utils::bitboard::{BoardSquare, BoardSquareExt};

/// Packed move: bits 0-5 origin, 6-11 destination, 12-16 flags,
/// 17-19 promotion piece (only meaningful with the promotion flag).
pub type BoardMove = u32;

pub trait BoardMoveExt {
    const QUIET: u8 = 0;
    const CAPTURE: u8 = 1 << 0;
    const DOUBLE_PUSH: u8 = 1 << 1;
    const EN_PASSANT: u8 = 1 << 2;
    const CASTLE: u8 = 1 << 3;
    const PROMOTION: u8 = 1 << 4;

    fn empty() -> BoardMove;
    fn create(from: BoardSquare, to: BoardSquare, flags: u8) -> BoardMove;
    fn create_promotion(from: BoardSquare, to: BoardSquare, flags: u8, piece: Piece) -> BoardMove;
    fn get_from(&self) -> BoardSquare;
    fn get_to(&self) -> BoardSquare;
    fn get_flags(&self) -> u8;
    fn get_promotion(&self) -> Option<Piece>;
    fn is_capture(&self) -> bool;
    fn is_double_push(&self) -> bool;
    fn is_en_passant(&self) -> bool;
    fn is_castle(&self) -> bool;
    fn is_promotion(&self) -> bool;
    fn matches(&self, other: BoardMove) -> bool;
    fn parse(string: &str) -> Option<BoardMove>;
    fn unparse(&self) -> String;
}

impl BoardMoveExt for u32 {
    fn empty() -> BoardMove {
        0
    }

    fn create(from: BoardSquare, to: BoardSquare, flags: u8) -> BoardMove {
        from as u32 | (to as u32) << 6 | (flags as u32) << 12
    }

    fn create_promotion(from: BoardSquare, to: BoardSquare, flags: u8, piece: Piece) -> BoardMove {
        Self::create(from, to, flags | Self::PROMOTION) | (piece as u32) << 17
    }

    fn get_from(&self) -> BoardSquare {
        (self & 0x3f) as BoardSquare
    }

    fn get_to(&self) -> BoardSquare {
        (self >> 6 & 0x3f) as BoardSquare
    }

    fn get_flags(&self) -> u8 {
        (self >> 12 & 0x1f) as u8
    }

    fn get_promotion(&self) -> Option<Piece> {
        if self.is_promotion() {
            Piece::from_repr((self >> 17 & 0x7) as usize)
        } else {
            None
        }
    }

    fn is_capture(&self) -> bool {
        self.get_flags() & Self::CAPTURE != 0
    }

    fn is_double_push(&self) -> bool {
        self.get_flags() & Self::DOUBLE_PUSH != 0
    }

    fn is_en_passant(&self) -> bool {
        self.get_flags() & Self::EN_PASSANT != 0
    }

    fn is_castle(&self) -> bool {
        self.get_flags() & Self::CASTLE != 0
    }

    fn is_promotion(&self) -> bool {
        self.get_flags() & Self::PROMOTION != 0
    }

    /// Same origin, destination and promotion piece; flags are ignored, so a
    /// parsed move can be compared against generated ones.
    fn matches(&self, other: BoardMove) -> bool {
        self.get_from() == other.get_from()
            && self.get_to() == other.get_to()
            && self.get_promotion() == other.get_promotion()
    }

    fn parse(string: &str) -> Option<BoardMove> {
        let from = BoardSquare::parse(string.get(0..2)?)?;
        let to = BoardSquare::parse(string.get(2..4)?)?;

        match string.get(4..) {
            None | Some("") => Some(Self::create(from, to, Self::QUIET)),
            Some(promotion) if promotion.len() == 1 => {
                let piece = promotion.chars().next().and_then(Piece::from_char)?;

                match piece {
                    Piece::Pawn | Piece::King => None,
                    _ => Some(Self::create_promotion(from, to, Self::QUIET, piece)),
                }
            }
            Some(_) => None,
        }
    }

    fn unparse(&self) -> String {
        match self.get_promotion() {
            Some(piece) => format!(
                "{}{}{}",
                self.get_from().unparse(),
                self.get_to().unparse(),
                piece.to_char()
            ),
            None => format!("{}{}", self.get_from().unparse(), self.get_to().unparse()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_fields() {
        let board_move = BoardMove::create(BoardSquare::E2, BoardSquare::E4, BoardMove::DOUBLE_PUSH);

        assert_eq!(board_move.get_from(), BoardSquare::E2);
        assert_eq!(board_move.get_to(), BoardSquare::E4);
        assert!(board_move.is_double_push());
        assert!(!board_move.is_capture());
        assert_eq!(board_move.get_promotion(), None);

        let board_move = BoardMove::create_promotion(
            BoardSquare::A7,
            BoardSquare::B8,
            BoardMove::CAPTURE,
            Piece::Knight,
        );

        assert!(board_move.is_capture());
        assert!(board_move.is_promotion());
        assert_eq!(board_move.get_promotion(), Some(Piece::Knight));
    }

    #[test]
    fn test_parse_unparse() {
        assert_eq!(
            BoardMove::parse("e2e4"),
            Some(BoardMove::create(
                BoardSquare::E2,
                BoardSquare::E4,
                BoardMove::QUIET
            ))
        );
        assert_eq!(
            BoardMove::parse("e7e8q").unwrap().get_promotion(),
            Some(Piece::Queen)
        );

        assert_eq!(BoardMove::parse(""), None);
        assert_eq!(BoardMove::parse("e2"), None);
        assert_eq!(BoardMove::parse("e2e9"), None);
        assert_eq!(BoardMove::parse("e7e8x"), None);
        assert_eq!(BoardMove::parse("e7e8k"), None);
        assert_eq!(BoardMove::parse("e7e8qq"), None);

        let board_move = BoardMove::create_promotion(
            BoardSquare::H7,
            BoardSquare::H8,
            BoardMove::CAPTURE,
            Piece::Rook,
        );
        assert_eq!(board_move.unparse(), "h7h8r");
        assert!(BoardMove::parse("h7h8r").unwrap().matches(board_move));

        assert_eq!(
            BoardMove::create(BoardSquare::G1, BoardSquare::F3, BoardMove::QUIET).unparse(),
            "g1f3"
        );
    }

    #[test]
    fn test_matches_ignores_flags() {
        let generated = BoardMove::create(BoardSquare::D5, BoardSquare::E6, BoardMove::CAPTURE);
        let parsed = BoardMove::parse("d5e6").unwrap();

        assert!(parsed.matches(generated));
        assert!(!parsed.matches(BoardMove::create(
            BoardSquare::D5,
            BoardSquare::E5,
            BoardMove::QUIET
        )));

        let queen = BoardMove::parse("a7a8q").unwrap();
        let rook = BoardMove::parse("a7a8r").unwrap();
        assert!(!queen.matches(rook));
    }
}
