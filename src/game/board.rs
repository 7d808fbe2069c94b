use crate::game::moves::{BoardMove, BoardMoveExt};
use crate::game::pieces::{Color, Piece};
use crate::utils::bitboard::{
    Bitboard, BitboardExt, BoardSquare, BoardSquareExt, position_to_bitmask,
};
use strum::{EnumCount, IntoEnumIterator};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// castling_flags bits: 0b0000QKqk, where kq/KQ is one while black/white
// may still castle king/queenside
pub const CASTLE_BLACK_KINGSIDE: u8 = 0b0001;
pub const CASTLE_BLACK_QUEENSIDE: u8 = 0b0010;
pub const CASTLE_WHITE_KINGSIDE: u8 = 0b0100;
pub const CASTLE_WHITE_QUEENSIDE: u8 = 0b1000;

// moving from or to one of these squares loses the affected rights
const CASTLING_RIGHTS_MASKS: [u8; 64] = {
    let mut masks = [0xff; 64];

    masks[BoardSquare::A1 as usize] = !CASTLE_WHITE_QUEENSIDE;
    masks[BoardSquare::E1 as usize] = !(CASTLE_WHITE_KINGSIDE | CASTLE_WHITE_QUEENSIDE);
    masks[BoardSquare::H1 as usize] = !CASTLE_WHITE_KINGSIDE;
    masks[BoardSquare::A8 as usize] = !CASTLE_BLACK_QUEENSIDE;
    masks[BoardSquare::E8 as usize] = !(CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE);
    masks[BoardSquare::H8 as usize] = !CASTLE_BLACK_KINGSIDE;

    masks
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Snapshot {
    pub color_bitboards: [Bitboard; Color::COUNT],
    pub piece_bitboards: [Bitboard; Piece::COUNT],
    pub side: Color,
    pub castling_flags: u8,
    pub en_passant_bitmap: Bitboard,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

#[derive(Debug, Clone)]
pub struct Game {
    pub color_bitboards: [Bitboard; Color::COUNT],
    pub piece_bitboards: [Bitboard; Piece::COUNT],

    pub side: Color,

    pub castling_flags: u8,
    pub en_passant_bitmap: Bitboard, // square just crossed by a double push, 0 otherwise

    pub halfmove_clock: u16, // halfmoves since the last capture or pawn advance
    pub fullmove_number: u16, // incremented after black's move

    pub history: Vec<Snapshot>,
}

impl Game {
    pub fn new(fen: Option<&str>) -> Result<Game, String> {
        let fen_game = fen.unwrap_or(START_FEN);

        let mut parts = fen_game.split_whitespace();

        let mut color_bitboards = [Bitboard::default(); Color::COUNT];
        let mut piece_bitboards = [Bitboard::default(); Piece::COUNT];

        let placement = parts.next().ok_or("Missing piece placement")?;

        let mut y = 0u32;
        for rank in placement.split('/') {
            if y == 8 {
                return Err("Too many ranks in piece placement".to_string());
            }

            let mut x = 0u32;
            for char in rank.chars() {
                // numbers encode empty squares
                if let Some(c) = char.to_digit(10) {
                    x += c;
                    continue;
                }

                if x >= 8 {
                    return Err(format!("Rank {} is too long", 8 - y));
                }

                // FEN lists rank 8 first
                let bitmap = position_to_bitmask(x, 7 - y);

                let color = if char.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };

                let piece = Piece::from_char(char.to_ascii_lowercase())
                    .ok_or_else(|| format!("Invalid piece character '{}'", char))?;

                color_bitboards[color as usize] |= bitmap;
                piece_bitboards[piece as usize] |= bitmap;

                x += 1;
            }

            if x != 8 {
                return Err(format!("Rank {} has the wrong length", 8 - y));
            }

            y += 1;
        }

        if y != 8 {
            return Err("Not enough ranks in piece placement".to_string());
        }

        let side = match parts.next() {
            Some("w") => Color::White,
            Some("b") => Color::Black,
            _ => return Err("Invalid side to move".to_string()),
        };

        let mut castling_flags = 0;
        for c in parts.next().ok_or("Missing castling rights")?.chars() {
            match c {
                'k' => castling_flags |= CASTLE_BLACK_KINGSIDE,
                'q' => castling_flags |= CASTLE_BLACK_QUEENSIDE,
                'K' => castling_flags |= CASTLE_WHITE_KINGSIDE,
                'Q' => castling_flags |= CASTLE_WHITE_QUEENSIDE,
                '-' => {}
                _ => return Err(format!("Invalid castling character '{}'", c)),
            }
        }

        let en_passant_bitmap = match parts.next() {
            Some("-") => 0,
            Some(square_string) => match BoardSquare::parse(square_string) {
                Some(square) => square.to_mask(),
                None => return Err(format!("Invalid en passant square '{}'", square_string)),
            },
            None => return Err("Missing en passant square".to_string()),
        };

        let halfmove_clock = parts
            .next()
            .unwrap_or("0")
            .parse()
            .map_err(|_| "Invalid halfmove clock")?;
        let fullmove_number = parts
            .next()
            .unwrap_or("1")
            .parse()
            .map_err(|_| "Invalid fullmove number")?;

        color_bitboards[Color::White as usize].print(Some("White Bitboard"), None);
        color_bitboards[Color::Black as usize].print(Some("Black Bitboard"), None);

        Ok(Game {
            color_bitboards,
            piece_bitboards,
            side,
            castling_flags,
            en_passant_bitmap,
            halfmove_clock,
            fullmove_number,
            history: Vec::new(),
        })
    }

    pub fn get_fen(&self) -> String {
        let mut placement = String::new();

        for rank in (0..8u8).rev() {
            let mut empty = 0;

            for file in 0..8u8 {
                let square = BoardSquare::from_position(file, rank);

                match self.piece_at(square) {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }

                        let c = piece.to_char();
                        placement.push(
                            if self.color_bitboards[Color::White as usize].is_set(square) {
                                c.to_ascii_uppercase()
                            } else {
                                c
                            },
                        );
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                placement.push_str(&empty.to_string());
            }

            if rank > 0 {
                placement.push('/');
            }
        }

        let mut castling = String::new();
        for (flag, c) in [
            (CASTLE_WHITE_KINGSIDE, 'K'),
            (CASTLE_WHITE_QUEENSIDE, 'Q'),
            (CASTLE_BLACK_KINGSIDE, 'k'),
            (CASTLE_BLACK_QUEENSIDE, 'q'),
        ] {
            if self.castling_flags & flag != 0 {
                castling.push(c);
            }
        }

        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = if self.en_passant_bitmap == 0 {
            "-".to_string()
        } else {
            self.en_passant_bitmap.next_index().unparse()
        };

        format!(
            "{} {} {} {} {} {}",
            placement,
            if self.side == Color::White { 'w' } else { 'b' },
            castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    pub fn piece_at(&self, square: BoardSquare) -> Option<Piece> {
        Piece::iter().find(|&piece| self.piece_bitboards[piece as usize].is_set(square))
    }

    pub fn get_occupied(&self) -> Bitboard {
        self.color_bitboards[Color::White as usize] | self.color_bitboards[Color::Black as usize]
    }

    pub fn get_current_occupied(&self) -> Bitboard {
        self.color_bitboards[self.side as usize]
    }

    pub fn get_next_occupied(&self) -> Bitboard {
        self.color_bitboards[(!self.side) as usize]
    }

    pub fn get_king_square(&self, color: Color) -> BoardSquare {
        (self.piece_bitboards[Piece::King as usize] & self.color_bitboards[color as usize])
            .next_index()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            color_bitboards: self.color_bitboards,
            piece_bitboards: self.piece_bitboards,
            side: self.side,
            castling_flags: self.castling_flags,
            en_passant_bitmap: self.en_passant_bitmap,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.color_bitboards = snapshot.color_bitboards;
        self.piece_bitboards = snapshot.piece_bitboards;
        self.side = snapshot.side;
        self.castling_flags = snapshot.castling_flags;
        self.en_passant_bitmap = snapshot.en_passant_bitmap;
        self.halfmove_clock = snapshot.halfmove_clock;
        self.fullmove_number = snapshot.fullmove_number;
    }

    pub fn make_move(&mut self, board_move: BoardMove) {
        self.history.push(self.snapshot());

        let from = board_move.get_from();
        let to = board_move.get_to();
        let from_mask = from.to_mask();
        let to_mask = to.to_mask();
        let move_mask = from_mask | to_mask;

        let piece = self
            .piece_at(from)
            .expect("No piece at the move's origin square");

        // remove whatever is captured before moving the piece
        if board_move.is_en_passant() {
            let captured_mask = if self.side == Color::White {
                to_mask >> 8
            } else {
                to_mask << 8
            };

            self.piece_bitboards[Piece::Pawn as usize] &= !captured_mask;
            self.color_bitboards[(!self.side) as usize] &= !captured_mask;
        } else if board_move.is_capture() {
            for captured in Piece::iter() {
                self.piece_bitboards[captured as usize] &= !to_mask;
            }

            self.color_bitboards[(!self.side) as usize] &= !to_mask;
        }

        self.piece_bitboards[piece as usize] ^= move_mask;
        self.color_bitboards[self.side as usize] ^= move_mask;

        if let Some(promotion) = board_move.get_promotion() {
            self.piece_bitboards[Piece::Pawn as usize] &= !to_mask;
            self.piece_bitboards[promotion as usize] |= to_mask;
        }

        if board_move.is_castle() {
            let rook_mask = if to == BoardSquare::G1 {
                BoardSquare::H1.to_mask() | BoardSquare::F1.to_mask()
            } else if to == BoardSquare::C1 {
                BoardSquare::A1.to_mask() | BoardSquare::D1.to_mask()
            } else if to == BoardSquare::G8 {
                BoardSquare::H8.to_mask() | BoardSquare::F8.to_mask()
            } else {
                BoardSquare::A8.to_mask() | BoardSquare::D8.to_mask()
            };

            self.piece_bitboards[Piece::Rook as usize] ^= rook_mask;
            self.color_bitboards[self.side as usize] ^= rook_mask;
        }

        self.en_passant_bitmap = if board_move.is_double_push() {
            if self.side == Color::White {
                from_mask << 8
            } else {
                from_mask >> 8
            }
        } else {
            0
        };

        self.castling_flags &=
            CASTLING_RIGHTS_MASKS[from as usize] & CASTLING_RIGHTS_MASKS[to as usize];

        if piece == Piece::Pawn || board_move.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if self.side == Color::Black {
            self.fullmove_number += 1;
        }

        self.side = !self.side;
    }

    pub fn unmake_move(&mut self) {
        let snapshot = self
            .history
            .pop()
            .expect("unmake_move called with an empty history");

        self.restore(snapshot);
    }
}
