use crate::game::Color;
use strum::EnumCount;

pub type Bitboard = u64;
pub type BoardSquare = u8;

pub trait BitboardExt {
    fn next_index(&self) -> BoardSquare;
    fn is_set(&self, index: BoardSquare) -> bool;
    fn print(&self, title: Option<&str>, position: Option<BoardSquare>);
    fn iter_positions(&self) -> BitboardIterator;
}

// used like this because we can't have a const fn as a trait,
// but we want to use it for the compile-time bitmap calculation
pub const fn position_to_bitmask(file: u32, rank: u32) -> u64 {
    1u64 << file + rank * 8
}

pub const fn is_position_valid(file: isize, rank: isize) -> bool {
    file >= 0 && file < 8 && rank >= 0 && rank < 8
}

impl BitboardExt for u64 {
    fn next_index(&self) -> BoardSquare {
        self.trailing_zeros() as BoardSquare
    }

    fn is_set(&self, index: BoardSquare) -> bool {
        self & (1 << index) != 0
    }

    fn print(&self, title: Option<&str>, position: Option<BoardSquare>) {
        if let Some(title_text) = title {
            log::debug!(
                "\x1b[97m{}{}\x1b[0m",
                " ".repeat((3 * 8 - title_text.len()) / 2),
                title_text
            );
        }

        for rank in (0..8).rev() {
            let mut line = String::new();
            for file in 0..8 {
                let is_marked_position =
                    position.map_or(false, |b| b.get_file() == file && b.get_rank() == rank);

                line.push_str(
                    match (
                        position_to_bitmask(file as u32, rank as u32) & self != 0,
                        is_marked_position,
                    ) {
                        (_, true) => "\x1b[93m ● \x1b[0m",
                        (true, false) => "\x1b[97m 1 \x1b[0m",
                        (false, false) => "\x1b[90m 0 \x1b[0m",
                    },
                );
            }
            log::debug!("{}", line);
        }

        if title.is_some() {
            log::debug!("");
        }
    }

    fn iter_positions(&self) -> BitboardIterator {
        BitboardIterator { remaining: *self }
    }
}

pub trait BoardSquareExt {
    fn get_file(&self) -> u8;
    fn get_rank(&self) -> u8;
    fn parse(string: &str) -> Option<BoardSquare>;
    fn unparse(&self) -> String;
    fn from_position(file: u8, rank: u8) -> BoardSquare;
    fn to_mask(&self) -> Bitboard;

    const A1: BoardSquare = 0;
    const B1: BoardSquare = 1;
    const C1: BoardSquare = 2;
    const D1: BoardSquare = 3;
    const E1: BoardSquare = 4;
    const F1: BoardSquare = 5;
    const G1: BoardSquare = 6;
    const H1: BoardSquare = 7;

    const A2: BoardSquare = 8;
    const B2: BoardSquare = 9;
    const C2: BoardSquare = 10;
    const D2: BoardSquare = 11;
    const E2: BoardSquare = 12;
    const F2: BoardSquare = 13;
    const G2: BoardSquare = 14;
    const H2: BoardSquare = 15;

    const A3: BoardSquare = 16;
    const B3: BoardSquare = 17;
    const C3: BoardSquare = 18;
    const D3: BoardSquare = 19;
    const E3: BoardSquare = 20;
    const F3: BoardSquare = 21;
    const G3: BoardSquare = 22;
    const H3: BoardSquare = 23;

    const A4: BoardSquare = 24;
    const B4: BoardSquare = 25;
    const C4: BoardSquare = 26;
    const D4: BoardSquare = 27;
    const E4: BoardSquare = 28;
    const F4: BoardSquare = 29;
    const G4: BoardSquare = 30;
    const H4: BoardSquare = 31;

    const A5: BoardSquare = 32;
    const B5: BoardSquare = 33;
    const C5: BoardSquare = 34;
    const D5: BoardSquare = 35;
    const E5: BoardSquare = 36;
    const F5: BoardSquare = 37;
    const G5: BoardSquare = 38;
    const H5: BoardSquare = 39;

    const A6: BoardSquare = 40;
    const B6: BoardSquare = 41;
    const C6: BoardSquare = 42;
    const D6: BoardSquare = 43;
    const E6: BoardSquare = 44;
    const F6: BoardSquare = 45;
    const G6: BoardSquare = 46;
    const H6: BoardSquare = 47;

    const A7: BoardSquare = 48;
    const B7: BoardSquare = 49;
    const C7: BoardSquare = 50;
    const D7: BoardSquare = 51;
    const E7: BoardSquare = 52;
    const F7: BoardSquare = 53;
    const G7: BoardSquare = 54;
    const H7: BoardSquare = 55;

    const A8: BoardSquare = 56;
    const B8: BoardSquare = 57;
    const C8: BoardSquare = 58;
    const D8: BoardSquare = 59;
    const E8: BoardSquare = 60;
    const F8: BoardSquare = 61;
    const G8: BoardSquare = 62;
    const H8: BoardSquare = 63;
}

impl BoardSquareExt for u8 {
    fn get_file(&self) -> u8 {
        self % 8
    }

    fn get_rank(&self) -> u8 {
        self / 8
    }

    fn parse(string: &str) -> Option<BoardSquare> {
        match string.as_bytes() {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => {
                Some(BoardSquare::from_position(file - b'a', rank - b'1'))
            }
            _ => None,
        }
    }

    fn unparse(&self) -> String {
        format!(
            "{}{}",
            (self.get_file() + b'a') as char,
            (self.get_rank() + b'1') as char
        )
    }

    fn from_position(file: u8, rank: u8) -> BoardSquare {
        file + rank * 8
    }

    fn to_mask(&self) -> Bitboard {
        1 << self
    }
}

pub struct BitboardIterator {
    remaining: u64,
}

impl Iterator for BitboardIterator {
    type Item = BoardSquare;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let index = self.remaining.trailing_zeros() as u8;
        self.remaining &= self.remaining - 1; // Clear the lowest set bit

        Some(index)
    }
}

type SquareTable = [Bitboard; 64];

const ROOK_DELTAS: [[i8; 2]; 4] = [[1, 0], [0, 1], [-1, 0], [0, -1]];
const BISHOP_DELTAS: [[i8; 2]; 4] = [[1, 1], [1, -1], [-1, 1], [-1, -1]];
const KNIGHT_DELTAS: [[i8; 2]; 8] = [
    [1, 2],
    [2, 1],
    [-1, 2],
    [-2, 1],
    [1, -2],
    [2, -1],
    [-1, -2],
    [-2, -1],
];
const KING_DELTAS: [[i8; 2]; 8] = [
    [1, 0],
    [0, 1],
    [-1, 0],
    [0, -1],
    [1, 1],
    [1, -1],
    [-1, 1],
    [-1, -1],
];
const PAWN_CAPTURE_DELTAS: [[[i8; 2]; 2]; Color::COUNT] = [
    [[-1, -1], [1, -1]], // black pawns capture toward rank 1
    [[-1, 1], [1, 1]],
];

/// Walks every delta from the given square, collecting reached squares.
///
/// Sliders keep stepping until they leave the board or land on a blocker;
/// the blocker square itself is included. With `trim_edges`, a ray that runs
/// off the board loses its final square, which is what turns full rays into
/// the relevant-occupancy masks used for magic hashing.
const fn trace_attacks(
    file: usize,
    rank: usize,
    deltas: &[[i8; 2]],
    slider: bool,
    trim_edges: bool,
    blockers: Bitboard,
) -> Bitboard {
    let mut attacks = 0;

    let mut i = 0;
    while i < deltas.len() {
        let mut f = file as i8 + deltas[i][0];
        let mut r = rank as i8 + deltas[i][1];

        while is_position_valid(f as isize, r as isize) {
            attacks |= position_to_bitmask(f as u32, r as u32);

            if !slider || blockers & position_to_bitmask(f as u32, r as u32) != 0 {
                break;
            }

            f += deltas[i][0];
            r += deltas[i][1];
        }

        if trim_edges && !is_position_valid(f as isize, r as isize) {
            attacks &= !position_to_bitmask((f - deltas[i][0]) as u32, (r - deltas[i][1]) as u32);
        }

        i += 1;
    }

    attacks
}

const fn calculate_leaper_table(deltas: &[[i8; 2]]) -> SquareTable {
    let mut table = [0; 64];

    let mut square = 0;
    while square < 64 {
        table[square] = trace_attacks(square % 8, square / 8, deltas, false, false, 0);
        square += 1;
    }

    table
}

const fn calculate_blocker_masks(deltas: &[[i8; 2]]) -> SquareTable {
    let mut table = [0; 64];

    let mut square = 0;
    while square < 64 {
        table[square] = trace_attacks(square % 8, square / 8, deltas, true, true, 0);
        square += 1;
    }

    table
}

const fn calculate_pawn_tables() -> [SquareTable; Color::COUNT] {
    let mut tables = [[0; 64]; Color::COUNT];

    let mut color = 0;
    while color < Color::COUNT {
        let mut square = 0;
        while square < 64 {
            tables[color][square] = trace_attacks(
                square % 8,
                square / 8,
                &PAWN_CAPTURE_DELTAS[color],
                false,
                false,
                0,
            );
            square += 1;
        }
        color += 1;
    }

    tables
}

pub const PAWN_ATTACKS: [SquareTable; Color::COUNT] = calculate_pawn_tables();
pub const KNIGHT_ATTACKS: SquareTable = calculate_leaper_table(&KNIGHT_DELTAS);
pub const KING_ATTACKS: SquareTable = calculate_leaper_table(&KING_DELTAS);

pub const ROOK_BLOCKER_MASKS: SquareTable = calculate_blocker_masks(&ROOK_DELTAS);
pub const BISHOP_BLOCKER_MASKS: SquareTable = calculate_blocker_masks(&BISHOP_DELTAS);

// reference attacks for the magic builder and its equivalence tests
pub const fn rook_attacks_slow(square: BoardSquare, blockers: Bitboard) -> Bitboard {
    trace_attacks(
        (square % 8) as usize,
        (square / 8) as usize,
        &ROOK_DELTAS,
        true,
        false,
        blockers,
    )
}

pub const fn bishop_attacks_slow(square: BoardSquare, blockers: Bitboard) -> Bitboard {
    trace_attacks(
        (square % 8) as usize,
        (square / 8) as usize,
        &BISHOP_DELTAS,
        true,
        false,
        blockers,
    )
}

pub fn is_aligned(a: BoardSquare, b: BoardSquare) -> bool {
    let df = b.get_file() as i8 - a.get_file() as i8;
    let dr = b.get_rank() as i8 - a.get_rank() as i8;

    df == 0 || dr == 0 || df.abs() == dr.abs()
}

/// Squares strictly between two aligned squares; empty when unaligned or adjacent.
pub fn ray_between(a: BoardSquare, b: BoardSquare) -> Bitboard {
    if a == b || !is_aligned(a, b) {
        return 0;
    }

    let df = (b.get_file() as i8 - a.get_file() as i8).signum();
    let dr = (b.get_rank() as i8 - a.get_rank() as i8).signum();

    let mut ray = 0;
    let mut f = a.get_file() as i8 + df;
    let mut r = a.get_rank() as i8 + dr;

    while BoardSquare::from_position(f as u8, r as u8) != b {
        ray |= position_to_bitmask(f as u32, r as u32);
        f += df;
        r += dr;
    }

    ray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_parse_unparse() {
        assert_eq!(BoardSquare::parse("a1"), Some(BoardSquare::A1));
        assert_eq!(BoardSquare::parse("h8"), Some(BoardSquare::H8));
        assert_eq!(BoardSquare::parse("e4"), Some(28));
        assert_eq!(BoardSquare::parse("i4"), None);
        assert_eq!(BoardSquare::parse("e9"), None);
        assert_eq!(BoardSquare::parse("e"), None);
        assert_eq!(BoardSquare::parse("e44"), None);

        for square in 0..64u8 {
            assert_eq!(BoardSquare::parse(&square.unparse()), Some(square));
        }
    }

    #[test]
    fn test_bitboard_iterator() {
        let bitboard: Bitboard =
            BoardSquare::B1.to_mask() | BoardSquare::E4.to_mask() | BoardSquare::H8.to_mask();

        let positions: Vec<BoardSquare> = bitboard.iter_positions().collect();
        assert_eq!(
            positions,
            vec![BoardSquare::B1, BoardSquare::E4, BoardSquare::H8]
        );

        assert_eq!(0u64.iter_positions().count(), 0);
    }

    #[test]
    fn test_knight_attacks_edge_clipped() {
        // a knight in the corner reaches exactly two squares; no wraparound
        assert_eq!(
            KNIGHT_ATTACKS[BoardSquare::A1 as usize],
            BoardSquare::B3.to_mask() | BoardSquare::C2.to_mask()
        );
        assert_eq!(
            KNIGHT_ATTACKS[BoardSquare::H1 as usize],
            BoardSquare::G3.to_mask() | BoardSquare::F2.to_mask()
        );
        assert_eq!(KNIGHT_ATTACKS[BoardSquare::D4 as usize].count_ones(), 8);
    }

    #[test]
    fn test_king_attacks() {
        assert_eq!(
            KING_ATTACKS[BoardSquare::A1 as usize],
            BoardSquare::A2.to_mask() | BoardSquare::B1.to_mask() | BoardSquare::B2.to_mask()
        );
        assert_eq!(KING_ATTACKS[BoardSquare::E4 as usize].count_ones(), 8);
    }

    #[test]
    fn test_pawn_attacks() {
        assert_eq!(
            PAWN_ATTACKS[Color::White as usize][BoardSquare::E4 as usize],
            BoardSquare::D5.to_mask() | BoardSquare::F5.to_mask()
        );
        assert_eq!(
            PAWN_ATTACKS[Color::Black as usize][BoardSquare::A4 as usize],
            BoardSquare::B3.to_mask()
        );
        assert_eq!(
            PAWN_ATTACKS[Color::White as usize][BoardSquare::H4 as usize],
            BoardSquare::G5.to_mask()
        );
    }

    #[test]
    fn test_blocker_masks_exclude_edges() {
        // rook on a1: a2..a7 and b1..g1
        assert_eq!(ROOK_BLOCKER_MASKS[BoardSquare::A1 as usize].count_ones(), 12);
        assert!(!ROOK_BLOCKER_MASKS[BoardSquare::A1 as usize].is_set(BoardSquare::A8));
        assert!(!ROOK_BLOCKER_MASKS[BoardSquare::A1 as usize].is_set(BoardSquare::H1));
        assert!(ROOK_BLOCKER_MASKS[BoardSquare::A1 as usize].is_set(BoardSquare::A7));

        // central rook: 10 relevant squares, central bishop: 9
        assert_eq!(ROOK_BLOCKER_MASKS[BoardSquare::D4 as usize].count_ones(), 10);
        assert_eq!(BISHOP_BLOCKER_MASKS[BoardSquare::D4 as usize].count_ones(), 9);
    }

    #[test]
    fn test_slow_attacks_include_blocker() {
        let blockers = BoardSquare::D6.to_mask() | BoardSquare::F4.to_mask();
        let attacks = rook_attacks_slow(BoardSquare::D4, blockers);

        assert!(attacks.is_set(BoardSquare::D5));
        assert!(attacks.is_set(BoardSquare::D6));
        assert!(!attacks.is_set(BoardSquare::D7));
        assert!(attacks.is_set(BoardSquare::F4));
        assert!(!attacks.is_set(BoardSquare::G4));
        assert!(attacks.is_set(BoardSquare::A4));
        assert!(attacks.is_set(BoardSquare::D1));

        let attacks = bishop_attacks_slow(BoardSquare::A1, BoardSquare::C3.to_mask());
        assert_eq!(
            attacks,
            BoardSquare::B2.to_mask() | BoardSquare::C3.to_mask()
        );
    }

    #[test]
    fn test_ray_between() {
        assert_eq!(
            ray_between(BoardSquare::A1, BoardSquare::D4),
            BoardSquare::B2.to_mask() | BoardSquare::C3.to_mask()
        );
        assert_eq!(
            ray_between(BoardSquare::E1, BoardSquare::E4),
            BoardSquare::E2.to_mask() | BoardSquare::E3.to_mask()
        );
        assert_eq!(ray_between(BoardSquare::A1, BoardSquare::B1), 0);
        assert_eq!(ray_between(BoardSquare::A1, BoardSquare::B3), 0);
        assert_eq!(ray_between(BoardSquare::E4, BoardSquare::E4), 0);

        assert!(is_aligned(BoardSquare::A1, BoardSquare::H8));
        assert!(is_aligned(BoardSquare::A4, BoardSquare::H4));
        assert!(!is_aligned(BoardSquare::A1, BoardSquare::B3));
    }
}
