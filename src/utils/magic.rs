use crate::utils::bitboard::{
    BISHOP_BLOCKER_MASKS, Bitboard, BitboardExt, BoardSquare, BoardSquareExt, ROOK_BLOCKER_MASKS,
    bishop_attacks_slow, rook_attacks_slow,
};
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Default seed for the magic number search; any seed works, a fixed one
/// makes every build produce identical tables.
pub const MAGIC_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

const MAX_MAGIC_ATTEMPTS: usize = 100_000_000;

#[derive(Copy, Clone, Debug, Default)]
pub struct MagicEntry {
    pub mask: Bitboard,
    pub magic: u64,
    pub offset: usize,
    pub shift: u8,
}

/// Perfect-hash attack tables for the sliding pieces. Built once, immutable
/// afterwards; pass it around by reference.
pub struct AttackTables {
    rook_magics: [MagicEntry; 64],
    bishop_magics: [MagicEntry; 64],
    entries: Vec<Bitboard>,
}

impl AttackTables {
    pub fn new() -> AttackTables {
        Self::with_seed(MAGIC_SEED)
    }

    pub fn with_seed(seed: u64) -> AttackTables {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        let mut rook_magics = [MagicEntry::default(); 64];
        let mut bishop_magics = [MagicEntry::default(); 64];
        let mut entries = Vec::with_capacity(1 << 17);

        log::info!("Finding magic bitboards...");

        for square in 0..64u8 {
            let entry = find_magic(
                square,
                ROOK_BLOCKER_MASKS[square as usize],
                rook_attacks_slow,
                &mut rng,
                &mut entries,
            );

            log::debug!(
                "Rook ({}/{}): {:#018x}, bits={}, entries={}",
                square + 1,
                64,
                entry.magic,
                64 - entry.shift,
                entries.len() - entry.offset
            );

            rook_magics[square as usize] = entry;
        }

        for square in 0..64u8 {
            let entry = find_magic(
                square,
                BISHOP_BLOCKER_MASKS[square as usize],
                bishop_attacks_slow,
                &mut rng,
                &mut entries,
            );

            log::debug!(
                "Bishop ({}/{}): {:#018x}, bits={}, entries={}",
                square + 1,
                64,
                entry.magic,
                64 - entry.shift,
                entries.len() - entry.offset
            );

            bishop_magics[square as usize] = entry;
        }

        log::info!("Magic bitboards found, {} table entries.", entries.len());

        AttackTables {
            rook_magics,
            bishop_magics,
            entries,
        }
    }

    pub fn rook_attacks(&self, square: BoardSquare, occupancy: Bitboard) -> Bitboard {
        self.lookup(&self.rook_magics[square as usize], occupancy)
    }

    pub fn bishop_attacks(&self, square: BoardSquare, occupancy: Bitboard) -> Bitboard {
        self.lookup(&self.bishop_magics[square as usize], occupancy)
    }

    pub fn queen_attacks(&self, square: BoardSquare, occupancy: Bitboard) -> Bitboard {
        self.rook_attacks(square, occupancy) | self.bishop_attacks(square, occupancy)
    }

    fn lookup(&self, entry: &MagicEntry, occupancy: Bitboard) -> Bitboard {
        let hash = ((occupancy & entry.mask).wrapping_mul(entry.magic) >> entry.shift) as usize;

        self.entries[entry.offset + hash]
    }
}

fn find_magic(
    square: BoardSquare,
    mask: Bitboard,
    slow_attacks: fn(BoardSquare, Bitboard) -> Bitboard,
    rng: &mut Xoshiro256PlusPlus,
    entries: &mut Vec<Bitboard>,
) -> MagicEntry {
    let bits = mask.count_ones();
    let subset_count = 1usize << bits;

    // every blocker subset of the mask, paired with its true attack set
    let positions: Vec<BoardSquare> = mask.iter_positions().collect();
    let mut keys = Vec::with_capacity(subset_count);

    for index in 0..subset_count {
        let mut blockers: Bitboard = 0;

        for (i, position) in positions.iter().enumerate() {
            if index & (1 << i) != 0 {
                blockers |= position.to_mask();
            }
        }

        keys.push((blockers, slow_attacks(square, blockers)));
    }

    let mut attempts = 0;

    loop {
        attempts += 1;

        if attempts > MAX_MAGIC_ATTEMPTS {
            panic!(
                "No magic number found for square {} after {} attempts",
                square.unparse(),
                MAX_MAGIC_ATTEMPTS
            );
        }

        // sparse numbers work best, since the hash only needs a few high bits
        // https://www.chessprogramming.org/Looking_for_Magics
        let magic: u64 = rng.next_u64() & rng.next_u64() & rng.next_u64();

        // cheap rejection before trying every subset
        if (mask.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }

        let mut hash_table = vec![None; subset_count];
        let mut collision = false;
        let mut highest_index = 0;

        for &(blockers, attacks) in &keys {
            let hash = (blockers.wrapping_mul(magic) >> (64 - bits)) as usize;

            if hash > highest_index {
                highest_index = hash;
            }

            match hash_table[hash] {
                // two subsets may share a slot only when their attacks agree
                Some(existing) if existing != attacks => {
                    collision = true;
                    break;
                }
                _ => hash_table[hash] = Some(attacks),
            }
        }

        if !collision {
            let offset = entries.len();
            entries.extend((0..=highest_index).map(|i| hash_table[i].unwrap_or(0)));

            return MagicEntry {
                mask,
                magic,
                offset,
                shift: (64 - bits) as u8,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn tables() -> &'static AttackTables {
        static TABLES: OnceLock<AttackTables> = OnceLock::new();
        TABLES.get_or_init(AttackTables::new)
    }

    // enumerates all submasks, independently of the builder's method
    fn subsets(mask: Bitboard) -> Vec<Bitboard> {
        let mut subsets = Vec::new();
        let mut subset: Bitboard = 0;

        loop {
            subsets.push(subset);
            subset = subset.wrapping_sub(mask) & mask;

            if subset == 0 {
                break;
            }
        }

        subsets
    }

    #[test]
    fn test_rook_tables_match_slow_attacks() {
        for square in 0..64u8 {
            for blockers in subsets(ROOK_BLOCKER_MASKS[square as usize]) {
                assert_eq!(
                    tables().rook_attacks(square, blockers),
                    rook_attacks_slow(square, blockers),
                    "rook on {} with blockers {:#018x}",
                    square.unparse(),
                    blockers
                );
            }
        }
    }

    #[test]
    fn test_bishop_tables_match_slow_attacks() {
        for square in 0..64u8 {
            for blockers in subsets(BISHOP_BLOCKER_MASKS[square as usize]) {
                assert_eq!(
                    tables().bishop_attacks(square, blockers),
                    bishop_attacks_slow(square, blockers),
                    "bishop on {} with blockers {:#018x}",
                    square.unparse(),
                    blockers
                );
            }
        }
    }

    #[test]
    fn test_lookup_ignores_irrelevant_squares() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);

        for _ in 0..500 {
            let occupancy = rng.next_u64() & rng.next_u64();

            for square in 0..64u8 {
                assert_eq!(
                    tables().rook_attacks(square, occupancy),
                    rook_attacks_slow(square, occupancy)
                );
                assert_eq!(
                    tables().bishop_attacks(square, occupancy),
                    bishop_attacks_slow(square, occupancy)
                );
            }
        }
    }

    #[test]
    fn test_open_board_attacks() {
        assert_eq!(tables().rook_attacks(BoardSquare::A1, 0), 0x0101_0101_0101_01fe);
        assert_eq!(
            tables().queen_attacks(BoardSquare::D4, 0),
            rook_attacks_slow(BoardSquare::D4, 0) | bishop_attacks_slow(BoardSquare::D4, 0)
        );
    }

    #[test]
    fn test_same_seed_same_tables() {
        let a = AttackTables::with_seed(MAGIC_SEED);
        let b = AttackTables::with_seed(MAGIC_SEED);

        for square in 0..64 {
            assert_eq!(a.rook_magics[square].magic, b.rook_magics[square].magic);
            assert_eq!(a.rook_magics[square].offset, b.rook_magics[square].offset);
            assert_eq!(a.bishop_magics[square].magic, b.bishop_magics[square].magic);
        }

        assert_eq!(a.entries, b.entries);
    }
}
