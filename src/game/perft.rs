use fxhash::FxHashMap;

use crate::game::board::{Game, Snapshot};
use crate::game::moves::BoardMove;
use crate::utils::magic::AttackTables;

/// Memo table for perft runs, keyed by the position and the remaining depth.
/// The key is exact, so transpositions can never report a wrong count.
pub type PerftTable = FxHashMap<(Snapshot, usize), usize>;

impl Game {
    /// Number of leaf nodes in the legal move tree, `depth` plies deep.
    pub fn perft_count(&mut self, depth: usize, tables: &AttackTables) -> usize {
        let mut table = PerftTable::default();
        self.dfs_count_moves(depth, tables, &mut table)
    }

    /// Like [`Self::perft_count`], but broken down by root move.
    pub fn perft(&mut self, depth: usize, tables: &AttackTables) -> Vec<(BoardMove, usize)> {
        if depth == 0 {
            return Vec::new();
        }

        let mut table = PerftTable::default();
        let (count, moves) = self.get_moves(tables);

        let mut results = Vec::with_capacity(count);

        for &board_move in &moves[0..count] {
            self.make_move(board_move);
            results.push((board_move, self.dfs_count_moves(depth - 1, tables, &mut table)));
            self.unmake_move();
        }

        results
    }

    fn dfs_count_moves(
        &mut self,
        depth: usize,
        tables: &AttackTables,
        table: &mut PerftTable,
    ) -> usize {
        if depth == 0 {
            return 1;
        }

        // the last ply only needs the move count, not the moves made
        if depth == 1 {
            let (count, _) = self.get_moves(tables);
            return count;
        }

        let key = (self.snapshot(), depth);

        if let Some(&result) = table.get(&key) {
            return result;
        }

        let (count, moves) = self.get_moves(tables);
        let mut result = 0;

        for &board_move in &moves[0..count] {
            self.make_move(board_move);
            result += self.dfs_count_moves(depth - 1, tables, table);
            self.unmake_move();
        }

        table.insert(key, result);
        result
    }
}
