use crate::game::board::{
    CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE, CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE,
    Game,
};
use crate::game::moves::{BoardMove, BoardMoveExt};
use crate::game::pieces::{Color, Piece};
use crate::utils::bitboard::{
    Bitboard, BitboardExt, BoardSquare, BoardSquareExt, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS,
    is_aligned, is_position_valid, ray_between,
};
use crate::utils::magic::AttackTables;

/// Enough room for any legal position's move list.
pub const MAX_MOVES: usize = 256;

const PROMOTION_PIECES: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

/// Everything the legal move filter needs to know about the side to move's
/// king: who checks it, where a single check can be blocked, which friendly
/// pieces are pinned (and to which rays), and the enemy's attack map.
#[derive(Debug)]
pub struct CheckInfo {
    pub checkers: Bitboard,
    pub block_mask: Bitboard,
    pub pinned: Bitboard,
    pub pin_rays: [Bitboard; 64],
    pub king_danger: Bitboard,
}

fn push_move(moves: &mut [BoardMove; MAX_MOVES], count: &mut usize, board_move: BoardMove) {
    moves[*count] = board_move;
    *count += 1;
}

// pawn moves reaching the last rank fan out into the four promotions
fn push_pawn_move(
    moves: &mut [BoardMove; MAX_MOVES],
    count: &mut usize,
    from: BoardSquare,
    to: BoardSquare,
    flags: u8,
) {
    if to >= BoardSquare::A8 || to <= BoardSquare::H1 {
        for piece in PROMOTION_PIECES {
            push_move(
                moves,
                count,
                BoardMove::create_promotion(from, to, flags, piece),
            );
        }
    } else {
        push_move(moves, count, BoardMove::create(from, to, flags));
    }
}

impl Game {
    /// Is `square` attacked by any piece of `by`, under the given occupancy?
    /// Every lookup runs in reverse from the target square, so the occupancy
    /// can differ from the board's (the king filter passes modified ones).
    pub fn is_square_attacked(
        &self,
        square: BoardSquare,
        by: Color,
        occupancy: Bitboard,
        tables: &AttackTables,
    ) -> bool {
        let attackers = self.color_bitboards[by as usize];

        let pawns = self.piece_bitboards[Piece::Pawn as usize] & attackers;
        if PAWN_ATTACKS[(!by) as usize][square as usize] & pawns != 0 {
            return true;
        }

        let knights = self.piece_bitboards[Piece::Knight as usize] & attackers;
        if KNIGHT_ATTACKS[square as usize] & knights != 0 {
            return true;
        }

        let queens = self.piece_bitboards[Piece::Queen as usize];

        let bishops_like = (self.piece_bitboards[Piece::Bishop as usize] | queens) & attackers;
        if tables.bishop_attacks(square, occupancy) & bishops_like != 0 {
            return true;
        }

        let rooks_like = (self.piece_bitboards[Piece::Rook as usize] | queens) & attackers;
        if tables.rook_attacks(square, occupancy) & rooks_like != 0 {
            return true;
        }

        let king = self.piece_bitboards[Piece::King as usize] & attackers;
        KING_ATTACKS[square as usize] & king != 0
    }

    pub fn analyze_checks(&self, tables: &AttackTables) -> CheckInfo {
        let king_square = self.get_king_square(self.side);
        let king_mask = king_square.to_mask();
        let occupancy = self.get_occupied();
        let current = self.get_current_occupied();
        let enemy = self.get_next_occupied();

        let enemy_queens = self.piece_bitboards[Piece::Queen as usize] & enemy;
        let enemy_bishops_like =
            (self.piece_bitboards[Piece::Bishop as usize] & enemy) | enemy_queens;
        let enemy_rooks_like = (self.piece_bitboards[Piece::Rook as usize] & enemy) | enemy_queens;

        // reverse lookups from the king square find every checker
        let mut checkers = KNIGHT_ATTACKS[king_square as usize]
            & self.piece_bitboards[Piece::Knight as usize]
            & enemy;
        checkers |= PAWN_ATTACKS[self.side as usize][king_square as usize]
            & self.piece_bitboards[Piece::Pawn as usize]
            & enemy;
        checkers |= tables.bishop_attacks(king_square, occupancy) & enemy_bishops_like;
        checkers |= tables.rook_attacks(king_square, occupancy) & enemy_rooks_like;

        // a single sliding check can be blocked anywhere between the king and
        // the checker, or resolved by capturing it; any other single check
        // only by the capture
        let block_mask = if checkers.count_ones() == 1 {
            let checker_square = checkers.next_index();
            let slider = checkers & (enemy_bishops_like | enemy_rooks_like) != 0;

            if slider && is_aligned(king_square, checker_square) {
                ray_between(king_square, checker_square) | checkers
            } else {
                checkers
            }
        } else {
            0
        };

        let mut pinned = 0;
        let mut pin_rays = [0; 64];

        // walk each ray away from the king; a friendly piece followed by a
        // matching enemy slider is pinned to that ray
        let mut mark_pin = |df: i8, dr: i8, orthogonal: bool| {
            let mut f = king_square.get_file() as i8 + df;
            let mut r = king_square.get_rank() as i8 + dr;

            let mut candidate: Option<BoardSquare> = None;

            while is_position_valid(f as isize, r as isize) {
                let square = BoardSquare::from_position(f as u8, r as u8);
                let mask = square.to_mask();

                if occupancy & mask != 0 {
                    match candidate {
                        None if current & mask != 0 => candidate = Some(square),
                        None => return,
                        Some(candidate_square) => {
                            let sliders = if orthogonal {
                                enemy_rooks_like
                            } else {
                                enemy_bishops_like
                            };

                            if sliders & mask != 0 {
                                pinned |= candidate_square.to_mask();
                                pin_rays[candidate_square as usize] =
                                    ray_between(king_square, square) | mask | king_mask;
                            }

                            return;
                        }
                    }
                }

                f += df;
                r += dr;
            }
        };

        mark_pin(1, 0, true);
        mark_pin(-1, 0, true);
        mark_pin(0, 1, true);
        mark_pin(0, -1, true);
        mark_pin(1, 1, false);
        mark_pin(1, -1, false);
        mark_pin(-1, 1, false);
        mark_pin(-1, -1, false);

        // full-occupancy attack map of the enemy; exactly what castle paths
        // must avoid (the king filter recomputes with the king removed instead)
        let mut king_danger = 0;

        for pawn in (self.piece_bitboards[Piece::Pawn as usize] & enemy).iter_positions() {
            king_danger |= PAWN_ATTACKS[(!self.side) as usize][pawn as usize];
        }

        for knight in (self.piece_bitboards[Piece::Knight as usize] & enemy).iter_positions() {
            king_danger |= KNIGHT_ATTACKS[knight as usize];
        }

        for slider in enemy_bishops_like.iter_positions() {
            king_danger |= tables.bishop_attacks(slider, occupancy);
        }

        for slider in enemy_rooks_like.iter_positions() {
            king_danger |= tables.rook_attacks(slider, occupancy);
        }

        let enemy_king = self.piece_bitboards[Piece::King as usize] & enemy;
        if enemy_king != 0 {
            king_danger |= KING_ATTACKS[enemy_king.next_index() as usize];
        }

        CheckInfo {
            checkers,
            block_mask,
            pinned,
            pin_rays,
            king_danger,
        }
    }

    /// Every move obeying piece movement, king safety ignored.
    pub fn get_pseudo_legal_moves(&self, tables: &AttackTables) -> (usize, [BoardMove; MAX_MOVES]) {
        let mut moves = [BoardMove::empty(); MAX_MOVES];
        let mut count = 0;

        self.generate_pawn_moves(&mut moves, &mut count);
        self.generate_knight_moves(&mut moves, &mut count);
        self.generate_slider_moves(tables, &mut moves, &mut count);
        self.generate_king_moves(&mut moves, &mut count);

        (count, moves)
    }

    /// Strictly legal moves for the side to move.
    pub fn get_moves(&self, tables: &AttackTables) -> (usize, [BoardMove; MAX_MOVES]) {
        let (pseudo_count, pseudo_moves) = self.get_pseudo_legal_moves(tables);
        let check_info = self.analyze_checks(tables);

        let king_square = self.get_king_square(self.side);
        let occupancy = self.get_occupied();
        let checks = check_info.checkers.count_ones();

        let mut moves = [BoardMove::empty(); MAX_MOVES];
        let mut count = 0;

        for &board_move in &pseudo_moves[0..pseudo_count] {
            if self.is_move_legal(board_move, &check_info, checks, king_square, occupancy, tables) {
                moves[count] = board_move;
                count += 1;
            }
        }

        (count, moves)
    }

    fn is_move_legal(
        &self,
        board_move: BoardMove,
        check_info: &CheckInfo,
        checks: u32,
        king_square: BoardSquare,
        occupancy: Bitboard,
        tables: &AttackTables,
    ) -> bool {
        let from = board_move.get_from();
        let to = board_move.get_to();
        let to_mask = to.to_mask();

        // the king may not castle out of, through, or into check
        if board_move.is_castle() {
            if checks > 0 {
                return false;
            }

            return (ray_between(from, to) | to_mask) & check_info.king_danger == 0;
        }

        // the king cannot hide behind itself, so drop it from the occupancy
        // before asking whether the destination is attacked
        if from == king_square {
            let mut king_removed = occupancy & !from.to_mask();

            if board_move.is_capture() {
                king_removed &= !to_mask;
            }

            return !self.is_square_attacked(to, !self.side, king_removed, tables);
        }

        // only the king can resolve a double check
        if checks >= 2 {
            return false;
        }

        if board_move.is_en_passant() {
            return self.is_en_passant_legal(board_move, king_square, occupancy, tables);
        }

        // a pinned piece may only move along its pin ray
        if check_info.pinned.is_set(from) && check_info.pin_rays[from as usize] & to_mask == 0 {
            return false;
        }

        // a single check must be blocked or the checker captured
        if checks == 1 && check_info.block_mask & to_mask == 0 {
            return false;
        }

        true
    }

    /// En passant is the one move where two squares empty out at once, so
    /// pins and discovered checks are decided by simulating the occupancy.
    fn is_en_passant_legal(
        &self,
        board_move: BoardMove,
        king_square: BoardSquare,
        occupancy: Bitboard,
        tables: &AttackTables,
    ) -> bool {
        let from_mask = board_move.get_from().to_mask();
        let to_mask = board_move.get_to().to_mask();

        let captured_mask = if self.side == Color::White {
            to_mask >> 8
        } else {
            to_mask << 8
        };

        let simulated = (occupancy & !from_mask & !captured_mask) | to_mask;

        let enemy = self.get_next_occupied();
        let enemy_queens = self.piece_bitboards[Piece::Queen as usize] & enemy;

        // the captured pawn is gone in the simulated position
        let enemy_pawns = self.piece_bitboards[Piece::Pawn as usize] & enemy & !captured_mask;
        if PAWN_ATTACKS[self.side as usize][king_square as usize] & enemy_pawns != 0 {
            return false;
        }

        if KNIGHT_ATTACKS[king_square as usize]
            & self.piece_bitboards[Piece::Knight as usize]
            & enemy
            != 0
        {
            return false;
        }

        if KING_ATTACKS[king_square as usize] & self.piece_bitboards[Piece::King as usize] & enemy
            != 0
        {
            return false;
        }

        let bishops_like = (self.piece_bitboards[Piece::Bishop as usize] & enemy) | enemy_queens;
        if tables.bishop_attacks(king_square, simulated) & bishops_like != 0 {
            return false;
        }

        let rooks_like = (self.piece_bitboards[Piece::Rook as usize] & enemy) | enemy_queens;
        tables.rook_attacks(king_square, simulated) & rooks_like == 0
    }

    fn generate_pawn_moves(&self, moves: &mut [BoardMove; MAX_MOVES], count: &mut usize) {
        let occupancy = self.get_occupied();
        let enemy = self.get_next_occupied();
        let pawns = self.piece_bitboards[Piece::Pawn as usize] & self.get_current_occupied();

        for from in pawns.iter_positions() {
            // a pawn on its final rank cannot occur in a valid position
            if (self.side == Color::White && from >= BoardSquare::A8)
                || (self.side == Color::Black && from <= BoardSquare::H1)
            {
                continue;
            }

            let attacks = PAWN_ATTACKS[self.side as usize][from as usize];

            for to in (attacks & enemy).iter_positions() {
                push_pawn_move(moves, count, from, to, BoardMove::CAPTURE);
            }

            if attacks & self.en_passant_bitmap != 0 {
                push_move(
                    moves,
                    count,
                    BoardMove::create(
                        from,
                        self.en_passant_bitmap.next_index(),
                        BoardMove::CAPTURE | BoardMove::EN_PASSANT,
                    ),
                );
            }

            let (single, start_rank) = if self.side == Color::White {
                (from + 8, 1)
            } else {
                (from - 8, 6)
            };

            // a blocked single push rules the double push out as well
            if !occupancy.is_set(single) {
                push_pawn_move(moves, count, from, single, BoardMove::QUIET);

                if from.get_rank() == start_rank {
                    let double = if self.side == Color::White {
                        from + 16
                    } else {
                        from - 16
                    };

                    if !occupancy.is_set(double) {
                        push_move(
                            moves,
                            count,
                            BoardMove::create(from, double, BoardMove::DOUBLE_PUSH),
                        );
                    }
                }
            }
        }
    }

    fn generate_knight_moves(&self, moves: &mut [BoardMove; MAX_MOVES], count: &mut usize) {
        let current = self.get_current_occupied();
        let enemy = self.get_next_occupied();
        let knights = self.piece_bitboards[Piece::Knight as usize] & current;

        for from in knights.iter_positions() {
            for to in (KNIGHT_ATTACKS[from as usize] & !current).iter_positions() {
                let flags = if enemy.is_set(to) {
                    BoardMove::CAPTURE
                } else {
                    BoardMove::QUIET
                };

                push_move(moves, count, BoardMove::create(from, to, flags));
            }
        }
    }

    fn generate_slider_moves(
        &self,
        tables: &AttackTables,
        moves: &mut [BoardMove; MAX_MOVES],
        count: &mut usize,
    ) {
        let occupancy = self.get_occupied();
        let current = self.get_current_occupied();
        let enemy = self.get_next_occupied();

        for piece in [Piece::Bishop, Piece::Rook, Piece::Queen] {
            let origins = self.piece_bitboards[piece as usize] & current;

            for from in origins.iter_positions() {
                let visible = occupancy & !from.to_mask();

                let attacks = match piece {
                    Piece::Bishop => tables.bishop_attacks(from, visible),
                    Piece::Rook => tables.rook_attacks(from, visible),
                    _ => tables.queen_attacks(from, visible),
                };

                for to in (attacks & !current).iter_positions() {
                    let flags = if enemy.is_set(to) {
                        BoardMove::CAPTURE
                    } else {
                        BoardMove::QUIET
                    };

                    push_move(moves, count, BoardMove::create(from, to, flags));
                }
            }
        }
    }

    fn generate_king_moves(&self, moves: &mut [BoardMove; MAX_MOVES], count: &mut usize) {
        let occupancy = self.get_occupied();
        let current = self.get_current_occupied();
        let enemy = self.get_next_occupied();
        let from = self.get_king_square(self.side);

        for to in (KING_ATTACKS[from as usize] & !current).iter_positions() {
            let flags = if enemy.is_set(to) {
                BoardMove::CAPTURE
            } else {
                BoardMove::QUIET
            };

            push_move(moves, count, BoardMove::create(from, to, flags));
        }

        // castles only need empty squares here; safety is the filter's concern
        if self.side == Color::White {
            if self.castling_flags & CASTLE_WHITE_KINGSIDE != 0
                && occupancy & (BoardSquare::F1.to_mask() | BoardSquare::G1.to_mask()) == 0
            {
                push_move(
                    moves,
                    count,
                    BoardMove::create(from, BoardSquare::G1, BoardMove::CASTLE),
                );
            }

            if self.castling_flags & CASTLE_WHITE_QUEENSIDE != 0
                && occupancy
                    & (BoardSquare::B1.to_mask()
                        | BoardSquare::C1.to_mask()
                        | BoardSquare::D1.to_mask())
                    == 0
            {
                push_move(
                    moves,
                    count,
                    BoardMove::create(from, BoardSquare::C1, BoardMove::CASTLE),
                );
            }
        } else {
            if self.castling_flags & CASTLE_BLACK_KINGSIDE != 0
                && occupancy & (BoardSquare::F8.to_mask() | BoardSquare::G8.to_mask()) == 0
            {
                push_move(
                    moves,
                    count,
                    BoardMove::create(from, BoardSquare::G8, BoardMove::CASTLE),
                );
            }

            if self.castling_flags & CASTLE_BLACK_QUEENSIDE != 0
                && occupancy
                    & (BoardSquare::B8.to_mask()
                        | BoardSquare::C8.to_mask()
                        | BoardSquare::D8.to_mask())
                    == 0
            {
                push_move(
                    moves,
                    count,
                    BoardMove::create(from, BoardSquare::C8, BoardMove::CASTLE),
                );
            }
        }
    }
}
