//! Self-play: repeatedly invoke [`crate::search::search`] from a starting
//! position, drive the game to a terminal or ply-limited outcome, and
//! record per-position Zobrist keys for dataset labeling.

use crate::board::{Board, Color};
use crate::moves::execute::{generate_legal, is_legal_move, make_move_basic};
use crate::moves::magic::MagicTables;
use crate::moves::types::Move;
use crate::search::eval_cache::EvalCache;
use crate::search::search::{Limits, search_with_state};
use crate::search::tt::TranspositionTable;
use crate::status::{GameStatus, position_status};

/// Final classification of a self-play game, from White's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    WhiteWins,
    BlackWins,
    Draw,
}

/// A position visited during self-play: its Zobrist key and the side to
/// move there. Paired with [`Outcome`] this is everything a dataset record
/// needs to derive its label (see [`crate::dataset`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedPosition {
    pub key: u64,
    pub side_to_move: Color,
}

/// The full record of a played game: the move sequence, every position
/// visited (including the starting one), the outcome, and the ply count.
#[derive(Debug, Clone)]
pub struct SelfPlayGame {
    pub moves: Vec<Move>,
    pub positions: Vec<RecordedPosition>,
    pub outcome: Outcome,
    pub plies: u32,
}

/// Play one game from `start`, calling `search` at every ply with `limits`,
/// until a terminal position, a rule draw, or `max_plies` is reached
/// (classified `Draw` per dataset semantics). A missing or illegal search
/// result falls back to the first legal move; if no legal move can be
/// selected at all the game is aborted as a draw (unreachable in practice,
/// since the terminal check above already guarantees one exists).
pub fn selfplay(
    mut board: Board,
    max_plies: u32,
    limits: &Limits,
    tables: &MagicTables,
) -> SelfPlayGame {
    let mut moves = Vec::new();
    let mut positions = vec![RecordedPosition {
        key: board.zobrist,
        side_to_move: board.side_to_move,
    }];

    let mut tt = TranspositionTable::new(64);
    let mut eval_cache = EvalCache::new();

    let mut plies = 0u32;

    let outcome = loop {
        if plies >= max_plies {
            break Outcome::Draw;
        }

        match position_status(&mut board, tables) {
            GameStatus::Checkmate => {
                break if board.side_to_move == Color::White {
                    Outcome::BlackWins
                } else {
                    Outcome::WhiteWins
                };
            }
            GameStatus::Stalemate
            | GameStatus::DrawFiftyMove
            | GameStatus::DrawThreefold
            | GameStatus::DrawFivefold
            | GameStatus::DrawSeventyFiveMove
            | GameStatus::DrawDeadPosition => break Outcome::Draw,
            GameStatus::InPlay => {}
        }

        let result = search_with_state(&mut board, tables, limits, &mut tt, &mut eval_cache);

        let chosen = match result.best_move {
            Some(mv) if is_legal_move(&mut board, mv, tables) => Some(mv),
            _ => first_legal_move(&mut board, tables),
        };

        let Some(mv) = chosen else {
            break Outcome::Draw;
        };

        make_move_basic(&mut board, mv);
        moves.push(mv);
        positions.push(RecordedPosition {
            key: board.zobrist,
            side_to_move: board.side_to_move,
        });
        plies += 1;
    };

    SelfPlayGame {
        moves,
        positions,
        outcome,
        plies,
    }
}

fn first_legal_move(board: &mut Board, tables: &MagicTables) -> Option<Move> {
    let mut legal = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(256);
    generate_legal(board, tables, &mut legal, &mut scratch);
    legal.first().copied()
}
