//! Short algebraic move text: `<from><to>[promotion]`, e.g. `e2e4`, `a7a8q`.
//!
//! Parsing never inspects the string beyond extracting a candidate
//! from/to/promotion triple; a move "exists" only if it matches something
//! the generator actually produces for the current position.

use crate::board::{Board, Piece};
use crate::moves::magic::MagicTables;
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::types::Move;
use crate::square::Square;
use std::str::FromStr;

fn promotion_piece(c: char) -> Result<Piece, String> {
    match c.to_ascii_lowercase() {
        'q' => Ok(Piece::Queen),
        'r' => Ok(Piece::Rook),
        'b' => Ok(Piece::Bishop),
        'n' => Ok(Piece::Knight),
        other => Err(format!("invalid promotion letter: {other}")),
    }
}

/// Parse `text` against the pseudo-legal moves available in `board`. Returns
/// the generated [`Move`] whose from/to/promotion match, or an error if no
/// such move exists (malformed text or an illegal move).
pub fn parse_move_text(board: &Board, tables: &MagicTables, text: &str) -> Result<Move, String> {
    if text.len() < 4 || text.len() > 5 {
        return Err(format!("malformed move text: {text}"));
    }

    let from = Square::from_str(&text[0..2]).map_err(|e| format!("malformed move text: {e}"))?;
    let to = Square::from_str(&text[2..4]).map_err(|e| format!("malformed move text: {e}"))?;
    let promotion = match text.len() {
        5 => Some(promotion_piece(text.as_bytes()[4] as char)?),
        _ => None,
    };

    let mut candidates: Vec<Move> = Vec::with_capacity(256);
    generate_pseudo_legal(board, tables, &mut candidates);

    candidates
        .into_iter()
        .find(|mv| mv.from == from && mv.to == to && mv.promotion == promotion)
        .ok_or_else(|| format!("illegal move: {text}"))
}
