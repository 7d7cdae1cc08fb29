//! Pluggable evaluation backends.
//!
//! The search only ever calls [`Evaluator::evaluate`] through the currently
//! registered backend; everything else (feature encoding, clipping, POV
//! conversion) is the backend's own responsibility. The default backend is
//! [`MaterialEvaluator`], a plain material count per the standard values.
//! Richer evaluation (tapered PSQT, king safety, pawn structure) lives in
//! [`crate::search::eval::static_eval`] and is what the search actually
//! drives by default; `Evaluator` exists so an external learned evaluator
//! can be swapped in without touching the search.

use crate::board::{Board, Color, Piece};
use std::sync::{Arc, OnceLock, RwLock};

/// Dense feature vector length: 12 piece planes * 64 squares, plus
/// side-to-move, 4 castling bits, and 8 en-passant file bits.
pub const FEATURE_DIM: usize = 12 * 64 + 1 + 4 + 8;

const CLIP: i32 = 3000;

/// A pluggable position evaluator. Implementations return centipawns from
/// the side-to-move's point of view; the registry wraps every backend's
/// output in the saturating `[-3000, 3000]` clip described by the backend
/// contract.
pub trait Evaluator: Send + Sync {
    /// Side-to-move-POV centipawn evaluation of `board`.
    fn evaluate(&self, board: &Board) -> i32;
}

/// Standard material values (centipawns): P=100 N=320 B=330 R=500 Q=900 K=0.
pub const STANDARD_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 0];

fn piece_value(piece: Piece) -> i32 {
    STANDARD_VALUES[piece as usize]
}

/// Material-only default evaluator: a white-positive material sum,
/// negated to the side to move.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        let mut score = 0;
        for piece in [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            let w = board.pieces(piece, Color::White).count_ones() as i32;
            let b = board.pieces(piece, Color::Black).count_ones() as i32;
            score += piece_value(piece) * (w - b);
        }
        if board.side_to_move == Color::Black {
            -score
        } else {
            score
        }
    }
}

/// Encode `board` into the 781-dim dense feature vector a learned backend
/// consumes: 12 piece planes (P,N,B,R,Q,K white then black; `plane*64 +
/// square`), a side-to-move flag, 4 castling bits `{K,Q,k,q}`, and 8
/// one-hot en-passant file bits.
pub fn encode_features(board: &Board) -> [f32; FEATURE_DIM] {
    let mut features = [0f32; FEATURE_DIM];

    let pieces = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    for (color_idx, color) in [Color::White, Color::Black].into_iter().enumerate() {
        for (piece_idx, piece) in pieces.into_iter().enumerate() {
            let plane = color_idx * 6 + piece_idx;
            let mut bb = board.pieces(piece, color);
            while bb != 0 {
                let sq = bb.trailing_zeros() as usize;
                features[plane * 64 + sq] = 1.0;
                bb &= bb - 1;
            }
        }
    }

    let mut idx = 12 * 64;
    features[idx] = if board.side_to_move == Color::White {
        1.0
    } else {
        0.0
    };
    idx += 1;

    for flag in [
        crate::board::CASTLE_WK,
        crate::board::CASTLE_WQ,
        crate::board::CASTLE_BK,
        crate::board::CASTLE_BQ,
    ] {
        features[idx] = if board.castling_rights & flag != 0 {
            1.0
        } else {
            0.0
        };
        idx += 1;
    }

    if let Some(sq) = board.en_passant {
        features[idx + sq.file() as usize] = 1.0;
    }

    features
}

/// Clip a raw backend score to `[-3000, 3000]` and flip it to white-positive
/// from the side-to-move POV the backend returned.
pub fn clip_and_orient(raw: i32, side_to_move: Color) -> i32 {
    let clipped = raw.clamp(-CLIP, CLIP);
    if side_to_move == Color::Black {
        -clipped
    } else {
        clipped
    }
}

static ACTIVE: OnceLock<RwLock<Arc<dyn Evaluator>>> = OnceLock::new();

fn registry() -> &'static RwLock<Arc<dyn Evaluator>> {
    ACTIVE.get_or_init(|| RwLock::new(Arc::new(MaterialEvaluator)))
}

/// Swap in a new backend. Takes effect for every subsequent `evaluate_with_backend` call.
pub fn register_evaluator(evaluator: Arc<dyn Evaluator>) {
    *registry().write().unwrap() = evaluator;
}

/// Reset to the default material evaluator.
pub fn reset_evaluator() {
    register_evaluator(Arc::new(MaterialEvaluator));
}

/// Evaluate `board` through whichever backend is currently registered.
pub fn evaluate_with_backend(board: &Board) -> i32 {
    registry().read().unwrap().evaluate(board)
}
