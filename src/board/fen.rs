// src/board/fen.rs
// FEN (Forsyth-Edwards Notation) parsing and serialization.

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{
    Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, EMPTY_SQ, Piece,
};
use crate::square::Square;

impl Board {
    /// Parse a FEN string into `self`, replacing all prior state.
    ///
    /// Accepts the standard six-field record: piece placement, side to move,
    /// castling rights, en passant target, halfmove clock, fullmove number.
    /// The last two fields default to `0` and `1` respectively if omitted.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format!("FEN must have at least 4 fields, got {}", fields.len()));
        }

        let placement = fields[0];
        let side = fields[1];
        let castling = fields[2];
        let ep = fields[3];
        let halfmove = fields.get(4).unwrap_or(&"0");
        let fullmove = fields.get(5).unwrap_or(&"1");

        let mut piece_bb = [[0u64; 6]; 2];
        let mut piece_on_sq = [EMPTY_SQ; 64];

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(format!("FEN placement must have 8 ranks, got {}", ranks.len()));
        }

        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top;
            let mut file = 0usize;
            for ch in rank_str.chars() {
                if file >= 8 {
                    return Err(format!("FEN rank '{rank_str}' overflows 8 files"));
                }
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                if !ch.is_ascii() {
                    return Err(format!("invalid FEN piece glyph: {ch}"));
                }
                let (piece, color) = CHAR_TO_PC[ch as usize]
                    .ok_or_else(|| format!("invalid FEN piece glyph: {ch}"))?;
                let sq_idx = rank * 8 + file;
                piece_bb[color as usize][piece as usize] |= 1u64 << sq_idx;
                piece_on_sq[sq_idx] = (color as u8) << 3 | (piece as u8);
                file += 1;
            }
            if file != 8 {
                return Err(format!("FEN rank '{rank_str}' does not cover 8 files"));
            }
        }

        let side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(format!("invalid side-to-move field: {side}")),
        };

        let mut castling_rights = 0u8;
        if castling != "-" {
            for ch in castling.chars() {
                match ch {
                    'K' => castling_rights |= CASTLE_WK,
                    'Q' => castling_rights |= CASTLE_WQ,
                    'k' => castling_rights |= CASTLE_BK,
                    'q' => castling_rights |= CASTLE_BQ,
                    _ => return Err(format!("invalid castling glyph: {ch}")),
                }
            }
        }

        let en_passant = if ep == "-" {
            None
        } else {
            Some(ep.parse::<Square>()?)
        };

        let halfmove_clock: u32 = halfmove
            .parse()
            .map_err(|_| format!("invalid halfmove clock: {halfmove}"))?;
        let fullmove_number: u32 = fullmove
            .parse()
            .map_err(|_| format!("invalid fullmove number: {fullmove}"))?;

        let mut occ_white = 0u64;
        let mut occ_black = 0u64;
        for p in 0..6 {
            occ_white |= piece_bb[0][p];
            occ_black |= piece_bb[1][p];
        }

        self.piece_bb = piece_bb;
        self.occ_white = occ_white;
        self.occ_black = occ_black;
        self.occ_all = occ_white | occ_black;
        self.piece_on_sq = piece_on_sq;
        self.side_to_move = side_to_move;
        self.castling_rights = castling_rights;
        self.en_passant = en_passant;
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
        self.history.clear();
        self.refresh_zobrist();

        Ok(())
    }

    /// Serialize the current position to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = String::with_capacity(64);
        for rank_from_top in 0..8 {
            let rank = 7 - rank_from_top;
            let mut empty_run = 0;
            for file in 0..8 {
                let sq = rank * 8 + file;
                let val = self.piece_on_sq[sq];
                if val == EMPTY_SQ {
                    empty_run += 1;
                    continue;
                }
                if empty_run > 0 {
                    placement.push_str(&empty_run.to_string());
                    empty_run = 0;
                }
                let color = (val >> 3) & 1;
                let piece = val & 0b111;
                placement.push(PC_TO_CHAR[(color as usize) * 6 + (piece as usize)]);
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank_from_top != 7 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.castling_rights & CASTLE_WK != 0 {
            castling.push('K');
        }
        if self.castling_rights & CASTLE_WQ != 0 {
            castling.push('Q');
        }
        if self.castling_rights & CASTLE_BK != 0 {
            castling.push('k');
        }
        if self.castling_rights & CASTLE_BQ != 0 {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = match self.en_passant {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, ep, self.halfmove_clock, self.fullmove_number
        )
    }
}
