//! Binary dataset export: `(Zobrist key, outcome label, feature vector)`
//! tuples written from a played game, for training an external learned
//! evaluator (see [`crate::search::backend`] for the feature format).
//!
//! Layout:
//! - Header (32 bytes): 8-byte magic, 4-byte LE version, 4-byte LE feature
//!   dimension (781), 8-byte LE record count (patched in on [`DatasetWriter::finish`]),
//!   4-byte flag word (bit 0 set: labels are win/draw/loss = 1/0/-1), 4-byte
//!   reserved.
//! - Record: 8-byte LE Zobrist key, 4-byte LE float label (side-to-move
//!   POV), then `feature_dim` little-endian f32 features.

use crate::board::{Board, Color};
use crate::moves::execute::make_move_basic;
use crate::search::backend::{FEATURE_DIM, encode_features};
use crate::selfplay::{Outcome, SelfPlayGame};
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const MAGIC: &[u8; 8] = b"VTGDSET\0";
pub const VERSION: u32 = 1;
const HEADER_LEN: u64 = 32;
const RECORD_COUNT_OFFSET: u64 = 16;
const WIN_DRAW_LOSS_FLAG: u32 = 1;

/// An I/O failure writing a dataset file, tagged with the path and the
/// underlying error.
#[derive(Debug)]
pub struct DatasetError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dataset I/O error at {}: {}",
            self.path.display(),
            self.source
        )
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Streaming writer for the dataset binary format. Patches the record count
/// into the header on [`finish`](DatasetWriter::finish); a writer dropped
/// without calling `finish` leaves a header with a zero record count rather
/// than promoting a partial file.
pub struct DatasetWriter<W: Write + Seek> {
    writer: W,
    record_count: u64,
}

impl DatasetWriter<BufWriter<File>> {
    /// Create (or truncate) a dataset file at `path` and write its header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| DatasetError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::new(BufWriter::new(file)).map_err(|e| DatasetError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl<W: Write + Seek> DatasetWriter<W> {
    /// Wrap an arbitrary `Write + Seek` sink (a file, or an in-memory
    /// `Cursor` in tests) and write the dataset header with a zero record
    /// count placeholder.
    pub fn new(mut writer: W) -> io::Result<Self> {
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&(FEATURE_DIM as u32).to_le_bytes())?;
        writer.write_all(&0u64.to_le_bytes())?; // record count, patched on finish
        writer.write_all(&WIN_DRAW_LOSS_FLAG.to_le_bytes())?;
        writer.write_all(&0u32.to_le_bytes())?; // reserved
        Ok(Self {
            writer,
            record_count: 0,
        })
    }

    /// Append one `(key, label, features)` record.
    pub fn write_record(&mut self, key: u64, label: f32, features: &[f32; FEATURE_DIM]) -> io::Result<()> {
        self.writer.write_all(&key.to_le_bytes())?;
        self.writer.write_all(&label.to_le_bytes())?;
        for f in features {
            self.writer.write_all(&f.to_le_bytes())?;
        }
        self.record_count += 1;
        Ok(())
    }

    /// Replay `game` from `start` (the same position it was played from)
    /// and write one record per position visited, including the starting
    /// position and excluding none: every ply's resulting position is
    /// recorded, labeled from the game's final outcome.
    pub fn write_game(&mut self, start: Board, game: &SelfPlayGame) -> io::Result<()> {
        let mut board = start;
        for (i, pos) in game.positions.iter().enumerate() {
            debug_assert_eq!(pos.key, board.zobrist);
            let label = label_for(pos.side_to_move, game.outcome);
            let features = encode_features(&board);
            self.write_record(pos.key, label, &features)?;
            if let Some(mv) = game.moves.get(i) {
                make_move_basic(&mut board, *mv);
            }
        }
        Ok(())
    }

    /// Patch the header's record count and flush. Consumes the writer so a
    /// dataset file can only be finalized once.
    pub fn finish(mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.seek(SeekFrom::Start(RECORD_COUNT_OFFSET))?;
        self.writer.write_all(&self.record_count.to_le_bytes())?;
        self.writer.flush()
    }
}

fn label_for(side_to_move: Color, outcome: Outcome) -> f32 {
    let winner = match outcome {
        Outcome::Draw => return 0.0,
        Outcome::WhiteWins => Color::White,
        Outcome::BlackWins => Color::Black,
    };
    if side_to_move == winner { 1.0 } else { -1.0 }
}
