use crate::board::Board;
use crate::moves::execute::{make_move_basic, make_null_move, undo_move_basic, undo_null_move};
use crate::moves::magic::MagicTables;
use crate::moves::square_control::in_check;
use crate::moves::types::Move;
use crate::search::context::SearchContext;
use crate::search::eval::static_eval;
use crate::search::eval_cache::EvalCache;
use crate::search::picker::MovePicker;
use crate::search::see::SeeExt;
use crate::search::tt::{
    INF, MATE_BASE, MATE_THRESHOLD, NodeType, TranspositionTable, score_from_tt, score_to_tt,
};
use crate::status::is_insufficient_material;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const MAX_Q_SEARCH_DEPTH: usize = 100;
const DRAW_SCORE: i32 = 0;
const NODE_POLL_INTERVAL: u64 = 16 * 1024;

// --- Tuning Constants ---

// Reverse Futility Pruning (RFP)
const RFP_DEPTH_LIMIT: i32 = 9;
const RFP_MARGIN_BASE: i32 = 80;
const RFP_MARGIN_MULT: i32 = 90;

// Futility Pruning (FP)
const FP_DEPTH_LIMIT: i32 = 7;
const FP_MARGIN_BASE: i32 = 100;
const FP_MARGIN_MULT: i32 = 100;
const FP_HISTORY_THRESHOLD: i32 = 512;

// Late Move Pruning (LMP)
const LMP_DEPTH_LIMIT: i32 = 14;
const LMP_BASE_MOVES: i32 = 3;
const LMP_MOVE_MULTIPLIER: i32 = 6;

// Late Move Reduction (LMR)
const LMR_MIN_DEPTH: i32 = 3;
const LMR_MIN_MOVES: i32 = 4;

/// Per-side time control plus the increment/movestogo inputs needed to
/// derive a time slice, mirroring a UCI `go` command's `wtime/btime/...`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeControl {
    pub time_left: Duration,
    pub increment: Duration,
    pub movestogo: Option<u32>,
}

/// Everything that can stop a search: any one of these firing ends iterative
/// deepening and returns the best fully-completed iteration.
#[derive(Clone, Default)]
pub struct Limits {
    pub max_depth: Option<u32>,
    pub node_budget: Option<u64>,
    pub movetime: Option<Duration>,
    pub time_control: Option<TimeControl>,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Limits {
    pub fn depth(max_depth: u32) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Default::default()
        }
    }

    pub fn movetime(d: Duration) -> Self {
        Self {
            movetime: Some(d),
            ..Default::default()
        }
    }

    /// `slice = time / max(movestogo, 30) + 0.75 * increment`, clamped to
    /// `[20ms, time - 30ms]`.
    fn derive_time_slice(&self) -> Option<Duration> {
        if let Some(mt) = self.movetime {
            return Some(mt);
        }
        let tc = self.time_control?;
        let movestogo = tc.movestogo.unwrap_or(30).max(30);
        let base = tc.time_left / movestogo;
        let inc_bonus = Duration::from_secs_f64(tc.increment.as_secs_f64() * 0.75);
        let slice = base + inc_bonus;

        let min = Duration::from_millis(20);
        let max = tc.time_left.saturating_sub(Duration::from_millis(30));
        Some(slice.clamp(min, max.max(min)))
    }
}

/// The outcome of one call to [`search`]: the best move found from the last
/// fully-completed iterative-deepening iteration, its score from the
/// side-to-move's point of view, node count, depth reached, and the
/// principal variation leading to it.
#[derive(Clone, Debug, Default)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score_cp: i32,
    pub nodes: u64,
    pub depth: u32,
    pub pv: Vec<Move>,
}

struct TimeManager {
    start_time: Instant,
    allotted: Option<Duration>,
    node_budget: Option<u64>,
    cancel: Option<Arc<AtomicBool>>,
    stop_signal: bool,
}

impl TimeManager {
    fn new(limit: Option<Duration>, node_budget: Option<u64>, cancel: Option<Arc<AtomicBool>>) -> Self {
        Self {
            start_time: Instant::now(),
            allotted: limit,
            node_budget,
            cancel,
            stop_signal: false,
        }
    }

    #[inline(always)]
    fn check_time(&mut self, nodes: u64) {
        if self.stop_signal {
            return;
        }
        if let Some(flag) = &self.cancel
            && flag.load(Ordering::Relaxed)
        {
            self.stop_signal = true;
            return;
        }
        if let Some(limit) = self.allotted
            && self.start_time.elapsed() >= limit
        {
            self.stop_signal = true;
            return;
        }
        self.check_node_budget(nodes);
    }

    /// Gates the node budget alone, independent of the wall-clock/cancel poll
    /// interval: a budget that isn't a multiple of `NODE_POLL_INTERVAL` must
    /// still never be exceeded, so this is checked every node.
    #[inline(always)]
    fn check_node_budget(&mut self, nodes: u64) {
        if !self.stop_signal
            && let Some(budget) = self.node_budget
            && nodes >= budget
        {
            self.stop_signal = true;
        }
    }

    fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

fn is_rule_draw(board: &Board) -> bool {
    board.halfmove_clock >= 100 || board.is_repetition() || is_insufficient_material(board)
}

#[allow(clippy::too_many_arguments)]
fn quiescence(
    board: &mut Board,
    tables: &MagicTables,
    tt: &TranspositionTable,
    eval_cache: &mut EvalCache,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    nodes: &mut u64,
    time: &mut TimeManager,
) -> i32 {
    let _ = tt;
    if ply > MAX_Q_SEARCH_DEPTH {
        return static_eval(board, tables, alpha, beta);
    }

    let in_check_now = in_check(board, board.side_to_move, tables);

    if in_check_now {
        // No stand-pat while in check: every legal evasion must be searched.
        let mut picker = MovePicker::new(None, [None, None], false);
        let empty_history = [[0i32; 64]; 64];
        let mut move_count = 0;
        let mut best = -INF;

        while let Some(mv) = picker.next(board, tables, &empty_history) {
            *nodes += 1;
            if *nodes % NODE_POLL_INTERVAL == 0 {
                time.check_time(*nodes);
            } else {
                time.check_node_budget(*nodes);
            }
            if time.stop_signal {
                return best.max(alpha);
            }

            move_count += 1;
            let undo = make_move_basic(board, mv);
            let score = -quiescence(
                board, tables, tt, eval_cache, ply + 1, -beta, -alpha, nodes, time,
            );
            undo_move_basic(board, undo);

            if score > best {
                best = score;
            }
            if best > alpha {
                alpha = best;
            }
            if alpha >= beta {
                return alpha;
            }
        }

        if move_count == 0 {
            return -(MATE_BASE - ply as i32);
        }
        return best;
    }

    let stand_pat = if let Some(cached) = eval_cache.probe(board.zobrist) {
        cached
    } else {
        let v = static_eval(board, tables, alpha, beta);
        eval_cache.store(board.zobrist, v);
        v
    };

    if stand_pat >= beta {
        return stand_pat;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut picker = MovePicker::new(None, [None, None], true);
    let empty_history = [[0i32; 64]; 64];

    while let Some(mv) = picker.next(board, tables, &empty_history) {
        *nodes += 1;
        if *nodes % NODE_POLL_INTERVAL == 0 {
            time.check_time(*nodes);
        } else {
            time.check_node_budget(*nodes);
        }
        if time.stop_signal {
            return alpha;
        }

        let mut captured_value = 0;
        if let Some(piece) = board.piece_type_at(mv.to) {
            captured_value = piece.value();
        }

        let is_prom = mv.is_promotion();
        let is_ep = mv.is_en_passant();

        // Delta pruning: skip captures hopelessly below alpha. Promotions and
        // en passant bypass this since their true value isn't `captured_value`.
        if !is_prom && !is_ep && stand_pat + captured_value + 200 < alpha {
            continue;
        }

        if !is_prom && !is_ep && !board.static_exchange_eval(mv, 0, tables) {
            continue;
        }

        let undo = make_move_basic(board, mv);
        let score = -quiescence(
            board, tables, tt, eval_cache, ply + 1, -beta, -alpha, nodes, time,
        );
        undo_move_basic(board, undo);

        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            return alpha;
        }
    }
    alpha
}

#[allow(clippy::too_many_arguments)]
fn alpha_beta(
    board: &mut Board,
    tables: &MagicTables,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    eval_cache: &mut EvalCache,
    depth: i32,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    nodes: &mut u64,
    time: &mut TimeManager,
    pv: &mut Vec<Move>,
) -> i32 {
    pv.clear();

    if *nodes % NODE_POLL_INTERVAL == 0 {
        time.check_time(*nodes);
    } else {
        time.check_node_budget(*nodes);
    }
    if time.stop_signal {
        return 0;
    }
    *nodes += 1;

    if ply > 0 && is_rule_draw(board) {
        return DRAW_SCORE;
    }

    let is_pv_node = beta - alpha > 1;
    let hash = board.zobrist;
    let mut hash_move = None;

    if let Some((tt_move, raw_score, tt_depth, tt_bound)) = tt.probe(hash) {
        hash_move = tt_move;

        if tt_depth >= depth {
            let tt_score = score_from_tt(raw_score, ply as i32);
            if ply > 0 {
                match tt_bound {
                    NodeType::Exact => return tt_score,
                    NodeType::LowerBound if tt_score >= beta => return tt_score,
                    NodeType::UpperBound if tt_score <= alpha => return tt_score,
                    _ => {}
                }
            }
        }
    }

    let in_check_now = in_check(board, board.side_to_move, tables);
    let extension = if in_check_now { 1 } else { 0 };

    if depth <= 0 && !in_check_now {
        return quiescence(board, tables, tt, eval_cache, ply, alpha, beta, nodes, time);
    }

    let static_eval_val = if in_check_now {
        0
    } else if let Some(cached) = eval_cache.probe(hash) {
        cached
    } else {
        let v = static_eval(board, tables, alpha, beta);
        eval_cache.store(hash, v);
        v
    };

    if depth < RFP_DEPTH_LIMIT && !in_check_now && ply > 0 && !is_pv_node {
        let margin = RFP_MARGIN_BASE + RFP_MARGIN_MULT * depth;
        if static_eval_val - margin >= beta {
            return beta;
        }
    }

    // Null-move pruning: not at the root, not a PV node, not in check, deep
    // enough, and the mover has material that can't be put in zugzwang.
    if depth >= 3
        && !is_pv_node
        && !in_check_now
        && ply > 0
        && board.has_major_pieces(board.side_to_move)
        && static_eval_val >= beta
    {
        let r = 2 + depth / 4;
        let undo = make_null_move(board);
        let mut null_pv = Vec::new();
        let score = -alpha_beta(
            board,
            tables,
            ctx,
            tt,
            eval_cache,
            depth - 1 - r,
            ply + 1,
            -beta,
            -beta + 1,
            nodes,
            time,
            &mut null_pv,
        );
        undo_null_move(board, undo);

        if !time.stop_signal && score >= beta {
            if score < MATE_THRESHOLD {
                tt.save(
                    hash,
                    None,
                    score_to_tt(beta, ply as i32),
                    depth,
                    NodeType::LowerBound,
                );
                return beta;
            }
            // Don't trust a null-move mate score; fall through to a normal search.
        }
    }

    // Internal iterative deepening: no ordering hint from the TT, so seed one.
    if hash_move.is_none() && depth >= 3 {
        let mut iid_pv = Vec::new();
        alpha_beta(
            board,
            tables,
            ctx,
            tt,
            eval_cache,
            depth - 2,
            ply,
            alpha,
            beta,
            nodes,
            time,
            &mut iid_pv,
        );
        if let Some((tt_move, ..)) = tt.probe(hash) {
            hash_move = tt_move;
        }
    }

    let mut picker = MovePicker::new(hash_move, ctx.killer_moves[ply], false);

    let mut best_move = None;
    let mut best_score = -INF;
    let original_alpha = alpha;
    let mut move_count = 0;
    let mut child_pv = Vec::new();

    while let Some(mv) = picker.next(board, tables, &ctx.history) {
        if depth < FP_DEPTH_LIMIT
            && !in_check_now
            && !mv.is_capture()
            && !mv.is_promotion()
            && move_count > 0
            && !is_pv_node
        {
            let margin = FP_MARGIN_BASE + FP_MARGIN_MULT * depth;
            let history = ctx.history[mv.from.index() as usize][mv.to.index() as usize];
            if history < FP_HISTORY_THRESHOLD && static_eval_val + margin <= alpha {
                continue;
            }
        }

        if depth < LMP_DEPTH_LIMIT
            && !in_check_now
            && !mv.is_capture()
            && !mv.is_promotion()
            && alpha == original_alpha
            && !is_pv_node
        {
            let lmp_threshold = LMP_BASE_MOVES + LMP_MOVE_MULTIPLIER * depth;
            if move_count > lmp_threshold as usize {
                break;
            }
        }

        let undo = make_move_basic(board, mv);
        let gives_check = in_check(board, board.side_to_move, tables);
        let check_extension = if gives_check && depth >= 2 { 1 } else { 0 };
        let total_extension = extension.max(check_extension);

        let mut score;

        if move_count == 0 {
            score = -alpha_beta(
                board,
                tables,
                ctx,
                tt,
                eval_cache,
                depth - 1 + total_extension,
                ply + 1,
                -beta,
                -alpha,
                nodes,
                time,
                &mut child_pv,
            );
        } else {
            let mut r = 0;
            if depth >= LMR_MIN_DEPTH
                && move_count >= LMR_MIN_MOVES as usize
                && !mv.is_capture()
                && !mv.is_promotion()
                && !in_check_now
            {
                r = 1 + (depth / 8) + (move_count as i32 / 20);
                let history = ctx.history[mv.from.index() as usize][mv.to.index() as usize];
                if history > FP_HISTORY_THRESHOLD {
                    r -= 1;
                }
                if is_pv_node {
                    r -= 1;
                }
                r = r.clamp(0, (depth - 2).max(0));
            }

            // PVS: reduced, zero-width search first; widen/deepen on improvement.
            score = -alpha_beta(
                board,
                tables,
                ctx,
                tt,
                eval_cache,
                depth - 1 - r,
                ply + 1,
                -alpha - 1,
                -alpha,
                nodes,
                time,
                &mut child_pv,
            );

            if score > alpha && r > 0 {
                score = -alpha_beta(
                    board,
                    tables,
                    ctx,
                    tt,
                    eval_cache,
                    depth - 1,
                    ply + 1,
                    -alpha - 1,
                    -alpha,
                    nodes,
                    time,
                    &mut child_pv,
                );
            }

            if score > alpha && score < beta {
                score = -alpha_beta(
                    board,
                    tables,
                    ctx,
                    tt,
                    eval_cache,
                    depth - 1 + total_extension,
                    ply + 1,
                    -beta,
                    -alpha,
                    nodes,
                    time,
                    &mut child_pv,
                );
            }
        }

        undo_move_basic(board, undo);
        move_count += 1;

        if time.stop_signal {
            return 0;
        }

        if score > best_score {
            best_score = score;
            if score > alpha {
                alpha = score;
                best_move = Some(mv);
                pv.clear();
                pv.push(mv);
                pv.extend_from_slice(&child_pv);
            }
            if score >= beta {
                tt.save(
                    hash,
                    Some(mv),
                    score_to_tt(beta, ply as i32),
                    depth,
                    NodeType::LowerBound,
                );

                if !mv.is_capture() {
                    ctx.update_killer(ply, mv);
                    ctx.update_history(mv, depth);
                }

                return beta;
            }
        }
    }

    if move_count == 0 {
        if in_check_now {
            return -(MATE_BASE - ply as i32);
        }
        return 0;
    }

    if time.stop_signal {
        return 0;
    }

    let node_type = if best_score >= beta {
        NodeType::LowerBound
    } else if best_score > original_alpha {
        NodeType::Exact
    } else {
        NodeType::UpperBound
    };

    tt.save(
        hash,
        best_move,
        score_to_tt(best_score, ply as i32),
        depth,
        node_type,
    );

    best_score
}

/// Iterative-deepening entry point. Allocates a fresh transposition table and
/// evaluation cache for the call; a session driver that wants the tables to
/// persist across plies (e.g. self-play) should use [`search_with_state`].
pub fn search(board: &mut Board, tables: &MagicTables, limits: &Limits) -> SearchResult {
    let mut tt = TranspositionTable::new(64);
    let mut eval_cache = EvalCache::new();
    search_with_state(board, tables, limits, &mut tt, &mut eval_cache)
}

/// Same as [`search`] but reuses caller-owned TT/eval-cache state across
/// calls.
pub fn search_with_state(
    board: &mut Board,
    tables: &MagicTables,
    limits: &Limits,
    tt: &mut TranspositionTable,
    eval_cache: &mut EvalCache,
) -> SearchResult {
    tt.new_search();
    eval_cache.new_search();

    let mut ctx = SearchContext::new();
    let time_limit = limits.derive_time_slice();
    let mut time = TimeManager::new(time_limit, limits.node_budget, limits.cancel.clone());

    let max_depth = limits.max_depth.unwrap_or(64);
    let mut nodes: u64 = 0;

    let mut result = SearchResult::default();
    let mut last_iter_duration = Duration::from_millis(0);

    for depth in 1..=max_depth {
        let iter_start = Instant::now();

        if depth > 1
            && let Some(limit) = time_limit
        {
            let predicted_next = last_iter_duration * 3;
            if time.elapsed() + predicted_next > limit {
                break;
            }
        }
        if let Some(budget) = limits.node_budget
            && nodes >= budget
        {
            break;
        }

        for row in ctx.history.iter_mut() {
            for v in row.iter_mut() {
                *v /= 8;
            }
        }

        let mut alpha = -INF;
        let mut beta = INF;
        let mut window = 50 + 10 * depth as i32;

        if depth > 1 {
            alpha = (result.score_cp - window).max(-INF);
            beta = (result.score_cp + window).min(INF);
        }

        let mut score;
        let mut pv = Vec::new();

        loop {
            pv.clear();
            score = alpha_beta(
                board,
                tables,
                &mut ctx,
                tt,
                eval_cache,
                depth as i32,
                0,
                alpha,
                beta,
                &mut nodes,
                &mut time,
                &mut pv,
            );

            if time.stop_signal {
                break;
            }

            if score <= alpha {
                window *= 2;
                alpha = (score - window).max(-INF);
                continue;
            }
            if score >= beta {
                window *= 2;
                beta = (score + window).min(INF);
                continue;
            }
            break;
        }

        last_iter_duration = iter_start.elapsed();

        if time.stop_signal {
            break;
        }

        result.score_cp = score;
        result.depth = depth;
        if let Some(mv) = pv.first().copied() {
            result.best_move = Some(mv);
            result.pv = pv;
        }
        result.nodes = nodes;

        if score.abs() >= MATE_THRESHOLD {
            break;
        }
    }

    result.nodes = nodes;
    result
}
