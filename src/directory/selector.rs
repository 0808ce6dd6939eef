// Peer Selector - pick gossip targets among recently updated peers
//
// The draw below is not a uniform sample: it leans towards the head of the
// candidate list (the most recently updated peers). Other nodes select the
// same way, so the formula is kept as is.

use crate::peer::PeerRecord;
use rand::Rng;

/// Most peers returned by one selection
pub const GOSSIP_SAMPLE_SIZE: usize = 4;

/// Candidate window the index formula is scaled to
pub const RECENT_WINDOW: usize = 10;

/// Draw up to 4 distinct peers from `candidates` using the thread RNG.
///
/// `candidates` is expected to be ordered by recency, newest first, and to
/// hold at most 10 entries.
pub fn choose_up_to_4(candidates: Vec<PeerRecord>) -> Vec<PeerRecord> {
    let mut rng = rand::thread_rng();
    choose_up_to_4_with(candidates, || rng.gen::<f64>())
}

/// Same as [`choose_up_to_4`] with an explicit source of draws in `[0, 1)`.
///
/// For draw `i` (zero-based) with `n` peers left in the pool the index is
/// `max(floor(r * 10) - (10 - n) - i, 0)`; the picked peer leaves the pool,
/// so `n` drops by one after every draw.
pub fn choose_up_to_4_with<F>(mut candidates: Vec<PeerRecord>, mut draw: F) -> Vec<PeerRecord>
where
    F: FnMut() -> f64,
{
    let count = candidates.len().min(GOSSIP_SAMPLE_SIZE);
    let mut chosen = Vec::with_capacity(count);

    for i in 0..count {
        let pool = candidates.len();
        let index = pick_index(draw(), pool, i).min(pool - 1);
        chosen.push(candidates.remove(index));
    }
    chosen
}

/// Pool index for draw `i` when `n` peers are still in the pool
pub fn pick_index(r: f64, n: usize, i: usize) -> usize {
    let r = if r.is_finite() { r.clamp(0.0, 1.0 - f64::EPSILON) } else { 0.0 };
    let bucket = (r * RECENT_WINDOW as f64).floor() as i64;
    let index = bucket - (RECENT_WINDOW as i64 - n as i64) - i as i64;
    index.max(0) as usize
}
