use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::sam::Sam;
use crate::state::Token;
use crate::state_id::StateID;

/// Budget shared by both linear and tree generation: a hard cap plus a
/// confidence-proportional allowance.
fn budget(max_predicts: usize, match_length: usize, alpha: f64) -> usize {
    let confidence_budget = 1 + (match_length as f64 * alpha).floor() as usize;
    max_predicts.min(confidence_budget)
}

/// Reads the stream at the matched state's earliest
/// occurrence and return the following tokens, padded with `0` if the
/// stream is shorter than the budget.
pub(crate) fn gen_draft_linear<S: StateID>(
    sam: &Sam<S>,
    index: S,
    match_length: usize,
    start_token: Token,
) -> Vec<Token> {
    let n = budget(sam.max_predicts(), match_length, sam.alpha());
    let endpos = sam.state(index).min_endpos;
    let input_ids = sam.input_ids();

    let mut seq = Vec::with_capacity(n);
    seq.push(start_token);
    for i in 0..n.saturating_sub(1) {
        let pos = endpos + 1 + i;
        seq.push(input_ids.get(pos).copied().unwrap_or(0));
    }
    debug!(target: "sam_draft::draft", "gen_draft_linear: n={} endpos={}", n, endpos);
    seq
}

/// A min-heap key over `f64` using a total order (probabilities here are
/// always finite, never NaN). A raw-float product
/// underflows on very long matches; this crate does not address that
/// (noted as a latent issue, not a correctness requirement).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Priority(f64);

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// One pending frontier item. Ordered by `neg_prob` ascending (most
/// negative = highest priority, via a negation trick),
/// ties broken by insertion sequence so construction is deterministic for
/// a given insertion order.
struct SearchItem<S> {
    neg_prob: Priority,
    seq: u64,
    token: Token,
    state: S,
    parent: Option<usize>,
}

impl<S> PartialEq for SearchItem<S> {
    fn eq(&self, other: &Self) -> bool {
        self.neg_prob == other.neg_prob && self.seq == other.seq
    }
}

impl<S> Eq for SearchItem<S> {}

impl<S> PartialOrd for SearchItem<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for SearchItem<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.neg_prob
            .cmp(&other.neg_prob)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Best-first frontier tree, branching weighted by
/// empirical transition frequency (`cnt_endpos`). Returns `(tree,
/// anc_tree)` where `anc_tree[i]` is the parent index of `tree[i]` (`-1`
/// for the root). May return fewer than `n` nodes if the frontier empties
/// first.
pub(crate) fn gen_draft_tree<S: StateID>(
    sam: &Sam<S>,
    index: S,
    match_length: usize,
    start_token: Token,
) -> (Vec<Token>, Vec<i64>) {
    let n = budget(sam.max_predicts(), match_length, sam.alpha());

    let mut heap = BinaryHeap::new();
    let mut next_seq = 0u64;
    heap.push(Reverse(SearchItem {
        neg_prob: Priority(-1.0),
        seq: next_seq,
        token: start_token,
        state: index,
        parent: None,
    }));
    next_seq += 1;

    let mut tree = Vec::with_capacity(n);
    let mut anc_tree = Vec::with_capacity(n);

    while tree.len() != n {
        let Some(Reverse(item)) = heap.pop() else {
            break;
        };
        let tree_index = tree.len();
        tree.push(item.token);
        anc_tree.push(item.parent.map(|p| p as i64).unwrap_or(-1));
        trace!(target: "sam_draft::draft", "gen_draft_tree: popped token={} prob={}", item.token, -item.neg_prob.0);
        if tree.len() == n {
            break;
        }

        let cnt_sum = sam.state(item.state).cnt_endpos.max(1) as f64;
        for &(child_token, child_state) in sam.state(item.state).transitions() {
            let weight = (sam.state(child_state).cnt_endpos as f64 / cnt_sum).min(1.0);
            let child_prob = item.neg_prob.0 * weight;
            heap.push(Reverse(SearchItem {
                neg_prob: Priority(child_prob),
                seq: next_seq,
                token: child_token,
                state: child_state,
                parent: Some(tree_index),
            }));
            next_seq += 1;
        }
    }

    debug!(target: "sam_draft::draft", "gen_draft_tree: produced {} nodes (budget {})", tree.len(), n);
    (tree, anc_tree)
}
