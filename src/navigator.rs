//! Pure functions over a `(state, matched-length)` pair.
//!
//! These never mutate anything; `Sam`'s `transfer_cur_state` /
//! `transfer_tokens` are thin mutating wrappers around
//! [`transfer_state`] that additionally update the automaton's cursor.

use crate::sam::Sam;
use crate::state::Token;
use crate::state_id::{null_id, StateID};

/// Advance `(index, length)` by consuming `token`, falling back through
/// suffix links on mismatch. Returns `(0-state, 0)` ("the empty suffix")
/// if `token` is not reachable from any suffix of the current match,
/// including when the root itself lacks a transition on `token`.
pub(crate) fn transfer_state<S: StateID>(
    sam: &Sam<S>,
    mut index: S,
    mut length: usize,
    token: Token,
) -> (S, usize) {
    let null = null_id::<S>();
    let root = sam.root();
    while index != root && sam.state(index).next(token).is_none() {
        index = sam.state(index).link;
        if index == null {
            break;
        }
        length = sam.state(index).length;
    }
    match sam.state(index).next(token) {
        Some(next) => (next, length + 1),
        None => (root, 0),
    }
}
