use std::mem::size_of;

use log::{debug, trace};

use crate::error::SamError;
use crate::navigator;
use crate::state::{State, Token};
use crate::state_id::{null_id, usize_to_state_id, StateID};

/// Confidence multiplier used by the source when no explicit `alpha` is
/// supplied: `alpha` is exposed as a drafter-level knob, but the
/// retrieved `SAM.__init__` hardcodes `self.alpha = 4.0`.
pub const DEFAULT_ALPHA: f64 = 4.0;

/// Shared suffix-automaton core: arena of states plus the indexed token
/// stream and a cursor. `DynamicSam` and `StaticSam` are thin wrappers
/// around this that differ only in their `reset` semantics.
///
/// Arena index `0` is a reserved null id (see [`crate::state_id`]) and is
/// never a real state; the automaton's root ("state 0") lives at index
/// `1` and is addressed via `self.root`.
pub(crate) struct Sam<S> {
    states: Vec<State<S>>,
    input_ids: Vec<Token>,
    root: S,
    last: S,
    max_length: usize,
    cur_index: S,
    cur_length: usize,
    alpha: f64,
    max_predicts: usize,
}

impl<S: StateID> Sam<S> {
    pub(crate) fn new(alpha: f64, max_predicts: usize) -> Self {
        Self::with_capacity(alpha, max_predicts, 0)
    }

    pub(crate) fn with_capacity(alpha: f64, max_predicts: usize, expected_len: usize) -> Self {
        let mut states = Vec::with_capacity(2 * expected_len + 2);
        states.push(State::new(0, 0)); // index 0: null sentinel, never addressed
        states.push(State::new(0, 0)); // index 1: root
        let root = usize_to_state_id::<S>(1)
            .expect("StateID representation too narrow to hold the root state");
        let mut input_ids = Vec::with_capacity(expected_len + 1);
        input_ids.push(-1);
        Sam {
            states,
            input_ids,
            root,
            last: root,
            max_length: 0,
            cur_index: root,
            cur_length: 0,
            alpha,
            max_predicts,
        }
    }

    pub(crate) fn reset_arena(&mut self) {
        *self = Sam::new(self.alpha, self.max_predicts);
    }

    pub(crate) fn reset_cursor(&mut self) {
        self.cur_index = self.root;
        self.cur_length = 0;
    }

    pub(crate) fn root(&self) -> S {
        self.root
    }

    pub(crate) fn last(&self) -> S {
        self.last
    }

    pub(crate) fn max_length(&self) -> usize {
        self.max_length
    }

    pub(crate) fn alpha(&self) -> f64 {
        self.alpha
    }

    pub(crate) fn max_predicts(&self) -> usize {
        self.max_predicts
    }

    pub(crate) fn cursor(&self) -> (S, usize) {
        (self.cur_index, self.cur_length)
    }

    pub(crate) fn input_ids(&self) -> &[Token] {
        &self.input_ids
    }

    pub(crate) fn state(&self, id: S) -> &State<S> {
        &self.states[id.to_usize()]
    }

    fn state_mut(&mut self, id: S) -> &mut State<S> {
        &mut self.states[id.to_usize()]
    }

    /// Number of real states, including the root (excludes the reserved
    /// null slot at index 0). Bounded by `2 * max_length + 1` per
    /// Bounded by `2 * max_length + 1`.
    pub(crate) fn state_count(&self) -> usize {
        self.states.len() - 1
    }

    /// Approximate heap footprint of the arena and indexed stream: each
    /// state's fixed fields plus its transitions' heap allocation, plus
    /// `input_ids`.
    pub(crate) fn memory_bytes(&self) -> usize {
        let states_fixed = self.states.len() * size_of::<State<S>>();
        let transitions_heap: usize = self.states.iter().map(State::heap_bytes).sum();
        let input_ids_heap = self.input_ids.len() * size_of::<Token>();
        states_fixed + transitions_heap + input_ids_heap
    }

    fn push_state(&mut self, state: State<S>) -> Result<S, SamError> {
        let new_index = self.states.len();
        let id = usize_to_state_id::<S>(new_index)
            .ok_or(SamError::StateIdOverflow { max: S::max_id() })?;
        self.states.push(state);
        Ok(id)
    }

    /// Pure transfer function: given a `(state, matched length)` pair and
    /// an incoming token, returns the resulting pair without mutating any
    /// cursor. Delegates to [`navigator::transfer_state`] so there is a
    /// single implementation of the fallback walk.
    pub(crate) fn transfer(&self, index: S, length: usize, token: Token) -> (S, usize) {
        navigator::transfer_state(self, index, length, token)
    }

    pub(crate) fn transfer_cur_state(&mut self, token: Token) {
        let (index, length) = self.transfer(self.cur_index, self.cur_length, token);
        self.cur_index = index;
        self.cur_length = length;
    }

    pub(crate) fn transfer_tokens(&mut self, tokens: &[Token]) {
        for &t in tokens {
            self.transfer_cur_state(t);
        }
    }

    pub(crate) fn lookup(&self, token: Token) -> (S, usize) {
        self.transfer(self.cur_index, self.cur_length, token)
    }

    /// Conservative default policy: only
    /// an index that names the automaton's own current tail (`last`) is
    /// worth stepping back from, and then only by a single suffix-link hop.
    pub(crate) fn to_anc(&self, index: S, length: usize) -> (S, usize) {
        if index != self.root && index == self.last {
            let linked = self.state(index).link;
            (linked, self.state(linked).length)
        } else {
            (index, length)
        }
    }

    /// Appends one token, extending the automaton in
    /// amortized linear time.
    pub(crate) fn add_state(&mut self, token: Token) -> Result<(), SamError> {
        self.max_length += 1;
        let cur = self.push_state(State::new(self.max_length, self.max_length))?;

        let null = null_id::<S>();
        let mut p = self.last;
        while p != null && self.state(p).next(token).is_none() {
            self.state_mut(p).set_next(token, cur);
            p = self.state(p).link;
        }

        if p == null {
            self.state_mut(cur).link = self.root;
        } else {
            let q = self.state(p).next(token).expect("loop invariant: p has a transition on token");
            if self.state(p).length + 1 == self.state(q).length {
                self.state_mut(cur).link = q;
            } else {
                let mut clone_state = self.state(q).clone();
                clone_state.length = self.state(p).length + 1;
                let clone = self.push_state(clone_state)?;

                let mut p2 = p;
                while p2 != null && self.state(p2).next(token) == Some(q) {
                    self.state_mut(p2).set_next(token, clone);
                    p2 = self.state(p2).link;
                }
                self.state_mut(q).link = clone;
                self.state_mut(cur).link = clone;
                trace!(target: "sam_draft::sam", "add_state: cloned state {:?} into {:?} (split at {:?})", q, clone, p);
            }
        }
        self.last = cur;

        let mut walk = cur;
        while walk != self.root {
            self.state_mut(walk).cnt_endpos += 1;
            walk = self.state(walk).link;
        }

        trace!(target: "sam_draft::sam", "add_state: token={} cur={:?} link={:?} max_length={}", token, cur, self.state(cur).link, self.max_length);
        Ok(())
    }

    /// `add_tokens`: advance the cursor before indexing
    /// each token so interleaved lookups stay consistent.
    pub(crate) fn add_tokens(&mut self, tokens: &[Token]) -> Result<(), SamError> {
        for &t in tokens {
            self.transfer_cur_state(t);
            self.add_state(t)?;
        }
        self.input_ids.extend_from_slice(tokens);
        debug!(target: "sam_draft::sam", "add_tokens: appended {} tokens, max_length={}", tokens.len(), self.max_length);
        Ok(())
    }
}
