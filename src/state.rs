use std::mem::size_of;

use crate::state_id::{null_id, StateID};

pub type Token = i64;

/// One arena entry of the suffix automaton.
///
/// Index `0` of the owning arena is never a real state (see
/// [`crate::state_id::null_id`]); states live at indices `1..`. The
/// automaton's root ("state 0") is therefore arena index `1`,
/// and its `link` is the null id.
#[derive(Clone, Debug)]
pub(crate) struct State<S> {
    trans: Transitions<S>,
    pub(crate) link: S,
    pub(crate) length: usize,
    pub(crate) min_endpos: usize,
    pub(crate) cnt_endpos: u32,
}

impl<S: StateID> State<S> {
    pub(crate) fn new(length: usize, min_endpos: usize) -> Self {
        State {
            trans: Transitions(Vec::new()),
            link: null_id(),
            length,
            min_endpos,
            cnt_endpos: 0,
        }
    }

    pub(crate) fn next(&self, token: Token) -> Option<S> {
        self.trans.next(token)
    }

    pub(crate) fn set_next(&mut self, token: Token, next: S) {
        self.trans.set_next(token, next);
    }

    pub(crate) fn transitions(&self) -> &[(Token, S)] {
        &self.trans.0
    }

    pub(crate) fn heap_bytes(&self) -> usize {
        self.trans.heap_bytes()
    }
}

/// Outgoing transitions of a state, kept as a sorted vector with
/// binary-search lookup. Key order is semantically irrelevant; a sorted
/// vector is chosen over a `HashMap` because states are typically sparse
/// (a handful of distinct next-tokens) and this keeps `State` `Clone`-cheap
/// for the split step's deep copy.
#[derive(Clone, Debug)]
struct Transitions<S>(Vec<(Token, S)>);

impl<S: StateID> Transitions<S> {
    fn heap_bytes(&self) -> usize {
        self.0.len() * size_of::<(Token, S)>()
    }

    fn next(&self, token: Token) -> Option<S> {
        self.0
            .binary_search_by_key(&token, |&(t, _)| t)
            .ok()
            .map(|i| self.0[i].1)
    }

    fn set_next(&mut self, token: Token, next: S) {
        match self.0.binary_search_by_key(&token, |&(t, _)| t) {
            Ok(i) => self.0[i] = (token, next),
            Err(i) => self.0.insert(i, (token, next)),
        }
    }
}
