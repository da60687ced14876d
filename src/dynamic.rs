use crate::draft;
use crate::error::SamError;
use crate::sam::Sam;
use crate::state::Token;
use crate::state_id::StateID;

/// A suffix automaton over a stream that grows as generation proceeds
/// ("local self-similarity"). `reset` discards the whole
/// arena and starts over.
pub struct DynamicSam<S: StateID = u32> {
    core: Sam<S>,
}

impl<S: StateID> DynamicSam<S> {
    pub fn new(alpha: f64, max_predicts: usize) -> Self {
        DynamicSam {
            core: Sam::new(alpha, max_predicts),
        }
    }

    pub fn with_capacity(alpha: f64, max_predicts: usize, expected_len: usize) -> Self {
        DynamicSam {
            core: Sam::with_capacity(alpha, max_predicts, expected_len),
        }
    }

    pub(crate) fn core(&self) -> &Sam<S> {
        &self.core
    }

    /// Discards the arena and reinitializes with a fresh root state.
    pub fn reset(&mut self) {
        self.core.reset_arena();
    }

    pub fn add_tokens(&mut self, tokens: &[Token]) -> Result<(), SamError> {
        self.core.add_tokens(tokens)
    }

    pub fn transfer_tokens(&mut self, tokens: &[Token]) {
        self.core.transfer_tokens(tokens);
    }

    pub fn cursor(&self) -> (S, usize) {
        self.core.cursor()
    }

    /// Probes what the next token would match, without mutating the
    /// cursor.
    pub fn lookup(&self, token: Token) -> (S, usize) {
        self.core.lookup(token)
    }

    pub fn to_anc(&self, index: S, length: usize) -> (S, usize) {
        self.core.to_anc(index, length)
    }

    pub fn gen_draft_linear(&self, index: S, match_length: usize, start_token: Token) -> Vec<Token> {
        draft::gen_draft_linear(&self.core, index, match_length, start_token)
    }

    pub fn gen_draft_tree(
        &self,
        index: S,
        match_length: usize,
        start_token: Token,
    ) -> (Vec<Token>, Vec<i64>) {
        draft::gen_draft_tree(&self.core, index, match_length, start_token)
    }

    pub fn state_count(&self) -> usize {
        self.core.state_count()
    }

    pub fn max_length(&self) -> usize {
        self.core.max_length()
    }

    /// Approximate heap footprint of the arena and indexed stream, in
    /// bytes.
    pub fn memory_bytes(&self) -> usize {
        self.core.memory_bytes()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sam::DEFAULT_ALPHA;

    #[test]
    fn add_tokens_empty_is_a_no_op() {
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 10);
        sam.add_tokens(&[]).unwrap();
        assert_eq!(sam.max_length(), 0);
        assert_eq!(sam.state_count(), 1);
        assert_eq!(sam.cursor(), (sam.core().root(), 0));
    }

    #[test]
    fn lookup_on_empty_automaton_returns_root_zero() {
        let sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 10);
        let (index, length) = sam.lookup(0);
        assert_eq!(index, sam.core().root());
        assert_eq!(length, 0);
    }

    #[test]
    fn cursor_tracks_last_after_add_tokens() {
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 10);
        sam.add_tokens(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(sam.cursor(), (sam.core().last(), sam.core().max_length()));
        assert_eq!(sam.cursor().1, 5);
    }

    #[test]
    fn state_count_bounded_by_two_n_plus_one() {
        // Deliberately repetitive so cloning kicks in.
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 100);
        let tokens: Vec<Token> = (0..50).map(|i| i % 3).collect();
        sam.add_tokens(&tokens).unwrap();
        assert!(sam.state_count() <= 2 * tokens.len() + 1);
    }

    #[test]
    fn memory_bytes_grows_with_indexed_tokens() {
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 10);
        let empty = sam.memory_bytes();
        sam.add_tokens(&[1, 2, 3, 1, 2, 4]).unwrap();
        assert!(sam.memory_bytes() > empty);
    }

    #[test]
    fn reset_discards_the_arena() {
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 10);
        sam.add_tokens(&[1, 2, 3]).unwrap();
        assert!(sam.state_count() > 1);
        sam.reset();
        assert_eq!(sam.state_count(), 1);
        assert_eq!(sam.max_length(), 0);
        assert_eq!(sam.cursor(), (sam.core().root(), 0));
    }

    #[test]
    fn reset_then_replay_yields_identical_arena_shape() {
        let tokens: Vec<Token> = vec![1, 2, 1, 2, 3, 1, 2, 4];
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 10);
        sam.add_tokens(&tokens).unwrap();
        let first_count = sam.state_count();
        let first_cursor = sam.cursor();

        sam.reset();
        sam.add_tokens(&tokens).unwrap();

        assert_eq!(sam.state_count(), first_count);
        assert_eq!(sam.cursor(), first_cursor);
    }

    fn contains_subslice(haystack: &[Token], needle: &[Token]) -> bool {
        if needle.is_empty() {
            return true;
        }
        if needle.len() > haystack.len() {
            return false;
        }
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    /// Reference implementation of "longest suffix of `query` occurring
    /// anywhere in `s`", used to cross-check the automaton's transfer walk.
    fn brute_force_longest_suffix_match(s: &[Token], query: &[Token]) -> usize {
        for len in (0..=query.len()).rev() {
            let suffix = &query[query.len() - len..];
            if contains_subslice(s, suffix) {
                return len;
            }
        }
        0
    }

    #[quickcheck_macros::quickcheck]
    fn cursor_after_add_tokens_equals_last(s: crate::test_support::SmallTokenStream) -> bool {
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 1000);
        if sam.add_tokens(&s.0).is_err() {
            return true;
        }
        let (index, length) = sam.cursor();
        index == sam.core().last() && length == sam.core().state(index).length
    }

    #[quickcheck_macros::quickcheck]
    fn transfer_matches_brute_force_longest_suffix(
        s: crate::test_support::SmallTokenStream,
        p: crate::test_support::SmallTokenStream,
        t: i64,
    ) -> bool {
        let t = t.rem_euclid(5);
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 1000);
        if sam.add_tokens(&s.0).is_err() {
            return true;
        }
        sam.transfer_tokens(&p.0);
        let (_, length) = sam.lookup(t);

        let mut query = p.0.clone();
        query.push(t);
        length == brute_force_longest_suffix_match(&s.0, &query)
    }

    #[quickcheck_macros::quickcheck]
    fn state_count_respects_bound(s: crate::test_support::SmallTokenStream) -> bool {
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 1000);
        if sam.add_tokens(&s.0).is_err() {
            return true;
        }
        sam.state_count() <= 2 * s.0.len() + 1
    }

    #[quickcheck_macros::quickcheck]
    fn cnt_endpos_matches_brute_force_occurrence_count(s: crate::test_support::SmallTokenStream) -> bool {
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 1000);
        if sam.add_tokens(&s.0).is_err() {
            return true;
        }
        for i in 1..=sam.state_count() {
            let id = match crate::state_id::usize_to_state_id::<u32>(i) {
                Some(id) => id,
                None => continue,
            };
            if id == sam.core().root() {
                continue;
            }
            let state = sam.core().state(id);
            let length = state.length;
            let min_endpos = state.min_endpos;
            if length > min_endpos {
                continue;
            }
            let representative = &s.0[min_endpos - length..min_endpos];
            let occurrences = s
                .0
                .windows(length)
                .filter(|w| *w == representative)
                .count() as u32;
            if state.cnt_endpos != occurrences {
                return false;
            }
        }
        true
    }

    #[quickcheck_macros::quickcheck]
    fn reset_then_replay_is_idempotent(s: crate::test_support::SmallTokenStream) -> bool {
        let mut sam: DynamicSam<u32> = DynamicSam::new(DEFAULT_ALPHA, 1000);
        if sam.add_tokens(&s.0).is_err() {
            return true;
        }
        let first_count = sam.state_count();
        let first_cursor = sam.cursor();
        sam.reset();
        if sam.add_tokens(&s.0).is_err() {
            return true;
        }
        sam.state_count() == first_count && sam.cursor() == first_cursor
    }
}
