use log::debug;

use crate::draft;
use crate::error::SamError;
use crate::sam::Sam;
use crate::state::Token;
use crate::state_id::StateID;

/// A suffix automaton built once over a static corpus (a "domain prior").
/// `reset` only resets the cursor; the arena survives across queries.
pub struct StaticSam<S: StateID = u32> {
    core: Sam<S>,
    built: bool,
}

impl<S: StateID> StaticSam<S> {
    pub fn new(alpha: f64, max_predicts: usize) -> Self {
        StaticSam {
            core: Sam::new(alpha, max_predicts),
            built: false,
        }
    }

    pub(crate) fn core(&self) -> &Sam<S> {
        &self.core
    }

    /// Resets the cursor only; the indexed corpus is untouched.
    pub fn reset(&mut self) {
        self.core.reset_cursor();
    }

    /// Extends the indexed corpus. Returns
    /// [`SamError::StaticMutationAfterBuild`] once [`StaticSam::build`] /
    /// [`StaticSam::add_batch_tokens`] has finalized this automaton.
    pub fn add_tokens(&mut self, tokens: &[Token]) -> Result<(), SamError> {
        if self.built {
            return Err(SamError::StaticMutationAfterBuild);
        }
        self.core.add_tokens(tokens)
    }

    pub fn transfer_tokens(&mut self, tokens: &[Token]) {
        self.core.transfer_tokens(tokens);
    }

    pub fn cursor(&self) -> (S, usize) {
        self.core.cursor()
    }

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

    /// Indexes every sequence in the batch, appending
    /// `eos_token` to any sequence that doesn't already end with it so
    /// draft reads never silently cross a document boundary. Finalizes
    /// the automaton; further `add_tokens` calls become an error.
    pub fn add_batch_tokens(
        &mut self,
        batch_tokens: &[Vec<Token>],
        eos_token: Token,
    ) -> Result<(), SamError> {
        for (i, tokens) in batch_tokens.iter().enumerate() {
            if self.built {
                return Err(SamError::StaticMutationAfterBuild);
            }
            self.core.add_tokens(tokens)?;
            if tokens.last().copied() != Some(eos_token) {
                self.core.add_tokens(std::slice::from_ref(&eos_token))?;
            }
            debug!(target: "sam_draft::static_sam", "add_batch_tokens: indexed sequence {}/{}", i + 1, batch_tokens.len());
        }
        self.built = true;
        Ok(())
    }

    pub fn build(
        batch_tokens: &[Vec<Token>],
        eos_token: Token,
        max_predicts: usize,
        alpha: f64,
    ) -> Result<Self, SamError> {
        let mut sam = StaticSam::new(alpha, max_predicts);
        sam.add_batch_tokens(batch_tokens, eos_token)?;
        Ok(sam)
    }
}
