//! Fuses a dynamic and a static suffix automaton with a length-bias policy,
//! delegating to an external tree model when neither match is confident
//! enough to warrant a linear draft.

use log::{debug, trace};

use crate::buffers::{build_seq_buffers, build_tree_buffers, SeqBuffers, TreeBuffers};
use crate::dynamic::DynamicSam;
use crate::state::Token;
use crate::state_id::StateID;
use crate::static_sam::StaticSam;
use crate::tree_model::{TreeDraft, TreeModel};

/// Construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct DrafterConfig {
    pub n_predicts: usize,
    pub alpha: f64,
    /// Penalty subtracted from the static SAM's match length before
    /// comparing it against the dynamic SAM's match.
    pub len_bias: i64,
    /// Minimum effective match length required to emit a SEQUENCE draft.
    pub len_threshold: i64,
    pub eos_token: Token,
}

/// Which kind of draft a `Drafter::lookup` produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Sequence,
    Tree,
}

/// A linear draft together with its decoder-facing position buffer.
pub struct SequenceDraft {
    pub tokens: Vec<Token>,
    pub buffers: SeqBuffers,
}

pub enum DraftPayload {
    Sequence(SequenceDraft),
    Tree(TreeDraft),
}

/// Optional payload forwarded to the external tree model alongside the raw
/// tokens on an update. None of these
/// fields are interpreted by this crate; they are opaque pass-through data
/// for whatever tree model is wired in.
pub struct UpdateContext<'a> {
    pub tokens: &'a [Token],
    pub hidden_states: Option<&'a [f32]>,
    pub tree_tokens: Option<&'a [Token]>,
    pub tree_logits: Option<&'a [f32]>,
}

/// Owns a dynamic SAM, a static SAM, and an external tree model; fuses the
/// two SAMs' matches on every `lookup`.
pub struct Drafter<S: StateID = u32> {
    dynamic: DynamicSam<S>,
    static_sam: StaticSam<S>,
    tree_model: Box<dyn TreeModel>,
    config: DrafterConfig,
}

impl<S: StateID> Drafter<S> {
    pub fn new(config: DrafterConfig, static_sam: StaticSam<S>, tree_model: Box<dyn TreeModel>) -> Self {
        Drafter {
            dynamic: DynamicSam::new(config.alpha, config.n_predicts),
            static_sam,
            tree_model,
            config,
        }
    }

    /// Clears the dynamic SAM's arena, resets both cursors, and resets the
    /// external tree model.
    pub fn reset(&mut self) {
        self.dynamic.reset();
        self.static_sam.reset();
        self.tree_model.reset();
        trace!(target: "sam_draft::drafter", "reset");
    }

    pub fn update(&mut self, tokens: &[Token]) -> Result<(), crate::error::SamError> {
        self.dynamic.add_tokens(tokens)?;
        self.static_sam.transfer_tokens(tokens);
        self.tree_model.update(tokens);
        trace!(target: "sam_draft::drafter", "update: {} tokens", tokens.len());
        Ok(())
    }

    /// Like [`Drafter::update`] but also forwards optional hidden-state /
    /// tree-token / tree-logit payloads to the external tree model
    /// This crate does not interpret
    /// those payloads itself.
    pub fn update_extended(&mut self, ctx: UpdateContext<'_>) -> Result<(), crate::error::SamError> {
        self.dynamic.add_tokens(ctx.tokens)?;
        self.static_sam.transfer_tokens(ctx.tokens);
        self.tree_model.update(ctx.tokens);
        trace!(
            target: "sam_draft::drafter",
            "update_extended: {} tokens, hidden_states={} tree_tokens={} tree_logits={}",
            ctx.tokens.len(),
            ctx.hidden_states.is_some(),
            ctx.tree_tokens.is_some(),
            ctx.tree_logits.is_some()
        );
        Ok(())
    }

    /// Compares the dynamic match against the length-biased
    /// static match, pick the longer, and decide SEQUENCE vs TREE against
    /// `len_threshold`.
    pub fn lookup(&mut self, start_token: Token) -> (CandidateKind, DraftPayload) {
        let (pred_dyn, match_dyn) = self.dynamic.lookup(start_token);
        let (pred_static, match_static_raw) = self.static_sam.lookup(start_token);
        let match_static = match_static_raw as i64 - self.config.len_bias;

        let (use_dynamic, effective_match) = if match_dyn as i64 >= match_static {
            (true, match_dyn as i64)
        } else {
            (false, match_static)
        };

        if effective_match >= self.config.len_threshold {
            let tokens = if use_dynamic {
                self.dynamic
                    .gen_draft_linear(pred_dyn, match_dyn, start_token)
            } else {
                let clamped = effective_match.max(0) as usize;
                self.static_sam
                    .gen_draft_linear(pred_static, clamped, start_token)
            };
            let buffers = build_seq_buffers(tokens.len());
            debug!(
                target: "sam_draft::drafter",
                "lookup: winner={} effective_match={} -> SEQUENCE len={}",
                if use_dynamic { "dynamic" } else { "static" },
                effective_match,
                tokens.len()
            );
            (
                CandidateKind::Sequence,
                DraftPayload::Sequence(SequenceDraft { tokens, buffers }),
            )
        } else {
            let draft = self.tree_model.lookup(start_token);
            debug!(
                target: "sam_draft::drafter",
                "lookup: winner={} effective_match={} -> TREE len={}",
                if use_dynamic { "dynamic" } else { "static" },
                effective_match,
                draft.tree.len()
            );
            (CandidateKind::Tree, DraftPayload::Tree(draft))
        }
    }
}

/// Builds `TreeBuffers` directly from an already-computed `anc_tree`,
/// exposed for callers assembling a `DraftPayload::Tree` manually (e.g.
/// tests, or a caller bypassing `TreeModel`).
pub fn tree_buffers_for(anc_tree: &[i64]) -> TreeBuffers {
    build_tree_buffers(anc_tree)
}
