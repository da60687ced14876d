//! The external, out-of-scope tree-based drafter, modeled as a trait
//! so `Drafter` can delegate to it without depending on
//! its implementation.

use log::error;

use crate::buffers::{build_tree_buffers, TreeBuffers};
use crate::dynamic::DynamicSam;
use crate::state::Token;
use crate::state_id::StateID;

/// A tree-shaped draft: the token at each node plus its attention/position
/// buffers, ready to hand to a tree-aware decoding step.
pub struct TreeDraft {
    pub tree: Vec<Token>,
    pub anc_tree: Vec<i64>,
    pub buffers: TreeBuffers,
}

/// Collaborator interface for a tree-based drafter. The real implementation
/// (a neural model proposing multiple continuations per step) is out of
/// scope for this crate; only the shape of the interaction is modeled.
pub trait TreeModel {
    fn lookup(&mut self, start_token: Token) -> TreeDraft;
    fn update(&mut self, tokens: &[Token]);
    fn reset(&mut self);
}

/// A `TreeModel` backed by a SAM's own `gen_draft_tree`, so the crate is
/// exercisable standalone without a real neural tree drafter wired in.
pub struct SamTreeModel<S: StateID = u32> {
    sam: DynamicSam<S>,
    /// Set once `update` hits the configured `StateID` width and the arena
    /// can no longer grow; `lookup` then degrades to a single-node tree
    /// instead of querying a SAM that stopped indexing mid-stream.
    overflowed: bool,
}

impl<S: StateID> SamTreeModel<S> {
    pub fn new(alpha: f64, max_predicts: usize) -> Self {
        SamTreeModel {
            sam: DynamicSam::new(alpha, max_predicts),
            overflowed: false,
        }
    }

    pub fn from_sam(sam: DynamicSam<S>) -> Self {
        SamTreeModel {
            sam,
            overflowed: false,
        }
    }
}

impl<S: StateID> TreeModel for SamTreeModel<S> {
    fn lookup(&mut self, start_token: Token) -> TreeDraft {
        if self.overflowed {
            let anc_tree = vec![-1];
            let buffers = build_tree_buffers(&anc_tree);
            return TreeDraft {
                tree: vec![start_token],
                anc_tree,
                buffers,
            };
        }
        let (index, match_length) = self.sam.lookup(start_token);
        let (tree, anc_tree) = self.sam.gen_draft_tree(index, match_length, start_token);
        let buffers = build_tree_buffers(&anc_tree);
        TreeDraft {
            tree,
            anc_tree,
            buffers,
        }
    }

    fn update(&mut self, tokens: &[Token]) {
        if let Err(err) = self.sam.add_tokens(tokens) {
            error!(
                target: "sam_draft::tree_model",
                "update: arena exhausted indexing {} tokens, falling back to degenerate drafts: {}",
                tokens.len(),
                err
            );
            self.overflowed = true;
        }
    }

    fn reset(&mut self) {
        self.sam.reset();
        self.overflowed = false;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sam::DEFAULT_ALPHA;

    #[test]
    fn sam_tree_model_reflects_its_own_updates() {
        let mut model: SamTreeModel<u32> = SamTreeModel::new(DEFAULT_ALPHA, 10);
        model.update(&[1, 2, 3]);
        let draft = model.lookup(1);
        assert!(!draft.tree.is_empty());
        assert_eq!(draft.tree[0], 1);
        assert_eq!(draft.buffers.tree_position_ids.len(), draft.tree.len());
    }

    #[test]
    fn reset_drops_prior_indexing() {
        let mut model: SamTreeModel<u32> = SamTreeModel::new(DEFAULT_ALPHA, 10);
        model.update(&[1, 2, 3]);
        model.reset();
        let draft = model.lookup(9);
        assert_eq!(draft.tree, vec![9]);
    }

    #[test]
    fn update_past_state_id_width_does_not_panic() {
        // u8 caps the arena at 255 states; 260 distinct tokens produce one
        // new state per token (no repeats to trigger cloning) and so
        // exhaust it partway through.
        let mut model: SamTreeModel<u8> = SamTreeModel::new(DEFAULT_ALPHA, 10);
        let tokens: Vec<Token> = (0..260).collect();
        model.update(&tokens);

        let draft = model.lookup(7);
        assert_eq!(draft.tree, vec![7]);
        assert_eq!(draft.anc_tree, vec![-1]);

        // reset clears the overflow flag along with the arena.
        model.reset();
        model.update(&[1, 2, 3]);
        let draft = model.lookup(1);
        assert_eq!(draft.tree[0], 1);
    }
}
