//! Incremental suffix-automaton engine for speculative-decoding draft
//! generation.
//!
//! A [`DynamicSam`] indexes the tokens produced so far in the current
//! generation; a [`StaticSam`] indexes a corpus built once ahead of time.
//! [`Drafter`] fuses both, falling back to an external [`TreeModel`] when
//! neither match is long enough to warrant a linear continuation.

mod buffers;
mod draft;
mod drafter;
mod dynamic;
mod error;
mod navigator;
mod sam;
mod state;
mod state_id;
mod static_sam;
#[cfg(test)]
mod test_support;
mod tree_model;

pub use buffers::{SeqBuffers, TreeBuffers};
pub use drafter::{CandidateKind, DraftPayload, Drafter, DrafterConfig, SequenceDraft, UpdateContext};
pub use dynamic::DynamicSam;
pub use error::SamError;
pub use sam::DEFAULT_ALPHA;
pub use state::Token;
pub use state_id::StateID;
pub use static_sam::StaticSam;
pub use tree_model::{SamTreeModel, TreeDraft, TreeModel};
