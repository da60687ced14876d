/// Errors produced by the suffix-automaton core.
///
/// Per the crate's error-handling design, every other operation is total:
/// `SamError` only ever surfaces from arena growth (capacity exhausted
/// under the configured `StateID` width) or from misusing a frozen
/// static automaton.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SamError {
    #[error(
        "state arena exhausted: cannot represent more than {max} states with the configured StateID width"
    )]
    StateIdOverflow { max: usize },

    #[error("static automaton cannot be extended with add_tokens once built; use transfer_tokens")]
    StaticMutationAfterBuild,
}
