//! Shared `quickcheck` fixtures for the property tests colocated in each
//! module. Not part of the public API; only compiled under `#[cfg(test)]`.

use quickcheck::{Arbitrary, Gen};

use crate::state::Token;

/// A token stream bounded in both length and alphabet size, so generated
/// cases stay within a tractable suffix length during property testing.
#[derive(Clone, Debug)]
pub(crate) struct SmallTokenStream(pub(crate) Vec<Token>);

const MAX_LEN: usize = 24;
const ALPHABET: i64 = 5;

impl Arbitrary for SmallTokenStream {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % (MAX_LEN + 1);
        let tokens = (0..len)
            .map(|_| i64::arbitrary(g).rem_euclid(ALPHABET))
            .collect();
        SmallTokenStream(tokens)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(SmallTokenStream))
    }
}
