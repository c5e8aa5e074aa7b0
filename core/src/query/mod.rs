//! Query evaluators. Each one is a pure read over built [`Indexes`](crate::index::Indexes).

pub mod biword;
pub mod boolean;
pub mod phonetic;
pub mod proximity;

use crate::index::DocId;
use std::collections::BTreeSet;

pub use biword::evaluate_biword;
pub use boolean::evaluate_boolean;
pub use phonetic::{evaluate_phonetic, PhoneticMatch};
pub use proximity::{evaluate_proximity, ProximityHits};

pub type DocSet = BTreeSet<DocId>;

pub fn intersect(a: &DocSet, b: &DocSet) -> DocSet {
    a.intersection(b).cloned().collect()
}

pub fn union(a: &DocSet, b: &DocSet) -> DocSet {
    a.union(b).cloned().collect()
}

pub(crate) fn is_keyword(token: &str) -> bool {
    token.eq_ignore_ascii_case("and") || token.eq_ignore_ascii_case("or") || token.eq_ignore_ascii_case("not")
}
