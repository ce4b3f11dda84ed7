//! Community-tag vocabularies
//!
//! Each community of similar papers comes with its tags already ranked by
//! (co-occurrence degree desc, importance score desc). Selection takes a
//! strict prefix of every ranking and unions the results.

use super::vocabulary::Vocabulary;
use std::collections::{BTreeMap, HashSet};

/// Community identifier assigned by the external clustering step
pub type CommunityId = i64;

/// How many ranked tags to keep per community
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopTerms {
    /// Keep the first `k` tags of each community
    Limit(usize),
    /// Keep every tag
    All,
}

impl From<Option<usize>> for TopTerms {
    fn from(value: Option<usize>) -> Self {
        value.map_or(TopTerms::All, TopTerms::Limit)
    }
}

/// Per-community tag sets and their union
#[derive(Debug, Clone, Default)]
pub struct CommunityVocabulary {
    /// Map of community -> selected tags
    pub per_community: BTreeMap<CommunityId, HashSet<String>>,
    /// Union of all selected tags, used as the scoring vocabulary
    pub union: Vocabulary,
}

/// Truncate every community's ranked tags to `top_terms` and union them.
///
/// The input rankings are trusted as-is; nothing is re-sorted here.
pub fn select_community_vocabulary(
    ranked_terms: &BTreeMap<CommunityId, Vec<String>>,
    top_terms: TopTerms,
) -> CommunityVocabulary {
    let mut result = CommunityVocabulary::default();

    for (&community, terms) in ranked_terms {
        let keep = match top_terms {
            TopTerms::Limit(k) => k.min(terms.len()),
            TopTerms::All => terms.len(),
        };
        let selected: HashSet<String> = terms[..keep].iter().cloned().collect();
        result.union.extend(selected.iter().cloned());
        result.per_community.insert(community, selected);
    }

    result
}
