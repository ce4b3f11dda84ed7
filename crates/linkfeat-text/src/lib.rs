pub mod vocabulary;
pub mod tokenize;
pub mod tfidf;
pub mod community;
pub mod similarity;

pub use vocabulary::{Vocabulary, VocabularyError, VocabularyResult};
pub use tokenize::{whitespace_tokens, Tokenizer, TokenizerConfig};
pub use tfidf::{rank_tfidf_terms, select_tfidf_vocabulary, TermRanking, TermScore, TfidfConfig};
pub use community::{select_community_vocabulary, CommunityId, CommunityVocabulary, TopTerms};
pub use similarity::jaccard_similarity;
