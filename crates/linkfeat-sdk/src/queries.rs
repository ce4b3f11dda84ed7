//! Cypher statements issued by `RemoteClient`
//!
//! Values are always bound through `$parameters`; nothing user-provided is
//! ever spliced into the statement text.

/// Papers written by one author. Parameter: `$author_id`.
pub const AUTHOR_DOCUMENTS: &str = "MATCH (a:Author {id: $author_id})-[:writes]->(p:Paper) \
     RETURN a.id AS author, collect(p.filename) AS files";

/// Words shared by several papers of a community, ranked per community.
pub const COMMUNITY_TAGS: &str = "MATCH p=((p1:Paper)-[:includes]->(w:Word)) \
     WITH p1.community AS community, w, count(p) AS degree \
     WHERE degree > 1 \
     WITH community AS com, w.key AS word, w.pagerank AS pagerank, degree AS deg \
     ORDER BY com, deg DESC, pagerank DESC \
     RETURN com, collect([word, pagerank, deg]) AS tags";

/// Filenames of every community, largest first.
pub const COMMUNITY_DOCUMENTS: &str = "MATCH (p:Paper) WHERE p.community IS NOT NULL \
     RETURN p.community AS community, collect(p.filename) AS files, count(p.filename) AS file_count \
     ORDER BY file_count DESC, community";

/// Community of every paper.
pub const DOCUMENT_COMMUNITIES: &str = "MATCH (p:Paper) WHERE p.community IS NOT NULL \
     RETURN p.filename AS filename, p.community AS community";

/// Link-prediction scores for a batch of author pairs. Parameter: `$pairs`,
/// a list of `[node1, node2]`.
pub const LINK_FEATURES: &str = "UNWIND $pairs AS pair \
     MATCH (a:Author {id: pair[0]}), (b:Author {id: pair[1]}) \
     RETURN pair[0] AS node1, pair[1] AS node2, \
     gds.alpha.linkprediction.adamicAdar(a, b, {relationshipQuery: 'co_authors'}) AS adamic_adar, \
     gds.alpha.linkprediction.commonNeighbors(a, b, {relationshipQuery: 'co_authors'}) AS common_neighbors, \
     gds.alpha.linkprediction.preferentialAttachment(a, b, {relationshipQuery: 'co_authors'}) AS preferential_attachment, \
     gds.alpha.linkprediction.totalNeighbors(a, b, {relationshipQuery: 'co_authors'}) AS total_neighbors";

/// Liveness probe.
pub const PING: &str = "RETURN 1 AS ok";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_values_are_parameters() {
        assert!(AUTHOR_DOCUMENTS.contains("$author_id"));
        assert!(LINK_FEATURES.contains("UNWIND $pairs"));
        for q in [AUTHOR_DOCUMENTS, COMMUNITY_TAGS, COMMUNITY_DOCUMENTS, DOCUMENT_COMMUNITIES, LINK_FEATURES, PING] {
            assert!(!q.contains("{}"), "statement must not be a format template: {}", q);
        }
    }
}
