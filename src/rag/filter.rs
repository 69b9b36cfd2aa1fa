//! Keyword pre-filter
//!
//! Narrows the knowledge cache to chunks mentioning a query keyword before
//! any similarity math runs.

use crate::types::KnowledgeChunk;

/// Tokens that carry no retrieval signal for this knowledge base
pub const STOP_WORDS: &[&str] = &["what", "tell", "about", "earth", "earth2"];

/// Tokens of this length or shorter are dropped
pub const MIN_KEYWORD_LEN: usize = 3;

/// Lowercased, deduplicated query keywords in first-seen order
pub fn extract_keywords(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for token in lowered.split(|c: char| !c.is_alphanumeric()) {
        if token.chars().count() <= MIN_KEYWORD_LEN || STOP_WORDS.contains(&token) {
            continue;
        }
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }

    keywords
}

/// Keep chunks whose content or file name contains any keyword.
///
/// With no keywords every chunk is a candidate. An empty result is final:
/// the caller does not fall back to scanning the full cache.
pub fn filter_candidates<'a>(
    keywords: &[String],
    chunks: &'a [KnowledgeChunk],
) -> Vec<&'a KnowledgeChunk> {
    if keywords.is_empty() {
        return chunks.iter().collect();
    }

    chunks
        .iter()
        .filter(|chunk| {
            let content = chunk.content.to_lowercase();
            let file_name = chunk.file_name.to_lowercase();
            keywords
                .iter()
                .any(|k| content.contains(k.as_str()) || file_name.contains(k.as_str()))
        })
        .collect()
}

/// True when the lowercased file name mentions any keyword
pub fn file_name_matches(keywords: &[String], file_name: &str) -> bool {
    let lowered = file_name.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k.as_str()))
}
