// src/rag/index.rs
use std::cmp::Ordering;

use crate::extractors::text::MIN_TEXT_LEN;
use crate::rag::chunker::{split_text, Chunk};
use crate::rag::embedding::{cosine_similarity, TermHashEmbedder, EMBEDDING_DIM};
use crate::rag::{CHUNK_OVERLAP, CHUNK_SIZE};
use crate::utils::error::ExtractError;

/// Ephemeral similarity index over one filing's chunks. Built per filing,
/// queried once, then dropped; nothing persists across filings.
pub struct ChunkIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    embedder: TermHashEmbedder,
}

impl ChunkIndex {
    /// Splits and embeds `text`. Refuses input below the minimum content
    /// threshold instead of building a degenerate index.
    pub fn build(text: &str) -> Result<Self, ExtractError> {
        if text.len() < MIN_TEXT_LEN {
            return Err(ExtractError::InsufficientContent {
                len: text.len(),
                min: MIN_TEXT_LEN,
            });
        }

        let chunks = split_text(text, CHUNK_SIZE, CHUNK_OVERLAP);
        let embedder = TermHashEmbedder::new(EMBEDDING_DIM);
        let embeddings = chunks.iter().map(|c| embedder.embed(&c.text)).collect();

        tracing::info!("Built chunk index with {} chunks", chunks.len());

        Ok(Self {
            chunks,
            embeddings,
            embedder,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns up to `k` chunks by descending cosine similarity to `query`.
    /// The sort is stable, so equal scores keep original chunk order.
    pub fn retrieve(&self, query: &str, k: usize) -> Vec<&Chunk> {
        self.retrieve_scored(query, k)
            .into_iter()
            .map(|(chunk, _)| chunk)
            .collect()
    }

    /// Same as [`retrieve`](Self::retrieve) but keeps the similarity scores.
    pub fn retrieve_scored(&self, query: &str, k: usize) -> Vec<(&Chunk, f32)> {
        let query_embedding = self.embedder.embed(query);

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(e, &query_embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(i, score)| (&self.chunks[i], score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::METRICS_QUERY;

    fn long_filing_text() -> String {
        let mut text = String::new();
        // Production discussion, ~5k characters.
        for _ in 0..60 {
            text.push_str(
                "Oil production was 148.4 MBbl/d in Q2 2025 and natural gas production \
                 averaged 3021.1 MMcf/d for the period.\n\n",
            );
        }
        // Unrelated legal discussion, ~5k characters.
        for _ in 0..60 {
            text.push_str(
                "The registrant is party to various legal proceedings arising in the \
                 ordinary course of business, none expected to be material.\n\n",
            );
        }
        text
    }

    #[test]
    fn test_build_rejects_short_text() {
        let result = ChunkIndex::build("way too short");
        assert!(matches!(
            result,
            Err(ExtractError::InsufficientContent { .. })
        ));
    }

    #[test]
    fn test_retrieve_returns_at_most_k() {
        let text = long_filing_text();
        let index = ChunkIndex::build(&text).unwrap();
        assert!(index.len() > 1);
        assert_eq!(index.retrieve(METRICS_QUERY, 1).len(), 1);
        assert!(index.retrieve(METRICS_QUERY, 100).len() <= index.len());
    }

    #[test]
    fn test_retrieved_chunks_come_from_the_index() {
        let text = long_filing_text();
        let index = ChunkIndex::build(&text).unwrap();
        for chunk in index.retrieve(METRICS_QUERY, 5) {
            assert_eq!(&text[chunk.offset..chunk.end()], chunk.text);
        }
    }

    #[test]
    fn test_scores_are_non_increasing() {
        let text = long_filing_text();
        let index = ChunkIndex::build(&text).unwrap();
        let scored = index.retrieve_scored(METRICS_QUERY, 25);
        for pair in scored.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_production_chunk_outranks_legal_chunk() {
        let text = long_filing_text();
        let index = ChunkIndex::build(&text).unwrap();

        let top = index.retrieve(METRICS_QUERY, 1);
        assert!(
            top[0].text.contains("148.4 MBbl/d"),
            "top chunk was not the production chunk: {}",
            &top[0].text[..top[0].text.len().min(120)]
        );
    }

    #[test]
    fn test_identical_input_retrieves_identically() {
        let text = long_filing_text();
        let a = ChunkIndex::build(&text).unwrap();
        let b = ChunkIndex::build(&text).unwrap();

        let ra: Vec<String> = a
            .retrieve(METRICS_QUERY, 5)
            .iter()
            .map(|c| c.text.clone())
            .collect();
        let rb: Vec<String> = b
            .retrieve(METRICS_QUERY, 5)
            .iter()
            .map(|c| c.text.clone())
            .collect();
        assert_eq!(ra, rb);
    }
}
