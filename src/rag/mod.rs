// src/rag/mod.rs
pub mod chunker;
pub mod embedding;
pub mod index;

pub use chunker::Chunk;
pub use index::ChunkIndex;

/// Target chunk length in characters.
pub const CHUNK_SIZE: usize = 8000;

/// Overlap carried between consecutive chunks so no metric-bearing sentence
/// is split across a retrieval boundary without a neighbor that contains it.
pub const CHUNK_OVERLAP: usize = 1500;

/// Number of chunks retrieved for the extraction prompt.
pub const RETRIEVAL_K: usize = 25;

/// The one retrieval query used for every filing. Names the metric families
/// so term overlap pulls in the disclosure sections that carry them.
pub const METRICS_QUERY: &str = "Oil gas and NGL production volumes and daily rates, \
    drilling rigs and wells drilled completed and turned in line, revenue by product, \
    realized prices per barrel and per mcf, operating costs and capital expenditures \
    per BOE, and basin level production breakdowns for this filing";
