// src/rag/chunker.rs

/// Separator priority for recursive splitting: paragraph breaks first, then
/// line breaks, sentence boundaries, spaces, and finally a raw character
/// split when nothing else keeps a piece under the target length.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " "];

/// A contiguous substring of the source text with a stable byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub offset: usize,
}

impl Chunk {
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Splits `text` into chunks of at most `target` bytes with roughly `overlap`
/// bytes shared between consecutive chunks.
///
/// Every chunk is an exact substring of `text`: concatenating the chunks with
/// the overlapping prefixes removed reconstructs the input without loss.
pub fn split_text(text: &str, target: usize, overlap: usize) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }
    if text.len() <= target {
        return vec![Chunk {
            text: text.to_string(),
            offset: 0,
        }];
    }

    let segments = split_into_segments(text, target, 0);

    // Byte offset of each segment within the source text.
    let mut offsets = Vec::with_capacity(segments.len());
    let mut pos = 0;
    for segment in &segments {
        offsets.push(pos);
        pos += segment.len();
    }

    let mut chunks = Vec::new();
    let mut i = 0;
    while i < segments.len() {
        // Greedily take whole segments up to the target length.
        let mut j = i;
        let mut len = 0;
        while j < segments.len() && len + segments[j].len() <= target {
            len += segments[j].len();
            j += 1;
        }
        if j == i {
            // Single segment at the limit; segments are never larger than
            // target by construction, but guard against zero progress.
            len = segments[i].len();
            j = i + 1;
        }

        let start = offsets[i];
        chunks.push(Chunk {
            text: text[start..start + len].to_string(),
            offset: start,
        });

        if j >= segments.len() {
            break;
        }

        // Back up over trailing segments worth at most `overlap` bytes so the
        // next chunk re-covers the boundary region.
        let mut k = j;
        let mut carried = 0;
        while k > i + 1 && carried + segments[k - 1].len() <= overlap {
            carried += segments[k - 1].len();
            k -= 1;
        }
        i = k;
    }

    chunks
}

/// Recursively splits text into segments no longer than `target`, preferring
/// the earliest separator in the priority list that gets a piece under the
/// limit. Separators stay attached to the preceding piece so segments
/// concatenate back to the input exactly.
fn split_into_segments<'a>(text: &'a str, target: usize, level: usize) -> Vec<&'a str> {
    if text.len() <= target {
        return vec![text];
    }
    if level >= SEPARATORS.len() {
        return hard_split(text, target);
    }

    let mut segments = Vec::new();
    for piece in text.split_inclusive(SEPARATORS[level]) {
        if piece.len() <= target {
            segments.push(piece);
        } else {
            segments.extend(split_into_segments(piece, target, level + 1));
        }
    }
    segments
}

/// Last-resort split at the target length, nudged back to a UTF-8 boundary.
fn hard_split(text: &str, target: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + target).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // A single character wider than the target; take it whole.
            end = (start + 1..=text.len())
                .find(|&i| text.is_char_boundary(i))
                .unwrap_or(text.len());
        }
        pieces.push(&text[start..end]);
        start = end;
    }
    pieces
}
