// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Chunking for oversized payloads.
//!
//! When the serialized (post-cipher) payload exceeds the configured bound,
//! it is split into slices and each slice travels as its own frame wrapped
//! in a [`ChunkEnvelope`]. Reassembly is the receiver's responsibility; only
//! the slicing contract lives here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire wrapper for one slice of a chunked payload.
///
/// Serialized as `{"chunk", "index", "chunkId", "nbChunks"}`, one object per
/// transmitted frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkEnvelope {
    /// The slice itself.
    pub chunk: String,
    /// 0-based position within the group.
    pub index: usize,
    /// Identifier shared by every slice of one logical payload.
    #[serde(rename = "chunkId")]
    pub chunk_id: String,
    /// Total number of slices in the group.
    #[serde(rename = "nbChunks")]
    pub nb_chunks: usize,
}

/// Split `text` into slices of at most `max_bytes` bytes.
///
/// Slices always fall on UTF-8 character boundaries, so text with multi-byte
/// characters may yield more slices than `ceil(len / max_bytes)`. A slice
/// always holds at least one character, even when a single character exceeds
/// the bound.
pub fn split(text: &str, max_bytes: usize) -> Vec<&str> {
    let mut slices = Vec::new();
    let mut rest = text;

    while rest.len() > max_bytes {
        let mut cut = max_bytes.max(1);
        while cut > 0 && !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            cut = rest
                .chars()
                .next()
                .map(|c| c.len_utf8())
                .unwrap_or(rest.len());
        }
        let (head, tail) = rest.split_at(cut);
        slices.push(head);
        rest = tail;
    }

    // A forced over-bound cut can consume the whole remainder; never emit a
    // trailing empty slice for it
    if !rest.is_empty() || slices.is_empty() {
        slices.push(rest);
    }
    slices
}

/// Wrap `text` into envelopes sharing a freshly generated chunk-group id.
pub fn envelopes(text: &str, max_bytes: usize) -> Vec<ChunkEnvelope> {
    let chunk_id = Uuid::new_v4().to_string();
    let slices = split(text, max_bytes);
    let nb_chunks = slices.len();

    slices
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| ChunkEnvelope {
            chunk: chunk.to_string(),
            index,
            chunk_id: chunk_id.clone(),
            nb_chunks,
        })
        .collect()
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
