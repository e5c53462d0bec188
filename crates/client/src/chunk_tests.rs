// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the chunking module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    fits_exactly = { 1024, 1024, 1 },
    one_over = { 1025, 1024, 2 },
    five_kb = { 5 * 1024, 1024, 5 },
    five_kb_plus_one = { 5 * 1024 + 1, 1024, 6 },
    tiny_bound = { 10, 3, 4 },
)]
fn split_ascii_count(len: usize, max_bytes: usize, expected: usize) {
    let text = "x".repeat(len);
    let slices = split(&text, max_bytes);
    assert_eq!(slices.len(), expected);
}

#[test]
fn test_split_reassembles_exactly() {
    let text = "abcdefghij".repeat(517);
    let slices = split(&text, 1024);

    let rebuilt: String = slices.concat();
    assert_eq!(rebuilt, text);

    // Every slice except the last is full
    for slice in &slices[..slices.len() - 1] {
        assert_eq!(slice.len(), 1024);
    }
}

#[test]
fn test_split_respects_char_boundaries() {
    // Three-byte characters that never align with the bound
    let text = "€".repeat(2000);
    let slices = split(&text, 1024);

    let rebuilt: String = slices.concat();
    assert_eq!(rebuilt, text);
    for slice in &slices {
        assert!(slice.len() <= 1024);
        assert!(!slice.is_empty());
    }
}

#[test]
fn test_split_bound_smaller_than_char() {
    // A slice always holds at least one character, and the forced cut that
    // consumes the final character must not leave an empty trailing slice
    let text = "€€€";
    let slices = split(text, 1);
    assert_eq!(slices.len(), 3);
    assert_eq!(slices.concat(), text);
    for slice in &slices {
        assert!(!slice.is_empty());
    }
}

#[test]
fn test_split_forced_cut_ending_the_string() {
    // Every cut is forced over the bound and the last one drains the input
    let slices = split("€€", 2);
    assert_eq!(slices, vec!["€", "€"]);
}

#[test]
fn test_split_empty_input_is_one_empty_slice() {
    assert_eq!(split("", 1024), vec![""]);
}

#[test]
fn test_envelopes_share_one_chunk_id() {
    let text = "y".repeat(5 * 1024);
    let envelopes = envelopes(&text, 1024);

    assert_eq!(envelopes.len(), 5);
    let chunk_id = &envelopes[0].chunk_id;
    for (index, envelope) in envelopes.iter().enumerate() {
        assert_eq!(&envelope.chunk_id, chunk_id);
        assert_eq!(envelope.index, index);
        assert_eq!(envelope.nb_chunks, 5);
    }
}

#[test]
fn test_fresh_chunk_id_per_send() {
    let text = "z".repeat(3000);
    let first = envelopes(&text, 1024);
    let second = envelopes(&text, 1024);
    assert_ne!(first[0].chunk_id, second[0].chunk_id);
}

#[test]
fn test_envelope_wire_format() {
    let envelope = ChunkEnvelope {
        chunk: "abc".to_string(),
        index: 2,
        chunk_id: "id-1".to_string(),
        nb_chunks: 4,
    };

    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "chunk": "abc",
            "index": 2,
            "chunkId": "id-1",
            "nbChunks": 4,
        })
    );
}
