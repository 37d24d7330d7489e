// Copyright 2026 the patricia-trie authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Granularity at which a [`PatriciaTrie`](crate::PatriciaTrie) splits keys.
///
/// A discriminant maps a `(key, position)` pair to an ordinal, and the trie
/// branches by comparing that ordinal against a node's pivot. The two
/// provided strategies are [`Bits`] and [`Bytes`]; both are zero-sized
/// markers, so picking one costs nothing at runtime.
///
/// Implementations must be pure and must return `0` for every position at or
/// past the end of the key, i.e. keys are right-padded with infinite zero
/// bits. The trie relies on this to compare keys of different lengths at any
/// position.
pub trait Discriminant {
    /// Number of discriminant positions covering each key byte.
    const POSITIONS_PER_BYTE: usize;

    /// Ordinal of `key` at `pos`. Out-of-range positions read as `0`.
    fn extract(key: &[u8], pos: usize) -> u8;
}

/// Bit-level granularity.
///
/// Position `pos` addresses bit `7 - (pos % 8)` of byte `pos / 8`, i.e.
/// positions are 0-indexed from the most significant bit of the first byte.
/// Ordinals are `0` or `1`.
#[derive(Debug, Clone, Copy)]
pub enum Bits {}

impl Discriminant for Bits {
    const POSITIONS_PER_BYTE: usize = 8;

    fn extract(key: &[u8], pos: usize) -> u8 {
        let shift = 7 - (pos % 8);
        key.get(pos / 8).copied().map_or(0, |byte| (byte >> shift) & 1)
    }
}

/// Byte-level granularity.
///
/// Position `pos` addresses byte `pos` directly; the ordinal is the byte's
/// value. A missing byte reads as `0`, which orders a short key below any
/// longer key extending it.
#[derive(Debug, Clone, Copy)]
pub enum Bytes {}

impl Discriminant for Bytes {
    const POSITIONS_PER_BYTE: usize = 1;

    fn extract(key: &[u8], pos: usize) -> u8 {
        key.get(pos).copied().unwrap_or(0)
    }
}
