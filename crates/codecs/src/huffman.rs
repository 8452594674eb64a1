//! Huffman coding of residual symbols
//!
//! The code table is built once per run from the residual distribution and
//! handed unchanged to both encoder and decoder; it is never transmitted.

use crate::{CodecError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Occurrence count per residual value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    counts: BTreeMap<i32, u64>,
}

impl FrequencyTable {
    /// Count every symbol of `symbols`
    pub fn from_symbols(symbols: &[i32]) -> Self {
        let mut counts = BTreeMap::new();
        for &symbol in symbols {
            *counts.entry(symbol).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, symbol: i32) -> u64 {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    /// Number of distinct symbols
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of counted symbols
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// `(symbol, count)` pairs in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (i32, u64)> + '_ {
        self.counts.iter().map(|(&symbol, &count)| (symbol, count))
    }
}

/// Result of decoding a bitstream against a [`CodeTable`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Symbols in stream order
    pub symbols: Vec<i32>,
    /// Trailing bits that never completed a codeword
    pub dropped_tail_bits: usize,
}

/// Prefix-free mapping between residual values and bit codewords
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    forward: HashMap<i32, Vec<u8>>,
    inverse: HashMap<Vec<u8>, i32>,
    max_code_len: usize,
}

impl CodeTable {
    /// Build a canonical Huffman code from `frequencies`
    pub fn build(frequencies: &FrequencyTable) -> Self {
        let lengths = code_lengths(frequencies);
        let codes = canonical_codes(lengths);

        let mut table = Self::default();
        for (symbol, bits) in codes {
            table.insert(symbol, bits);
        }

        tracing::debug!(
            "Built Huffman table: {} symbols, longest codeword {} bits",
            table.len(),
            table.max_code_len
        );
        table
    }

    fn insert(&mut self, symbol: i32, bits: Vec<u8>) {
        self.max_code_len = self.max_code_len.max(bits.len());
        self.inverse.insert(bits.clone(), symbol);
        self.forward.insert(symbol, bits);
    }

    /// Codeword of `symbol`
    pub fn codeword(&self, symbol: i32) -> Option<&[u8]> {
        self.forward.get(&symbol).map(Vec::as_slice)
    }

    /// Number of symbols in the table
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn max_code_len(&self) -> usize {
        self.max_code_len
    }

    /// Concatenate the codeword of every symbol, in order
    pub fn encode(&self, symbols: &[i32]) -> Result<Vec<u8>> {
        let mut bits = Vec::new();
        for &symbol in symbols {
            let code = self
                .codeword(symbol)
                .ok_or(CodecError::UnknownSymbol { symbol })?;
            bits.extend_from_slice(code);
        }
        Ok(bits)
    }

    /// Accumulate bits until they spell a codeword, emit its symbol and start
    /// over. A tail that never matches is dropped and counted.
    pub fn decode(&self, bits: &[u8]) -> DecodeOutcome {
        let mut outcome = DecodeOutcome::default();
        let mut accumulator: Vec<u8> = Vec::with_capacity(self.max_code_len);

        for (i, &bit) in bits.iter().enumerate() {
            accumulator.push(bit);

            if accumulator.len() > self.max_code_len {
                // Longer than every codeword: nothing after this can match
                outcome.dropped_tail_bits = accumulator.len() + (bits.len() - i - 1);
                accumulator.clear();
                break;
            }

            if let Some(&symbol) = self.inverse.get(&accumulator) {
                outcome.symbols.push(symbol);
                accumulator.clear();
            }
        }

        outcome.dropped_tail_bits += accumulator.len();
        if outcome.dropped_tail_bits > 0 {
            tracing::warn!(
                "Dropped {} undecodable trailing bits",
                outcome.dropped_tail_bits
            );
        }

        outcome
    }
}

/// Huffman code length of every symbol, by merging the two lightest nodes
fn code_lengths(frequencies: &FrequencyTable) -> Vec<(i32, usize)> {
    use std::cmp::Ordering;
    use std::collections::BinaryHeap;

    struct Node {
        symbol: Option<i32>,
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
    }

    struct HeapItem(u64, usize, Box<Node>); // (weight, tie-breaker, node)

    impl PartialEq for HeapItem {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0 && self.1 == other.1
        }
    }
    impl Eq for HeapItem {}
    impl Ord for HeapItem {
        fn cmp(&self, other: &Self) -> Ordering {
            // BinaryHeap is a max-heap; reverse for lightest-first
            other.0.cmp(&self.0).then_with(|| other.1.cmp(&self.1))
        }
    }
    impl PartialOrd for HeapItem {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    let mut heap = BinaryHeap::new();
    let mut counter = 0usize;
    for (symbol, weight) in frequencies.iter().filter(|&(_, w)| w > 0) {
        let leaf = Box::new(Node { symbol: Some(symbol), left: None, right: None });
        heap.push(HeapItem(weight, counter, leaf));
        counter += 1;
    }

    while heap.len() > 1 {
        let (Some(HeapItem(w1, _, n1)), Some(HeapItem(w2, _, n2))) = (heap.pop(), heap.pop()) else {
            break;
        };
        let merged = Box::new(Node { symbol: None, left: Some(n1), right: Some(n2) });
        heap.push(HeapItem(w1 + w2, counter, merged));
        counter += 1;
    }

    let mut lengths = Vec::with_capacity(frequencies.len());
    fn walk(node: &Node, depth: usize, out: &mut Vec<(i32, usize)>) {
        if let Some(symbol) = node.symbol {
            // A lone symbol still needs one bit
            out.push((symbol, depth.max(1)));
            return;
        }
        if let Some(ref left) = node.left {
            walk(left, depth + 1, out);
        }
        if let Some(ref right) = node.right {
            walk(right, depth + 1, out);
        }
    }
    if let Some(HeapItem(_, _, root)) = heap.pop() {
        walk(&root, 0, &mut lengths);
    }

    lengths
}

/// Canonical codewords from code lengths: sorted by `(length, symbol)`, each
/// code is the previous one plus one, left-shifted to the new length.
fn canonical_codes(mut lengths: Vec<(i32, usize)>) -> Vec<(i32, Vec<u8>)> {
    lengths.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut codes = Vec::with_capacity(lengths.len());
    let mut code: Vec<u8> = Vec::new();
    for (symbol, len) in lengths {
        code.resize(len, 0);
        codes.push((symbol, code.clone()));

        for bit in code.iter_mut().rev() {
            if *bit == 0 {
                *bit = 1;
                break;
            }
            *bit = 0;
        }
    }

    codes
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn table_for(symbols: &[i32]) -> CodeTable {
        CodeTable::build(&FrequencyTable::from_symbols(symbols))
    }

    fn is_prefix_free(table: &CodeTable) -> bool {
        let codes: Vec<&[u8]> = table.forward.values().map(Vec::as_slice).collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !b.starts_with(a))
        })
    }

    #[test]
    fn test_frequency_table_counts() {
        let frequencies = FrequencyTable::from_symbols(&[3, -1, 3, 0, 3, -1]);
        assert_eq!(frequencies.len(), 3);
        assert_eq!(frequencies.total(), 6);
        assert_eq!(frequencies.count(3), 3);
        assert_eq!(frequencies.count(-1), 2);
        assert_eq!(frequencies.count(7), 0);
        assert_eq!(frequencies.iter().map(|(s, _)| s).collect::<Vec<_>>(), vec![-1, 0, 3]);
    }

    #[test]
    fn test_frequent_symbols_get_shorter_codes() {
        let mut symbols = vec![0; 50];
        symbols.extend(vec![1; 20]);
        symbols.extend(vec![-1; 20]);
        symbols.extend(vec![5; 5]);
        symbols.extend(vec![-9; 5]);
        let table = table_for(&symbols);

        let len = |s| table.codeword(s).unwrap().len();
        assert_eq!(len(0), 1);
        assert!(len(1) <= len(5));
        assert!(len(-1) <= len(-9));
        assert!(is_prefix_free(&table));
    }

    #[test]
    fn test_canonical_codes_are_deterministic() {
        let table = table_for(&[1, 1, 2, 3]);
        assert_eq!(table.codeword(1), Some(&[0u8][..]));
        assert_eq!(table.codeword(2), Some(&[1u8, 0][..]));
        assert_eq!(table.codeword(3), Some(&[1u8, 1][..]));
        assert_eq!(table.max_code_len(), 2);
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let table = table_for(&[0; 16]);
        assert_eq!(table.codeword(0), Some(&[0u8][..]));

        let bits = table.encode(&[0; 16]).unwrap();
        assert_eq!(bits.len(), 16);
        assert_eq!(table.decode(&bits).symbols, vec![0; 16]);
    }

    #[test]
    fn test_empty_table() {
        let table = table_for(&[]);
        assert!(table.is_empty());
        assert_eq!(table.encode(&[]).unwrap(), Vec::<u8>::new());

        let outcome = table.decode(&[1, 0, 1]);
        assert!(outcome.symbols.is_empty());
        assert_eq!(outcome.dropped_tail_bits, 3);
    }

    #[test]
    fn test_encode_unknown_symbol() {
        let table = table_for(&[1, 2]);
        let err = table.encode(&[1, 4]).unwrap_err();
        assert!(matches!(err, CodecError::UnknownSymbol { symbol: 4 }));
    }

    #[test]
    fn test_decode_drops_incomplete_tail() {
        let table = table_for(&[1, 1, 2, 3]);
        let mut bits = table.encode(&[2, 1, 3]).unwrap();
        bits.push(1); // half of a two-bit codeword

        let outcome = table.decode(&bits);
        assert_eq!(outcome.symbols, vec![2, 1, 3]);
        assert_eq!(outcome.dropped_tail_bits, 1);
    }

    #[test]
    fn test_decode_stops_on_unmatchable_accumulator() {
        // single-symbol code "0": a 1 can never complete a codeword
        let table = table_for(&[7, 7]);
        let outcome = table.decode(&[0, 1, 0, 0, 0]);
        assert_eq!(outcome.symbols, vec![7]);
        assert_eq!(outcome.dropped_tail_bits, 4);
    }

    #[quickcheck]
    fn prop_round_trip(symbols: Vec<i16>) -> bool {
        let symbols: Vec<i32> = symbols.into_iter().map(i32::from).collect();
        let table = table_for(&symbols);
        let bits = table.encode(&symbols).unwrap();
        let outcome = table.decode(&bits);
        is_prefix_free(&table) && outcome.symbols == symbols && outcome.dropped_tail_bits == 0
    }
}
