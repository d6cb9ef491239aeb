//! Evaluation of parsed text queries against field values.
//!
//! Every function here expects the field value to be lower-cased already.
//! Block literals are compared as written, so an upper-case literal inside
//! quotes can never match.

use super::ast::{BlockPattern, MacroBlock, TextQuery};

/// Evaluates a query against a lower-cased field value.
pub fn apply_query(query: &TextQuery, value: &str) -> bool {
    match query {
        TextQuery::MatchAll => true,
        TextQuery::Plain(filter) => apply_plain(filter, value),
        TextQuery::Macro(blocks) => apply_macro(blocks, value),
    }
}

/// Case-insensitive containment of the whole filter string.
pub fn apply_plain(filter: &str, value: &str) -> bool {
    value.contains(&filter.to_lowercase())
}

/// Folds blocks strictly left to right, starting from `true`.
///
/// There is no precedence between `&` and `|`: `a|b&c` is
/// `((true & a) | b) & c`.
pub fn apply_macro(blocks: &[MacroBlock], value: &str) -> bool {
    blocks.iter().fold(true, |acc, block| {
        block.op.apply(acc, apply_macro_block(&block.text, value))
    })
}

/// Evaluates a single block.
pub fn apply_macro_block(text: &str, value: &str) -> bool {
    match BlockPattern::classify(text) {
        BlockPattern::Empty => false,
        BlockPattern::EmptyMarker => value.is_empty(),
        BlockPattern::Contains(needle) => value.contains(needle),
        BlockPattern::Exact(literal) => value == literal,
        BlockPattern::Substring(needle) => value.contains(needle),
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
