//! Combinator scanner for macro expressions.
//!
//! The scan is a plain left-to-right character walk. It does not track
//! quotes, so a `&` or `|` inside a quoted literal still ends the block.

use super::ast::{CombineOp, MacroBlock};

/// Splits macro expressions into blocks at `&` and `|`.
pub struct BlockScanner<'a> {
    input: &'a str,
}

impl<'a> BlockScanner<'a> {
    /// Creates a scanner over the given input.
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Returns true if the input contains any combinator character.
    pub fn has_combinator(&self) -> bool {
        self.input.contains(['&', '|'])
    }

    /// Scans the input into blocks.
    ///
    /// A leading combinator is consumed and becomes the operator of the first
    /// block; otherwise the first block is an AND block. Every later
    /// combinator closes the current block and tags the next one.
    pub fn scan(&self) -> Vec<MacroBlock> {
        if !self.has_combinator() {
            return vec![MacroBlock::new(CombineOp::And, self.input.trim())];
        }

        let mut chars = self.input.char_indices().peekable();
        let mut pending = CombineOp::And;
        let mut start = 0;

        if let Some(&(_, first)) = chars.peek() {
            if let Some(op) = CombineOp::from_char(first) {
                pending = op;
                start = first.len_utf8();
                chars.next();
            }
        }

        let mut blocks = Vec::new();
        for (i, c) in chars {
            if let Some(op) = CombineOp::from_char(c) {
                blocks.push(MacroBlock::new(pending, self.input[start..i].trim()));
                pending = op;
                start = i + c.len_utf8();
            }
        }
        blocks.push(MacroBlock::new(pending, self.input[start..].trim()));

        blocks
    }
}
