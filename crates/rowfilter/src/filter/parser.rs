//! Text filter parsing.

use super::ast::{TextQuery, EMPTY_MARKER};
use super::lexer::BlockScanner;

/// Parser for text filter strings.
///
/// Every input string is accepted. Strings without macro syntax become a
/// plain containment query; strings with macro syntax are split into blocks.
///
/// # Macro detection
///
/// A string is a macro expression if it contains `&`, `|`, the empty marker
/// `""`, or any quoted segment `"..."`.
///
/// # Example
///
/// ```
/// use rowfilter::filter::{MacroParser, TextQuery};
///
/// assert_eq!(MacroParser::parse("Smith"), TextQuery::Plain("Smith".to_string()));
/// assert!(MacroParser::parse("\"smith\" | \"*jones*\"").is_macro());
/// ```
pub struct MacroParser;

impl MacroParser {
    /// Parses a raw filter string.
    pub fn parse(input: &str) -> TextQuery {
        if input.is_empty() {
            return TextQuery::MatchAll;
        }

        if !Self::has_macro(input) {
            return TextQuery::Plain(input.to_string());
        }

        TextQuery::Macro(BlockScanner::new(input).scan())
    }

    /// Returns true if the input uses macro syntax.
    pub fn has_macro(input: &str) -> bool {
        BlockScanner::new(input).has_combinator()
            || input.contains(EMPTY_MARKER)
            || has_quoted_segment(input)
    }
}

/// Returns true if the input has an opening and a closing quote.
fn has_quoted_segment(input: &str) -> bool {
    input.chars().filter(|&c| c == '"').take(2).count() == 2
}
