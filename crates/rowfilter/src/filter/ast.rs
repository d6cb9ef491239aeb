//! Parsed representation of text filter expressions.

/// How a block combines with the result accumulated so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombineOp {
    /// `&` - the block must also match.
    And,
    /// `|` - the block may match instead.
    Or,
}

impl CombineOp {
    /// Maps a combinator character to its operator.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '&' => Some(CombineOp::And),
            '|' => Some(CombineOp::Or),
            _ => None,
        }
    }

    /// Returns the combinator character for this operator.
    pub fn as_char(self) -> char {
        match self {
            CombineOp::And => '&',
            CombineOp::Or => '|',
        }
    }

    /// Folds `block` into the running `acc`.
    pub fn apply(self, acc: bool, block: bool) -> bool {
        match self {
            CombineOp::And => acc && block,
            CombineOp::Or => acc || block,
        }
    }
}

/// One block of a macro expression together with the operator that joins it
/// to everything to its left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroBlock {
    /// The operator applied when folding this block.
    pub op: CombineOp,
    /// The block text, trimmed of surrounding whitespace.
    pub text: String,
}

impl MacroBlock {
    /// Creates a new block.
    pub fn new(op: CombineOp, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }

    /// Classifies the block text.
    pub fn pattern(&self) -> BlockPattern<'_> {
        BlockPattern::classify(&self.text)
    }
}

/// The literal that marks "value must be exactly empty".
pub const EMPTY_MARKER: &str = "\"\"";

/// What a single block asks of the field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPattern<'a> {
    /// An empty block. Never matches.
    Empty,
    /// `""` - matches only the empty value.
    EmptyMarker,
    /// `"*X*"` - the value contains `X`.
    Contains(&'a str),
    /// `"X"` - the value is exactly `X`.
    Exact(&'a str),
    /// Anything else - the value contains the raw block text.
    Substring(&'a str),
}

impl<'a> BlockPattern<'a> {
    /// Classifies block text. The literal inside quotes is kept as written.
    pub fn classify(text: &'a str) -> Self {
        if text.is_empty() {
            return BlockPattern::Empty;
        }
        if text == EMPTY_MARKER {
            return BlockPattern::EmptyMarker;
        }

        if let Some(inner) = text
            .strip_prefix("\"*")
            .and_then(|rest| rest.strip_suffix("*\""))
        {
            return BlockPattern::Contains(inner);
        }

        if let Some(inner) = text
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            return BlockPattern::Exact(inner);
        }

        BlockPattern::Substring(text)
    }
}

/// The parse result of a text filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextQuery {
    /// The filter matches everything.
    MatchAll,
    /// No macro syntax: case-insensitive containment of the whole string.
    Plain(String),
    /// Macro syntax: blocks folded left to right.
    Macro(Vec<MacroBlock>),
}

impl TextQuery {
    /// Returns the macro blocks, or an empty slice for non-macro queries.
    pub fn blocks(&self) -> &[MacroBlock] {
        match self {
            TextQuery::Macro(blocks) => blocks,
            _ => &[],
        }
    }

    /// Returns true if this query uses macro syntax.
    pub fn is_macro(&self) -> bool {
        matches!(self, TextQuery::Macro(_))
    }
}
