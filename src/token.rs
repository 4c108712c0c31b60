/// Token classes the call recognizer distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// Identifier or keyword, as written
    Word(&'a str),
    /// Runtime value of a string, no-substitution template or numeric
    /// literal; `None` when the value is not valid Unicode
    Literal(Option<String>),
    Plus,
    OpenParen,
    /// Any other punctuator, template part, regex or JSX token
    Other,
}

/// A token with the 1-based line of its first character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub line: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, line: usize) -> Self {
        Self { kind, line }
    }

    pub fn word(text: &'a str, line: usize) -> Self {
        Self::new(TokenKind::Word(text), line)
    }

    pub fn literal(value: impl Into<String>, line: usize) -> Self {
        Self::new(TokenKind::Literal(Some(value.into())), line)
    }
}
