use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Words that end an expression and therefore can never be read as a bare
/// column name or an implicit alias.
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ALL", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CROSS", "DESC", "DISTINCT",
        "ELSE", "END", "EXCEPT", "FALSE", "FROM", "FULL", "GROUP", "HAVING", "IN", "INNER",
        "INTERSECT", "IS", "JOIN", "LIKE", "LIMIT", "MATCH", "MATCH_ALL", "MATCH_ANY",
        "MATCH_PHRASE", "MATCH_PHRASE_EDGE", "MATCH_PHRASE_PREFIX", "MATCH_REGEXP", "NOT",
        "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER", "REGEXP", "RLIKE", "SELECT", "THEN",
        "TRUE", "UNION", "USING", "WHEN", "WHERE", "WINDOW", "WITH",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    QuotedIdentifier,
    String,
    Integer,
    Decimal,
    Comma,
    Dot,
    Semicolon,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Star,
    Plus,
    Minus,
    Slash,
    Percent,
    Eq,
    NullSafeEq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Eof,
}

impl TokenKind {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::NullSafeEq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Lte
                | TokenKind::Gt
                | TokenKind::Gte
        )
    }

    pub fn is_number(&self) -> bool {
        matches!(self, TokenKind::Integer | TokenKind::Decimal)
    }

    /// Names, keywords and literals; two of them in a row need a space.
    pub fn is_wordlike(&self) -> bool {
        matches!(
            self,
            TokenKind::Word | TokenKind::QuotedIdentifier | TokenKind::String | TokenKind::Integer | TokenKind::Decimal
        )
    }
}

/// A lexed token. `start` and `end` are char offsets into the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: String, start: usize, end: usize) -> Self {
        Self { kind, text, start, end }
    }

    pub fn eof(position: usize) -> Self {
        Self::new(TokenKind::Eof, String::new(), position, position)
    }

    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_reserved(&self) -> bool {
        self.kind == TokenKind::Word
            && RESERVED_WORDS.contains(self.text.to_ascii_uppercase().as_str())
    }

    /// Plain or backquoted name that may stand for a column, table or alias.
    pub fn is_identifier(&self) -> bool {
        match self.kind {
            TokenKind::Word => !self.is_reserved(),
            TokenKind::QuotedIdentifier => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::*;

    #[test]
    pub fn test_reserved_words_are_case_insensitive() {
        let token = Token::new(TokenKind::Word, "from".into(), 0, 4);
        assert!(token.is_reserved());
        assert!(!token.is_identifier());
        assert!(token.is_word("FROM"));

        let column = Token::new(TokenKind::Word, "log_count".into(), 0, 9);
        assert!(column.is_identifier());
    }

    #[test]
    pub fn test_quoted_identifier_is_never_reserved() {
        let token = Token::new(TokenKind::QuotedIdentifier, "`table`".into(), 0, 7);
        assert!(!token.is_reserved());
        assert!(token.is_identifier());
    }
}
