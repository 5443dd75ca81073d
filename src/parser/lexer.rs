use crate::parser::{ParseError, QueryParser, Token, TokenKind, WordComparer};

/// Splits a query into tokens. Whitespace and comments are dropped, string
/// literals and backquoted identifiers keep their quotes.
pub struct Lexer {
    parser: QueryParser,
}

impl Lexer {
    pub fn new(query: &str) -> Self {
        Self { parser: QueryParser::new(query) }
    }

    pub fn tokenize(query: &str) -> Result<Vec<Token>, ParseError> {
        let mut lexer = Self::new(query);
        let mut tokens = vec![];

        loop {
            lexer.skip_trivia()?;
            if lexer.parser.eof() {
                tokens.push(Token::eof(lexer.parser.position));
                return Ok(tokens);
            }
            tokens.push(lexer.next_token()?);
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            self.parser.next_non_whitespace();

            if self.parser.current() == '-' && self.parser.peek(1) == '-' {
                while !self.parser.eof() && !WordComparer::is_break_line(self.parser.current()) {
                    self.parser.next();
                }
            } else if self.parser.current() == '/' && self.parser.peek(1) == '*' {
                let pivot = self.parser.position;
                self.parser.jump(2);
                while !(self.parser.current() == '*' && self.parser.peek(1) == '/') {
                    if self.parser.eof() {
                        return ParseError::new("Unterminated comment", pivot, &self.parser).err();
                    }
                    self.parser.next();
                }
                self.parser.jump(2);
            } else {
                return Ok(());
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let current = self.parser.current();

        match current {
            '\'' | '"' => self.quoted(current, TokenKind::String),
            '`' => self.quoted(current, TokenKind::QuotedIdentifier),
            ch if ch.is_ascii_digit() => self.number(),
            '.' if self.parser.peek(1).is_ascii_digit() => self.number(),
            ch if WordComparer::is_word_start(ch) => Ok(self.word()),
            _ => self.symbol(),
        }
    }

    fn token(&self, kind: TokenKind, pivot: usize) -> Token {
        Token::new(kind, self.parser.text_from_pivot(pivot), pivot, self.parser.position)
    }

    fn quoted(&mut self, delimiter: char, kind: TokenKind) -> Result<Token, ParseError> {
        let pivot = self.parser.position;
        self.parser.next();

        loop {
            if self.parser.eof() {
                let message = match kind {
                    TokenKind::QuotedIdentifier => "Unterminated identifier",
                    _ => "Unterminated string",
                };
                return ParseError::new(message, pivot, &self.parser).err();
            }

            let current = self.parser.current();
            if current == '\\' && delimiter != '`' {
                self.parser.jump(2);
            } else if current == delimiter {
                if self.parser.peek(1) == delimiter {
                    self.parser.jump(2);
                } else {
                    self.parser.next();
                    return Ok(self.token(kind, pivot));
                }
            } else {
                self.parser.next();
            }
        }
    }

    fn number(&mut self) -> Result<Token, ParseError> {
        let pivot = self.parser.position;
        let mut kind = TokenKind::Integer;

        while self.parser.current().is_ascii_digit() {
            self.parser.next();
        }

        if self.parser.current() == '.' {
            kind = TokenKind::Decimal;
            self.parser.next();
            while self.parser.current().is_ascii_digit() {
                self.parser.next();
            }
        }

        if matches!(self.parser.current(), 'e' | 'E') {
            let sign = matches!(self.parser.peek(1), '+' | '-') as usize;
            if self.parser.peek(1 + sign).is_ascii_digit() {
                kind = TokenKind::Decimal;
                self.parser.jump(1 + sign);
                while self.parser.current().is_ascii_digit() {
                    self.parser.next();
                }
            }
        }

        if WordComparer::is_word_char(self.parser.current()) {
            return ParseError::new("Invalid number", pivot, &self.parser).err();
        }

        Ok(self.token(kind, pivot))
    }

    fn word(&mut self) -> Token {
        let pivot = self.parser.position;
        while WordComparer::is_word_char(self.parser.current()) {
            self.parser.next();
        }
        self.token(TokenKind::Word, pivot)
    }

    fn symbol(&mut self) -> Result<Token, ParseError> {
        let pivot = self.parser.position;
        let current = self.parser.current();
        let next = self.parser.peek(1);

        let (kind, width) = match (current, next) {
            ('<', '=') if self.parser.peek(2) == '>' => (TokenKind::NullSafeEq, 3),
            ('<', '=') => (TokenKind::Lte, 2),
            ('>', '=') => (TokenKind::Gte, 2),
            ('<', '>') | ('!', '=') => (TokenKind::NotEq, 2),
            ('=', '=') => (TokenKind::Eq, 2),
            ('=', _) => (TokenKind::Eq, 1),
            ('<', _) => (TokenKind::Lt, 1),
            ('>', _) => (TokenKind::Gt, 1),
            (',', _) => (TokenKind::Comma, 1),
            ('.', _) => (TokenKind::Dot, 1),
            (';', _) => (TokenKind::Semicolon, 1),
            ('(', _) => (TokenKind::LeftParen, 1),
            (')', _) => (TokenKind::RightParen, 1),
            ('[', _) => (TokenKind::LeftBracket, 1),
            (']', _) => (TokenKind::RightBracket, 1),
            ('*', _) => (TokenKind::Star, 1),
            ('+', _) => (TokenKind::Plus, 1),
            ('-', _) => (TokenKind::Minus, 1),
            ('/', _) => (TokenKind::Slash, 1),
            ('%', _) => (TokenKind::Percent, 1),
            _ => return ParseError::new("Invalid character", pivot, &self.parser).err(),
        };

        self.parser.jump(width);
        Ok(self.token(kind, pivot))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::*;

    fn kinds(query: &str) -> Vec<TokenKind> {
        Lexer::tokenize(query)
            .expect("Failed to tokenize")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    pub fn test_tokenize_select() {
        let tokens = Lexer::tokenize("SELECT a, count(*) FROM t").expect("Failed to tokenize");
        let texts: Vec<&str> = tokens.iter().map(|token| token.text.as_str()).collect();

        assert_eq!(texts, vec!["SELECT", "a", ",", "count", "(", "*", ")", "FROM", "t", ""]);
        assert_eq!(tokens[1].start, 7);
        assert_eq!(tokens[1].end, 8);
        assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::Eof));
    }

    #[test]
    pub fn test_tokenize_literals() {
        assert_eq!(
            kinds("'it''s' \"x\" `t` 12 3.5 .5 1e3"),
            vec![
                TokenKind::String,
                TokenKind::String,
                TokenKind::QuotedIdentifier,
                TokenKind::Integer,
                TokenKind::Decimal,
                TokenKind::Decimal,
                TokenKind::Decimal,
                TokenKind::Eof,
            ]
        );

        let tokens = Lexer::tokenize(r"'a\'b'").expect("Failed to tokenize");
        assert_eq!(tokens[0].text, r"'a\'b'");
    }

    #[test]
    pub fn test_tokenize_operators() {
        assert_eq!(
            kinds("a != b <> c <= d >= e <=> f = g"),
            vec![
                TokenKind::Word,
                TokenKind::NotEq,
                TokenKind::Word,
                TokenKind::NotEq,
                TokenKind::Word,
                TokenKind::Lte,
                TokenKind::Word,
                TokenKind::Gte,
                TokenKind::Word,
                TokenKind::NullSafeEq,
                TokenKind::Word,
                TokenKind::Eq,
                TokenKind::Word,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    pub fn test_tokenize_skips_comments() {
        assert_eq!(
            kinds("SELECT a -- trailing\n/* block */ FROM t"),
            vec![TokenKind::Word, TokenKind::Word, TokenKind::Word, TokenKind::Word, TokenKind::Eof]
        );
    }

    #[test]
    pub fn test_tokenize_errors() {
        let result = Lexer::tokenize("select_1 * from_1 where 1=1'");
        match result {
            Ok(_) => panic!("unterminated string must fail"),
            Err(err) => {
                assert_eq!(err.message, "Unterminated string");
                assert_eq!(err.start, 27);
            }
        }

        assert!(Lexer::tokenize("SELECT a FROM t WHERE b = #").is_err());
        assert!(Lexer::tokenize("SELECT 12abc").is_err());
        assert!(Lexer::tokenize("SELECT /* open").is_err());
    }
}
