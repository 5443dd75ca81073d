use crate::parser::{TokenKind, TreeParser};

/// Matches a keyword, possibly spanning several words (`GROUP BY`,
/// `IS NOT NULL`), against the token stream at the parser position.
#[derive(Debug, Default)]
pub struct WordComparer {
    pub length: usize,
    pub words: Vec<String>,
    delimiter: Option<TokenKind>,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        let words: Vec<String> = word.split_whitespace().map(str::to_uppercase).collect();
        Self {
            length: words.len(),
            words,
            delimiter: None,
        }
    }

    pub fn is_break_line(ch: char) -> bool {
        ch == '\r' || ch == '\n'
    }

    pub fn is_word_start(ch: char) -> bool {
        ch == '_' || ch == '@' || ch.is_alphabetic()
    }

    pub fn is_word_char(ch: char) -> bool {
        ch == '_' || ch == '$' || ch == '@' || ch.is_alphanumeric()
    }

    pub fn compare(&self, parser: &TreeParser) -> bool {
        self.compare_at(parser, 0)
    }

    pub fn compare_at(&self, parser: &TreeParser, offset: usize) -> bool {
        for (index, word) in self.words.iter().enumerate() {
            if !parser.peek(offset + index).is_word(word) {
                return false;
            }
        }

        match self.delimiter {
            Some(delimiter) => parser.peek(offset + self.length).kind == delimiter,
            None => true,
        }
    }

    /// Source text of the matched words, single-spaced, case preserved.
    pub fn matched_text(&self, parser: &TreeParser, offset: usize) -> String {
        (0..self.length)
            .map(|index| parser.peek(offset + index).text.as_str())
            .collect::<Vec<&str>>()
            .join(" ")
    }

    pub fn with_delimiter(mut self, delimiter: TokenKind) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::*;

    #[test]
    pub fn test_compare_multiword() {
        let parser = TreeParser::new("select a group   by a").expect("Failed to tokenize");
        let group_by = WordComparer::new("GROUP BY");

        assert!(!group_by.compare(&parser));
        assert!(group_by.compare_at(&parser, 2));
        assert_eq!(group_by.matched_text(&parser, 2), "group by");
    }

    #[test]
    pub fn test_compare_with_delimiter() {
        let parser = TreeParser::new("cast(a AS TEXT) cast").expect("Failed to tokenize");
        let cast = WordComparer::new("CAST").with_delimiter(TokenKind::LeftParen);

        assert!(cast.compare(&parser));
        assert!(!cast.compare_at(&parser, 6));
    }
}
