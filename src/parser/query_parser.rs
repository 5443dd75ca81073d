/// Character cursor over a raw query. The lexer drives it one char at a time
/// and slices token text back out of it by position.
#[derive(Debug, Default)]
pub struct QueryParser {
    pub position: usize,
    pub length: usize,
    pub text_v: Vec<char>,
}

impl QueryParser {
    pub fn new(query: &str) -> Self {
        let text_v: Vec<char> = query.chars().collect();
        Self {
            position: 0,
            length: text_v.len(),
            text_v,
        }
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    pub fn current(&self) -> char {
        if self.position < self.length {
            return self.text_v[self.position];
        }

        '\0'
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.text_v
            .get(self.position + ahead)
            .copied()
            .unwrap_or('\0')
    }

    pub fn next(&mut self) {
        if self.position < self.length {
            self.position += 1;
        }
    }

    pub fn next_non_whitespace(&mut self) {
        while !self.eof() && self.current().is_whitespace() {
            self.next();
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        let start = start.min(end);
        self.text_v[start..end].iter().collect()
    }

    pub fn text_from_pivot(&self, pivot: usize) -> String {
        self.text_from_range(pivot, self.position)
    }
}
