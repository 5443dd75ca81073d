use crate::parser::{TokenKind, WordComparer};

#[derive(Debug)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub distinct: WordComparer,
    pub all: WordComparer,
    pub alias: WordComparer,
    pub from: WordComparer,
    pub r#where: WordComparer,
    pub group_by: WordComparer,
    pub order_by: WordComparer,
    pub asc: WordComparer,
    pub desc: WordComparer,
    pub limit: WordComparer,
    pub offset: WordComparer,
    pub and: WordComparer,
    pub or: WordComparer,
    pub not: WordComparer,
    pub is_null: WordComparer,
    pub is_not_null: WordComparer,
    pub r#in: WordComparer,
    pub between: WordComparer,
    pub cast: WordComparer,
    pub b_true: WordComparer,
    pub b_false: WordComparer,
    pub null: WordComparer,
    /// `LIKE`-style predicates taking a single pattern operand.
    pub patterns: Vec<WordComparer>,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::new("SELECT"),
            distinct: WordComparer::new("DISTINCT"),
            all: WordComparer::new("ALL"),
            alias: WordComparer::new("AS"),
            from: WordComparer::new("FROM"),
            r#where: WordComparer::new("WHERE"),
            group_by: WordComparer::new("GROUP BY"),
            order_by: WordComparer::new("ORDER BY"),
            asc: WordComparer::new("ASC"),
            desc: WordComparer::new("DESC"),
            limit: WordComparer::new("LIMIT"),
            offset: WordComparer::new("OFFSET"),
            and: WordComparer::new("AND"),
            or: WordComparer::new("OR"),
            not: WordComparer::new("NOT"),
            is_null: WordComparer::new("IS NULL"),
            is_not_null: WordComparer::new("IS NOT NULL"),
            r#in: WordComparer::new("IN").with_delimiter(TokenKind::LeftParen),
            between: WordComparer::new("BETWEEN"),
            cast: WordComparer::new("CAST").with_delimiter(TokenKind::LeftParen),
            b_true: WordComparer::new("TRUE"),
            b_false: WordComparer::new("FALSE"),
            null: WordComparer::new("NULL"),
            patterns: [
                "LIKE",
                "REGEXP",
                "RLIKE",
                "MATCH",
                "MATCH_ANY",
                "MATCH_ALL",
                "MATCH_PHRASE",
                "MATCH_PHRASE_PREFIX",
                "MATCH_PHRASE_EDGE",
                "MATCH_REGEXP",
            ]
            .into_iter()
            .map(WordComparer::new)
            .collect(),
        }
    }
}
