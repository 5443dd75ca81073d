use crate::parser::{Lexer, NodeKind, ParseError, ParseNode, QueryComparers, Token, TokenKind};

/// Deepest expression nesting accepted: parens, calls, casts, subscripts,
/// `NOT` and unary signs.
pub const MAX_NESTING: usize = 64;

/// Longest run of operands joined by one operator level, or of `.`/`[...]`
/// suffixes on one column.
pub const MAX_CHAIN: usize = 1024;

/// Recursive-descent parser for the supported subset of Doris `SELECT`.
///
/// Productions and node kinds follow the Doris grammar so that a listener
/// written against that grammar sees the same shapes: every boolean operand
/// is a `Predicated`, every primary sits in a `ValueExpressionDefault`, and
/// dotted or subscripted columns nest as `Dereference` and `ElementAt`.
pub struct TreeParser {
    tokens: Vec<Token>,
    pub position: usize,
    pub comparers: QueryComparers,
    depth: usize,
}

impl TreeParser {
    pub fn new(query: &str) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: Lexer::tokenize(query)?,
            position: 0,
            comparers: QueryComparers::new(),
            depth: 0,
        })
    }

    pub fn parse(query: &str) -> Result<ParseNode, ParseError> {
        let mut parser = Self::new(query)?;
        parser.parse_statement()
    }

    pub fn current(&self) -> &Token {
        self.peek(0)
    }

    pub fn peek(&self, ahead: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.position + ahead).min(last)]
    }

    pub fn eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    pub fn next(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        for _ in 0..ahead {
            self.next();
        }
    }

    fn words(&self, count: usize) -> String {
        (0..count)
            .map(|index| self.peek(index).text.as_str())
            .collect::<Vec<&str>>()
            .join(" ")
    }

    fn node(&self, kind: NodeKind, first: usize, children: Vec<ParseNode>) -> ParseNode {
        let consumed = &self.tokens[first.min(self.position)..self.position];
        let text: String = consumed.iter().map(|token| token.text.as_str()).collect();
        let start = self.tokens.get(first).map_or(0, |token| token.start);
        let end = consumed.last().map_or(start, |token| token.end);

        let mut sql = String::with_capacity(text.len());
        let mut previous: Option<&Token> = None;
        for token in consumed {
            if previous.is_some_and(|previous| previous.kind.is_wordlike() && token.kind.is_wordlike()) {
                sql.push(' ');
            }
            sql.push_str(&token.text);
            previous = Some(token);
        }

        ParseNode::new(kind, text, start, end, children).with_sql(sql)
    }

    fn nest(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return self.error("Expression nested too deeply");
        }
        self.depth += 1;
        Ok(())
    }

    fn unnest(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn check_chain(&self, length: usize) -> Result<(), ParseError> {
        if length > MAX_CHAIN {
            return self.error("Expression chain too long");
        }
        Ok(())
    }

    fn leaf(&mut self, kind: NodeKind) -> ParseNode {
        let first = self.position;
        self.next();
        self.node(kind, first, vec![])
    }

    fn error<T>(&self, message: &str) -> Result<T, ParseError> {
        ParseError::at_token(message, self.current()).err()
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<(), ParseError> {
        if self.current().kind != kind {
            return self.error(message);
        }
        self.next();
        Ok(())
    }

    pub fn parse_statement(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        if !self.comparers.select.compare(self) {
            return self.error("Unsupported statement");
        }

        let query = self.parse_query()?;
        let statement = self.node(NodeKind::Statement, first, vec![query]);

        while self.current().kind == TokenKind::Semicolon {
            self.next();
        }

        if !self.eof() {
            if self.current().is_reserved() {
                return self.error("Unsupported clause");
            }
            return self.error("Unexpected token");
        }

        Ok(statement)
    }

    fn parse_query(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let mut children = vec![self.parse_query_specification()?];

        let organization_first = self.position;
        let mut organization = vec![];
        if self.comparers.order_by.compare(self) {
            organization.push(self.parse_sort_clause()?);
        }
        if self.comparers.limit.compare(self) {
            organization.push(self.parse_limit_clause()?);
        }
        if !organization.is_empty() {
            children.push(self.node(NodeKind::QueryOrganization, organization_first, organization));
        }

        Ok(self.node(NodeKind::Query, first, children))
    }

    fn parse_query_specification(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let mut children = vec![self.parse_select_clause()?];

        if self.comparers.from.compare(self) {
            children.push(self.parse_from_clause()?);
        }
        if self.comparers.r#where.compare(self) {
            children.push(self.parse_where_clause()?);
        }
        if self.comparers.group_by.compare(self) {
            children.push(self.parse_agg_clause()?);
        }

        Ok(self.node(NodeKind::QuerySpecification, first, children))
    }

    fn parse_select_clause(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        self.jump(self.comparers.select.length);

        let mut children = vec![];
        if self.comparers.distinct.compare(self) || self.comparers.all.compare(self) {
            children.push(self.leaf(NodeKind::SetQuantifier));
        }
        children.push(self.parse_named_expression_seq()?);

        Ok(self.node(NodeKind::SelectClause, first, children))
    }

    fn parse_named_expression_seq(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let mut children = vec![self.parse_named_expression()?];
        while self.current().kind == TokenKind::Comma {
            self.next();
            children.push(self.parse_named_expression()?);
        }
        Ok(self.node(NodeKind::NamedExpressionSeq, first, children))
    }

    fn parse_named_expression(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let mut children = vec![self.parse_expression()?];

        if self.comparers.alias.compare(self) {
            self.jump(self.comparers.alias.length);
            children.push(self.parse_identifier_or_text()?);
        } else if self.current().is_identifier() {
            children.push(self.parse_identifier_or_text()?);
        }

        Ok(self.node(NodeKind::NamedExpression, first, children))
    }

    fn parse_identifier_or_text(&mut self) -> Result<ParseNode, ParseError> {
        match self.current().kind {
            TokenKind::Word | TokenKind::QuotedIdentifier | TokenKind::String => {
                Ok(self.leaf(NodeKind::IdentifierOrText))
            }
            _ => self.error("Invalid alias"),
        }
    }

    fn parse_expression(&mut self) -> Result<ParseNode, ParseError> {
        self.nest()?;
        let first = self.position;
        let inner = self.parse_boolean_expression()?;
        self.unnest();
        Ok(self.node(NodeKind::Expression, first, vec![inner]))
    }

    fn parse_boolean_expression(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let mut left = self.parse_and()?;
        let mut operands = 1;
        while self.comparers.or.compare(self) {
            operands += 1;
            self.check_chain(operands)?;
            let op = self.current().text.clone();
            self.next();
            let right = self.parse_and()?;
            left = self.node(NodeKind::LogicalBinary, first, vec![left, right]).with_op(op);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let mut left = self.parse_not()?;
        let mut operands = 1;
        while self.comparers.and.compare(self) {
            operands += 1;
            self.check_chain(operands)?;
            let op = self.current().text.clone();
            self.next();
            let right = self.parse_not()?;
            left = self.node(NodeKind::LogicalBinary, first, vec![left, right]).with_op(op);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<ParseNode, ParseError> {
        if self.comparers.not.compare(self) {
            let first = self.position;
            self.nest()?;
            self.next();
            let inner = self.parse_not()?;
            self.unnest();
            return Ok(self.node(NodeKind::LogicalNot, first, vec![inner]));
        }
        self.parse_predicated()
    }

    fn parse_predicated(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let mut children = vec![self.parse_value_expression()?];
        if let Some(predicate) = self.parse_predicate()? {
            children.push(predicate);
        }
        Ok(self.node(NodeKind::Predicated, first, children))
    }

    fn parse_predicate(&mut self) -> Result<Option<ParseNode>, ParseError> {
        let first = self.position;

        let null_check = [&self.comparers.is_not_null, &self.comparers.is_null]
            .into_iter()
            .find(|comparer| comparer.compare(self))
            .map(|comparer| (comparer.length, comparer.matched_text(self, 0)));
        if let Some((length, op)) = null_check {
            self.jump(length);
            return Ok(Some(self.node(NodeKind::Predicate, first, vec![]).with_op(op)));
        }

        let negated = self.comparers.not.compare(self) as usize;

        if self.comparers.r#in.compare_at(self, negated) {
            let op = self.words(negated + 1);
            self.jump(negated + 1);
            self.expect(TokenKind::LeftParen, "Expected '(' after IN")?;
            let mut children = vec![self.parse_expression()?];
            while self.current().kind == TokenKind::Comma {
                self.next();
                children.push(self.parse_expression()?);
            }
            self.expect(TokenKind::RightParen, "Expected ')' to close IN list")?;
            return Ok(Some(self.node(NodeKind::Predicate, first, children).with_op(op)));
        }

        if self.comparers.between.compare_at(self, negated) {
            let op = self.words(negated + 1);
            self.jump(negated + 1);
            let lower = self.parse_additive()?;
            if !self.comparers.and.compare(self) {
                return self.error("Expected AND in BETWEEN");
            }
            self.next();
            let upper = self.parse_additive()?;
            return Ok(Some(self.node(NodeKind::Predicate, first, vec![lower, upper]).with_op(op)));
        }

        let pattern = self
            .comparers
            .patterns
            .iter()
            .any(|comparer| comparer.compare_at(self, negated));
        if pattern {
            let op = self.words(negated + 1);
            self.jump(negated + 1);
            let value = self.parse_additive()?;
            return Ok(Some(self.node(NodeKind::Predicate, first, vec![value]).with_op(op)));
        }

        if negated == 1 {
            return self.error("Invalid predicate");
        }

        Ok(None)
    }

    fn parse_value_expression(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let left = self.parse_additive()?;
        if !self.current().kind.is_comparison() {
            return Ok(left);
        }

        let op = self.current().text.clone();
        let operator = self.leaf(NodeKind::ComparisonOperator);
        let right = self.parse_additive()?;
        Ok(self.node(NodeKind::Comparison, first, vec![left, operator, right]).with_op(op))
    }

    fn parse_additive(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let mut left = self.parse_multiplicative()?;
        let mut operands = 1;
        while matches!(self.current().kind, TokenKind::Plus | TokenKind::Minus) {
            operands += 1;
            self.check_chain(operands)?;
            let op = self.current().text.clone();
            self.next();
            let right = self.parse_multiplicative()?;
            left = self.node(NodeKind::ArithmeticBinary, first, vec![left, right]).with_op(op);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let mut left = self.parse_unary()?;
        let mut operands = 1;
        while matches!(
            self.current().kind,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent
        ) {
            operands += 1;
            self.check_chain(operands)?;
            let op = self.current().text.clone();
            self.next();
            let right = self.parse_unary()?;
            left = self.node(NodeKind::ArithmeticBinary, first, vec![left, right]).with_op(op);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let kind = self.current().kind;

        if kind == TokenKind::Minus && self.peek(1).kind.is_number() {
            self.jump(2);
            let constant = self.node(NodeKind::ConstantDefault, first, vec![]);
            return Ok(self.node(NodeKind::ValueExpressionDefault, first, vec![constant]));
        }

        if matches!(kind, TokenKind::Minus | TokenKind::Plus) {
            let op = self.current().text.clone();
            self.nest()?;
            self.next();
            let operand = self.parse_unary()?;
            self.unnest();
            return Ok(self.node(NodeKind::ArithmeticUnary, first, vec![operand]).with_op(op));
        }

        let primary = self.parse_primary()?;
        Ok(self.node(NodeKind::ValueExpressionDefault, first, vec![primary]))
    }

    fn parse_primary(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let token = self.current().clone();

        let mut base = match token.kind {
            TokenKind::Star => self.leaf(NodeKind::Star),
            TokenKind::String | TokenKind::Integer | TokenKind::Decimal => {
                self.leaf(NodeKind::ConstantDefault)
            }
            TokenKind::LeftParen => self.parse_parenthesized()?,
            TokenKind::Word if self.comparers.cast.compare(self) => self.parse_cast()?,
            TokenKind::Word
                if self.comparers.null.compare(self)
                    || self.comparers.b_true.compare(self)
                    || self.comparers.b_false.compare(self) =>
            {
                self.leaf(NodeKind::ConstantDefault)
            }
            TokenKind::Word if !token.is_reserved() && self.peek(1).kind == TokenKind::LeftParen => {
                self.parse_function_call()?
            }
            _ if token.is_identifier() => {
                if self.peek(1).kind == TokenKind::Dot && self.peek(2).kind == TokenKind::Star {
                    self.jump(3);
                    self.node(NodeKind::Star, first, vec![])
                } else {
                    let identifier = self.leaf(NodeKind::Identifier);
                    self.node(NodeKind::ColumnReference, first, vec![identifier])
                }
            }
            TokenKind::Word => return self.error("Unexpected keyword"),
            _ => return self.error("Invalid expression"),
        };

        let mut suffixes = 0;
        loop {
            if matches!(self.current().kind, TokenKind::Dot | TokenKind::LeftBracket) {
                suffixes += 1;
                self.check_chain(suffixes)?;
            }
            match self.current().kind {
                TokenKind::Dot
                    if matches!(self.peek(1).kind, TokenKind::Word | TokenKind::QuotedIdentifier) =>
                {
                    self.next();
                    let identifier = self.leaf(NodeKind::Identifier);
                    base = self.node(NodeKind::Dereference, first, vec![base, identifier]);
                }
                TokenKind::LeftBracket => {
                    self.nest()?;
                    self.next();
                    let index = self.parse_value_expression()?;
                    self.expect(TokenKind::RightBracket, "Expected ']'")?;
                    self.unnest();
                    base = self.node(NodeKind::ElementAt, first, vec![base, index]);
                }
                _ => return Ok(base),
            }
        }
    }

    fn parse_parenthesized(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        self.next();
        if self.comparers.select.compare(self) {
            return self.error("Subqueries are not supported");
        }
        let inner = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "Expected ')'")?;
        Ok(self.node(NodeKind::ParenthesizedExpression, first, vec![inner]))
    }

    fn parse_function_call(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let mut children = vec![self.leaf(NodeKind::FunctionNameIdentifier)];
        self.expect(TokenKind::LeftParen, "Expected '('")?;

        if self.comparers.distinct.compare(self) || self.comparers.all.compare(self) {
            children.push(self.leaf(NodeKind::SetQuantifier));
        }

        if self.current().kind != TokenKind::RightParen {
            children.push(self.parse_expression()?);
            while self.current().kind == TokenKind::Comma {
                self.next();
                children.push(self.parse_expression()?);
            }
        }
        self.expect(TokenKind::RightParen, "Expected ')' to close function call")?;

        if self.current().is_word("OVER") {
            return self.error("Window functions are not supported");
        }

        Ok(self.node(NodeKind::FunctionCall, first, children))
    }

    fn parse_cast(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        self.jump(self.comparers.cast.length);
        self.expect(TokenKind::LeftParen, "Expected '(' after CAST")?;

        let expression = self.parse_expression()?;
        if !self.comparers.alias.compare(self) {
            return self.error("Expected AS in CAST");
        }
        self.jump(self.comparers.alias.length);

        let data_type = self.parse_cast_data_type()?;
        self.expect(TokenKind::RightParen, "Expected ')' to close CAST")?;

        Ok(self.node(NodeKind::Cast, first, vec![expression, data_type]))
    }

    fn parse_cast_data_type(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        if self.current().kind != TokenKind::Word {
            return self.error("Invalid data type");
        }
        self.next();

        // type parameters such as VARCHAR(64) or ARRAY<INT>
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::Eof => return self.error("Unterminated data type"),
                TokenKind::LeftParen | TokenKind::Lt => depth += 1,
                TokenKind::RightParen | TokenKind::Gt if depth > 0 => depth -= 1,
                _ if depth == 0 => break,
                _ => {}
            }
            self.next();
        }

        Ok(self.node(NodeKind::CastDataType, first, vec![]))
    }

    fn parse_from_clause(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        self.jump(self.comparers.from.length);

        let mut children = vec![self.parse_relation()?];
        while self.current().kind == TokenKind::Comma {
            self.next();
            children.push(self.parse_relation()?);
        }

        Ok(self.node(NodeKind::FromClause, first, children))
    }

    fn parse_relation(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        if self.current().kind == TokenKind::LeftParen {
            return self.error("Subqueries are not supported");
        }
        if !self.current().is_identifier() {
            return self.error("Invalid table name");
        }

        self.next();
        while self.current().kind == TokenKind::Dot
            && matches!(self.peek(1).kind, TokenKind::Word | TokenKind::QuotedIdentifier)
        {
            self.jump(2);
        }
        let mut children = vec![self.node(NodeKind::TableName, first, vec![])];

        if self.comparers.alias.compare(self) {
            self.jump(self.comparers.alias.length);
            if !self.current().is_identifier() {
                return self.error("Invalid table alias");
            }
            children.push(self.leaf(NodeKind::TableAlias));
        } else if self.current().is_identifier() {
            children.push(self.leaf(NodeKind::TableAlias));
        }

        Ok(self.node(NodeKind::Relation, first, children))
    }

    fn parse_where_clause(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        self.jump(self.comparers.r#where.length);
        let condition = self.parse_boolean_expression()?;
        Ok(self.node(NodeKind::WhereClause, first, vec![condition]))
    }

    fn parse_agg_clause(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        self.jump(self.comparers.group_by.length);

        let element_first = self.position;
        let mut expressions = vec![self.parse_expression()?];
        while self.current().kind == TokenKind::Comma {
            self.next();
            expressions.push(self.parse_expression()?);
        }
        let element = self.node(NodeKind::GroupingElement, element_first, expressions);

        Ok(self.node(NodeKind::AggClause, first, vec![element]))
    }

    fn parse_sort_clause(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        self.jump(self.comparers.order_by.length);

        let mut items = vec![self.parse_sort_item()?];
        while self.current().kind == TokenKind::Comma {
            self.next();
            items.push(self.parse_sort_item()?);
        }

        Ok(self.node(NodeKind::SortClause, first, items))
    }

    fn parse_sort_item(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        let expression = self.parse_expression()?;
        if self.comparers.asc.compare(self) || self.comparers.desc.compare(self) {
            self.next();
        }
        Ok(self.node(NodeKind::SortItem, first, vec![expression]))
    }

    fn parse_limit_clause(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.position;
        self.jump(self.comparers.limit.length);

        let value_first = self.position;
        self.expect(TokenKind::Integer, "Invalid limit")?;

        let children = if self.current().kind == TokenKind::Comma {
            // LIMIT <offset>, <limit>
            let offset = self.node(NodeKind::OffsetValue, value_first, vec![]);
            self.next();
            let limit_first = self.position;
            self.expect(TokenKind::Integer, "Invalid limit")?;
            vec![offset, self.node(NodeKind::LimitValue, limit_first, vec![])]
        } else {
            let limit = self.node(NodeKind::LimitValue, value_first, vec![]);
            if self.comparers.offset.compare(self) {
                self.jump(self.comparers.offset.length);
                let offset_first = self.position;
                self.expect(TokenKind::Integer, "Invalid offset")?;
                vec![limit, self.node(NodeKind::OffsetValue, offset_first, vec![])]
            } else {
                vec![limit]
            }
        };

        Ok(self.node(NodeKind::LimitClause, first, children))
    }
}
