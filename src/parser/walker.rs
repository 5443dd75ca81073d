use crate::parser::ParseNode;

/// Receives enter/exit callbacks for every node of a parse tree.
pub trait ParseTreeListener {
    type Error;

    fn enter_every_rule(&mut self, node: &ParseNode) -> Result<(), Self::Error>;
    fn exit_every_rule(&mut self, node: &ParseNode) -> Result<(), Self::Error>;
}

pub struct ParseTreeWalker;

impl ParseTreeWalker {
    /// Depth-first walk. Stops at the first listener error.
    pub fn walk<L: ParseTreeListener>(listener: &mut L, node: &ParseNode) -> Result<(), L::Error> {
        listener.enter_every_rule(node)?;
        for child in &node.children {
            Self::walk(listener, child)?;
        }
        listener.exit_every_rule(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        fail_on: Option<NodeKind>,
    }

    impl ParseTreeListener for Recorder {
        type Error = String;

        fn enter_every_rule(&mut self, node: &ParseNode) -> Result<(), Self::Error> {
            if self.fail_on == Some(node.kind) {
                return Err(format!("refused {}", node.kind));
            }
            self.events.push(format!("+{}", node.kind));
            Ok(())
        }

        fn exit_every_rule(&mut self, node: &ParseNode) -> Result<(), Self::Error> {
            self.events.push(format!("-{}", node.kind));
            Ok(())
        }
    }

    #[test]
    pub fn test_walk_order() {
        let tree = TreeParser::parse("SELECT a").expect("Failed to parse query");
        let mut recorder = Recorder::default();
        ParseTreeWalker::walk(&mut recorder, &tree).expect("walk");

        let column = recorder
            .events
            .iter()
            .position(|event| event == "+ColumnReference")
            .expect("column enter");
        assert_eq!(recorder.events[column + 1], "+Identifier");
        assert_eq!(recorder.events[column + 2], "-Identifier");
        assert_eq!(recorder.events[column + 3], "-ColumnReference");
        assert_eq!(recorder.events.first().map(String::as_str), Some("+Statement"));
        assert_eq!(recorder.events.last().map(String::as_str), Some("-Statement"));
    }

    #[test]
    pub fn test_walk_stops_on_error() {
        let tree = TreeParser::parse("SELECT a FROM t").expect("Failed to parse query");
        let mut recorder = Recorder {
            fail_on: Some(NodeKind::FromClause),
            ..Default::default()
        };

        let result = ParseTreeWalker::walk(&mut recorder, &tree);
        assert_eq!(result, Err("refused FromClause".to_string()));
        assert!(!recorder.events.iter().any(|event| event == "+Relation"));
    }
}
