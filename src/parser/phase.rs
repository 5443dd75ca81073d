use crate::parser::NodeKind;

/// Clauses of a query in the order they are written and rendered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    #[default]
    Projection = 0,
    Collections = 1,
    Criteria = 2,
    Aggregates = 3,
    OrderBy = 4,
    LimitAndOffset = 5,
}

impl Phase {
    /// Clause that starts at a node of this kind, if any.
    pub fn from_kind(kind: NodeKind) -> Option<Phase> {
        match kind {
            NodeKind::SelectClause => Some(Phase::Projection),
            NodeKind::FromClause => Some(Phase::Collections),
            NodeKind::WhereClause => Some(Phase::Criteria),
            NodeKind::AggClause => Some(Phase::Aggregates),
            NodeKind::SortClause => Some(Phase::OrderBy),
            NodeKind::LimitClause => Some(Phase::LimitAndOffset),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Phase::Projection => "SELECT ",
            Phase::Collections => "FROM ",
            Phase::Criteria => "WHERE ",
            Phase::Aggregates => "GROUP BY ",
            Phase::OrderBy => "ORDER BY ",
            Phase::LimitAndOffset => "",
        }
    }
}
