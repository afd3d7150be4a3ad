//! Search predicates for root queries.
//!
//! A [`Predicate`] is a list of typed clauses joined by AND. It renders into a
//! parametrized `WHERE` fragment over the aliases `o` (orders) and `m` (member)
//! that every root query uses.

use rusqlite::types::Value;

use crate::catalog::OrderStatus;

/// Search criteria as received from a caller. Blank values mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSearch {
    pub status: Option<OrderStatus>,
    pub member_name: Option<String>,
}

impl OrderSearch {
    /// Search matching every order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a status.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to members whose name contains `name`.
    pub fn with_member_name(mut self, name: impl Into<String>) -> Self {
        self.member_name = Some(name.into());
        self
    }
}

/// One constraint on the root query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `o.status = ?`
    StatusEq(OrderStatus),
    /// `m.name` contains the given text.
    MemberNameContains(String),
}

impl Clause {
    fn render(&self, params: &mut Vec<Value>) -> &'static str {
        match self {
            Clause::StatusEq(status) => {
                params.push(Value::Text(status.as_str().to_string()));
                "o.status = ?"
            }
            Clause::MemberNameContains(name) => {
                params.push(Value::Text(format!("%{}%", escape_like(name))));
                "m.name LIKE ? ESCAPE '\\'"
            }
        }
    }
}

/// Clauses joined by AND. Empty matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// The unrestricted predicate.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a clause. Adding a clause that is already present is a no-op.
    pub fn and(mut self, clause: Clause) -> Self {
        if !self.clauses.contains(&clause) {
            self.clauses.push(clause);
        }
        self
    }

    /// Clauses in the order they were added.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether no clause restricts the query.
    pub fn is_unrestricted(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render as ` WHERE ...` (or an empty string) plus its bound values.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut params = Vec::with_capacity(self.clauses.len());
        if self.clauses.is_empty() {
            return (String::new(), params);
        }
        let parts: Vec<&str> = self
            .clauses
            .iter()
            .map(|clause| clause.render(&mut params))
            .collect();
        (format!(" WHERE {}", parts.join(" AND ")), params)
    }
}

impl From<&OrderSearch> for Predicate {
    fn from(search: &OrderSearch) -> Self {
        let mut predicate = Predicate::all();
        if let Some(status) = search.status {
            predicate = predicate.and(Clause::StatusEq(status));
        }
        if let Some(name) = search.member_name.as_deref().map(str::trim) {
            if !name.is_empty() {
                predicate = predicate.and(Clause::MemberNameContains(name.to_string()));
            }
        }
        predicate
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
