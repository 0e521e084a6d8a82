//! Query predicates rendered as AppSync filter and condition inputs.
//!
//! ```ignore
//! let predicate = QueryField::field("rating").gt(4).and(QueryField::field("title").begins_with("Rust"));
//! // {"and":[{"rating":{"gt":4}},{"title":{"beginsWith":"Rust"}}]}
//! ```

use serde_json::{Map, Value, json};

/// Comparison applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Eq(Value),
    Ne(Value),
    Le(Value),
    Lt(Value),
    Ge(Value),
    Gt(Value),
    Contains(Value),
    NotContains(Value),
    Between(Value, Value),
    BeginsWith(Value),
}

impl QueryOperator {
    /// Operator key in the filter input.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Eq(_) => "eq",
            Self::Ne(_) => "ne",
            Self::Le(_) => "le",
            Self::Lt(_) => "lt",
            Self::Ge(_) => "ge",
            Self::Gt(_) => "gt",
            Self::Contains(_) => "contains",
            Self::NotContains(_) => "notContains",
            Self::Between(_, _) => "between",
            Self::BeginsWith(_) => "beginsWith",
        }
    }

    fn operand(&self) -> Value {
        match self {
            Self::Between(start, end) => Value::Array(vec![start.clone(), end.clone()]),
            Self::Eq(v)
            | Self::Ne(v)
            | Self::Le(v)
            | Self::Lt(v)
            | Self::Ge(v)
            | Self::Gt(v)
            | Self::Contains(v)
            | Self::NotContains(v)
            | Self::BeginsWith(v) => v.clone(),
        }
    }
}

/// Entry point for building predicates on a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryField {
    name: String,
}

impl QueryField {
    pub fn field(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn operation(&self, operator: QueryOperator) -> QueryPredicate {
        QueryPredicate::Operation {
            field: self.name.clone(),
            operator,
        }
    }

    pub fn eq(&self, value: impl Into<Value>) -> QueryPredicate {
        self.operation(QueryOperator::Eq(value.into()))
    }

    pub fn ne(&self, value: impl Into<Value>) -> QueryPredicate {
        self.operation(QueryOperator::Ne(value.into()))
    }

    pub fn le(&self, value: impl Into<Value>) -> QueryPredicate {
        self.operation(QueryOperator::Le(value.into()))
    }

    pub fn lt(&self, value: impl Into<Value>) -> QueryPredicate {
        self.operation(QueryOperator::Lt(value.into()))
    }

    pub fn ge(&self, value: impl Into<Value>) -> QueryPredicate {
        self.operation(QueryOperator::Ge(value.into()))
    }

    pub fn gt(&self, value: impl Into<Value>) -> QueryPredicate {
        self.operation(QueryOperator::Gt(value.into()))
    }

    pub fn contains(&self, value: impl Into<Value>) -> QueryPredicate {
        self.operation(QueryOperator::Contains(value.into()))
    }

    pub fn not_contains(&self, value: impl Into<Value>) -> QueryPredicate {
        self.operation(QueryOperator::NotContains(value.into()))
    }

    /// Inclusive range.
    pub fn between(&self, start: impl Into<Value>, end: impl Into<Value>) -> QueryPredicate {
        self.operation(QueryOperator::Between(start.into(), end.into()))
    }

    pub fn begins_with(&self, value: impl Into<Value>) -> QueryPredicate {
        self.operation(QueryOperator::BeginsWith(value.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupType {
    And,
    Or,
    Not,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

/// A filter or condition over model fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryPredicate {
    /// Matches everything; renders to no filter at all.
    #[default]
    All,
    Operation {
        field: String,
        operator: QueryOperator,
    },
    Group {
        kind: GroupType,
        predicates: Vec<QueryPredicate>,
    },
}

impl QueryPredicate {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    #[must_use]
    pub fn and(self, other: QueryPredicate) -> Self {
        self.combine(GroupType::And, other)
    }

    #[must_use]
    pub fn or(self, other: QueryPredicate) -> Self {
        self.combine(GroupType::Or, other)
    }

    #[must_use]
    pub fn not(predicate: QueryPredicate) -> Self {
        Self::Group {
            kind: GroupType::Not,
            predicates: vec![predicate],
        }
    }

    fn combine(self, kind: GroupType, other: QueryPredicate) -> Self {
        match (self, other) {
            (Self::All, other) => other,
            (this, Self::All) => this,
            (
                Self::Group {
                    kind: existing,
                    mut predicates,
                },
                other,
            ) if existing == kind => {
                predicates.push(other);
                Self::Group { kind, predicates }
            }
            (this, other) => Self::Group {
                kind,
                predicates: vec![this, other],
            },
        }
    }

    /// AppSync filter JSON, or `None` when the predicate matches everything.
    pub fn to_filter_json(&self) -> Option<Value> {
        match self {
            Self::All => None,
            Self::Operation { field, operator } => {
                let mut comparison = Map::new();
                comparison.insert(operator.name().to_string(), operator.operand());
                let mut filter = Map::new();
                filter.insert(field.clone(), Value::Object(comparison));
                Some(Value::Object(filter))
            }
            Self::Group {
                kind: GroupType::Not,
                predicates,
            } => {
                let inner = predicates.first()?.to_filter_json()?;
                Some(json!({ "not": inner }))
            }
            Self::Group { kind, predicates } => {
                let children: Vec<Value> = predicates
                    .iter()
                    .filter_map(QueryPredicate::to_filter_json)
                    .collect();
                if children.is_empty() {
                    return None;
                }
                let mut filter = Map::new();
                filter.insert(kind.as_str().to_string(), Value::Array(children));
                Some(Value::Object(filter))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_operation() {
        let predicate = QueryField::field("title").eq("Hello");
        assert_eq!(
            predicate.to_filter_json(),
            Some(json!({"title": {"eq": "Hello"}}))
        );
    }

    #[test]
    fn test_between_renders_pair() {
        let predicate = QueryField::field("rating").between(1_i64, 5_i64);
        assert_eq!(
            predicate.to_filter_json(),
            Some(json!({"rating": {"between": [1, 5]}}))
        );
    }

    #[test]
    fn test_and_flattens() {
        let predicate = QueryField::field("a")
            .gt(1_i64)
            .and(QueryField::field("b").lt(2_i64))
            .and(QueryField::field("c").begins_with("x"));
        assert_eq!(
            predicate.to_filter_json(),
            Some(json!({"and": [
                {"a": {"gt": 1}},
                {"b": {"lt": 2}},
                {"c": {"beginsWith": "x"}}
            ]}))
        );
    }

    #[test]
    fn test_or_inside_and() {
        let predicate = QueryField::field("a")
            .eq(1_i64)
            .and(QueryField::field("b").eq(2_i64).or(QueryField::field("c").not_contains("z")));
        assert_eq!(
            predicate.to_filter_json(),
            Some(json!({"and": [
                {"a": {"eq": 1}},
                {"or": [{"b": {"eq": 2}}, {"c": {"notContains": "z"}}]}
            ]}))
        );
    }

    #[test]
    fn test_not() {
        let predicate = QueryPredicate::not(QueryField::field("done").ne(true));
        assert_eq!(
            predicate.to_filter_json(),
            Some(json!({"not": {"done": {"ne": true}}}))
        );
    }

    #[test]
    fn test_all_is_identity() {
        assert_eq!(QueryPredicate::All.to_filter_json(), None);
        let predicate = QueryPredicate::All.and(QueryField::field("a").le(3_i64));
        assert_eq!(predicate, QueryField::field("a").le(3_i64));
        assert!(QueryPredicate::default().is_all());
    }
}
