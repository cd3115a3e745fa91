//! Filter evaluation and ordering for in-memory documents.
//!
//! Comparison follows document-store conventions: integers and doubles
//! compare as numbers, strings lexicographically, datetimes by instant;
//! values of incomparable types are simply unordered and fail range
//! predicates.

use bson::{Bson, Document};
use std::cmp::Ordering;

use repolayer_core::{
    error::RepositoryError,
    query::{CmpOp, Filter, FilterVisitor, Sort, SortDirection},
};

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Deep equality with numeric widening.
pub(crate) fn equals(left: &Bson, right: &Bson) -> bool {
    match (left, right) {
        (Bson::Array(a), Bson::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| equals(x, y))
        }
        (Bson::Document(a), Bson::Document(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| equals(value, other)))
        }
        _ => match (numeric(left), numeric(right)) {
            (Some(a), Some(b)) => a == b,
            _ => left == right,
        },
    }
}

/// Ordering between two values, when one exists.
pub(crate) fn compare(left: &Bson, right: &Bson) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (numeric(left), numeric(right)) {
        return a.partial_cmp(&b);
    }

    match (left, right) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => Some(a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Sorts `documents` in place by the given keys, in key order.
///
/// Missing fields sort before present ones; incomparable values are left
/// where the stable sort finds them.
pub(crate) fn order_documents(documents: &mut [Document], sort: &[Sort]) {
    documents.sort_by(|a, b| {
        for key in sort {
            let ordering = match (a.get(&key.field), b.get(&key.field)) {
                (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };

            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    });
}

/// Evaluates a [`Filter`] against one document.
pub(crate) struct FilterEvaluator<'a> {
    document: &'a Document,
}

impl<'a> FilterEvaluator<'a> {
    pub(crate) fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Whether `document` satisfies `filter`.
    pub(crate) fn matches(document: &Document, filter: &Filter) -> bool {
        FilterEvaluator::new(document)
            .visit_filter(filter)
            .unwrap_or(false)
    }
}

impl FilterVisitor for FilterEvaluator<'_> {
    type Output = bool;
    type Error = RepositoryError;

    fn visit_all(&mut self) -> Result<bool, RepositoryError> {
        Ok(true)
    }

    fn visit_and(&mut self, parts: &[Filter]) -> Result<bool, RepositoryError> {
        for part in parts {
            if !self.visit_filter(part)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, parts: &[Filter]) -> Result<bool, RepositoryError> {
        for part in parts {
            if self.visit_filter(part)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, inner: &Filter) -> Result<bool, RepositoryError> {
        Ok(!self.visit_filter(inner)?)
    }

    fn visit_exists(&mut self, field: &str, present: bool) -> Result<bool, RepositoryError> {
        Ok(self.document.get(field).is_some() == present)
    }

    fn visit_cmp(&mut self, field: &str, op: CmpOp, value: &Bson) -> Result<bool, RepositoryError> {
        let Some(actual) = self.document.get(field) else {
            return Ok(false);
        };

        Ok(match op {
            CmpOp::Eq => equals(actual, value),
            CmpOp::Ne => !equals(actual, value),
            CmpOp::Gt => compare(actual, value) == Some(Ordering::Greater),
            CmpOp::Gte => {
                matches!(compare(actual, value), Some(Ordering::Greater | Ordering::Equal))
            }
            CmpOp::Lt => compare(actual, value) == Some(Ordering::Less),
            CmpOp::Lte => matches!(compare(actual, value), Some(Ordering::Less | Ordering::Equal)),
            CmpOp::Contains => match (actual, value) {
                (Bson::Array(items), needle) => items.iter().any(|item| equals(item, needle)),
                (Bson::String(haystack), Bson::String(needle)) => haystack.contains(needle.as_str()),
                _ => false,
            },
            CmpOp::StartsWith => match (actual, value) {
                (Bson::String(haystack), Bson::String(prefix)) => {
                    haystack.starts_with(prefix.as_str())
                }
                _ => false,
            },
        })
    }

    fn visit_in(
        &mut self,
        field: &str,
        values: &[Bson],
        negated: bool,
    ) -> Result<bool, RepositoryError> {
        let member = self
            .document
            .get(field)
            .map(|actual| values.iter().any(|value| equals(actual, value)))
            .unwrap_or(false);

        Ok(member != negated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use repolayer_core::query::Filter;

    #[test]
    fn numeric_comparison_widens_across_bson_types() {
        assert!(equals(&Bson::Int32(3), &Bson::Int64(3)));
        assert!(equals(&Bson::Int64(3), &Bson::Double(3.0)));
        assert_eq!(
            compare(&Bson::Int32(2), &Bson::Double(2.5)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn range_predicates_fail_on_incomparable_types() {
        let document = doc! { "age": "forty" };

        assert!(!FilterEvaluator::matches(&document, &Filter::gt("age", 18)));
        assert!(!FilterEvaluator::matches(&document, &Filter::lte("age", 18)));
    }

    #[test]
    fn membership_honors_negation_and_missing_fields() {
        let document = doc! { "tag": "a" };

        assert!(FilterEvaluator::matches(&document, &Filter::is_in("tag", vec!["a", "b"])));
        assert!(!FilterEvaluator::matches(&document, &Filter::not_in("tag", vec!["a", "b"])));
        // a document without the field is never in the set
        assert!(FilterEvaluator::matches(&document, &Filter::not_in("other", vec!["a"])));
    }

    #[test]
    fn sort_orders_by_keys_in_order() {
        let mut documents = vec![
            doc! { "_id": 1, "rank": 2, "name": "b" },
            doc! { "_id": 2, "rank": 1, "name": "c" },
            doc! { "_id": 3, "rank": 2, "name": "a" },
        ];

        order_documents(
            &mut documents,
            &[Sort::asc("rank"), Sort::asc("name")],
        );

        let ids: Vec<i32> = documents
            .iter()
            .map(|d| d.get_i32("_id").unwrap())
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
