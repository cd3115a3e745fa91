//! Opaque query values passed between repositories and store sessions.
//!
//! A [`Filter`] is an abstract predicate over the *internal* representation
//! of a collection: payload fields keep their public names, only the
//! identifier lives under the store's primary-key field. Repositories never
//! interpret filters beyond building primary-key lookups; construction
//! logic belongs to callers (see [`IntoFilter`]) and interpretation to the
//! session backends, which walk the expression through a [`FilterVisitor`].
//!
//! # Building filters
//!
//! ```ignore
//! use repolayer_core::query::Filter;
//!
//! let active_adults = Filter::eq("status", "active").and(Filter::gte("age", 18));
//! ```

use bson::Bson;

use crate::error::RepositoryError;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// A single sort key: field name plus direction.
///
/// Sorting is specified as an ordered list of keys; an empty list means
/// "no sort", and backends must omit the sort clause entirely rather than
/// send an empty object to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// The field to sort by.
    pub field: String,
    /// The direction to sort in.
    pub direction: SortDirection,
}

impl Sort {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Sort { field: field.into(), direction: SortDirection::Asc }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Sort { field: field.into(), direction: SortDirection::Desc }
    }
}

/// Field comparison operators usable in [`Filter::Cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// Equal to.
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// String contains substring.
    Contains,
    /// String starts with prefix.
    StartsWith,
}

/// An opaque filter expression.
///
/// The repository core treats values of this type as opaque: it constructs
/// primary-key filters for its own lookups and hands everything else
/// through to the session untouched. [`Filter::All`] matches every
/// document and is what "no filter" looks like on the wire.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Matches every document.
    All,
    /// All sub-filters must match.
    And(Vec<Filter>),
    /// At least one sub-filter must match.
    Or(Vec<Filter>),
    /// Inverts the inner filter.
    Not(Box<Filter>),
    /// Matches documents where the field is present (or absent).
    Exists {
        /// The field to probe.
        field: String,
        /// `true` to require presence, `false` to require absence.
        present: bool,
    },
    /// Field comparison against a single value.
    Cmp {
        /// The field to compare.
        field: String,
        /// The comparison operator.
        op: CmpOp,
        /// The value to compare against.
        value: Bson,
    },
    /// Matches documents whose field value is a member of `values`.
    In {
        /// The field to test.
        field: String,
        /// The accepted values.
        values: Vec<Bson>,
    },
    /// Matches documents whose field value is not a member of `values`.
    NotIn {
        /// The field to test.
        field: String,
        /// The rejected values.
        values: Vec<Bson>,
    },
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Filter::All
    }

    /// Equality filter on `field`.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::cmp(field, CmpOp::Eq, value)
    }

    /// Inequality filter on `field`.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::cmp(field, CmpOp::Ne, value)
    }

    /// Greater-than filter on `field`.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::cmp(field, CmpOp::Gt, value)
    }

    /// Greater-than-or-equal filter on `field`.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::cmp(field, CmpOp::Gte, value)
    }

    /// Less-than filter on `field`.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::cmp(field, CmpOp::Lt, value)
    }

    /// Less-than-or-equal filter on `field`.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::cmp(field, CmpOp::Lte, value)
    }

    /// Substring filter on a string `field`.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::cmp(field, CmpOp::Contains, value)
    }

    /// Prefix filter on a string `field`.
    pub fn starts_with(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::cmp(field, CmpOp::StartsWith, value)
    }

    /// Matches documents where `field` is present.
    pub fn exists(field: impl Into<String>) -> Self {
        Filter::Exists { field: field.into(), present: true }
    }

    /// Matches documents where `field` is absent.
    pub fn not_exists(field: impl Into<String>) -> Self {
        Filter::Exists { field: field.into(), present: false }
    }

    /// Membership filter: `field` value must be one of `values`.
    pub fn is_in(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Bson>>) -> Self {
        Filter::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Exclusion filter: `field` value must not be one of `values`.
    pub fn not_in(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Bson>>) -> Self {
        Filter::NotIn {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    fn cmp(field: impl Into<String>, op: CmpOp, value: impl Into<Bson>) -> Self {
        Filter::Cmp { field: field.into(), op, value: value.into() }
    }

    /// Combines this filter with another using logical AND.
    ///
    /// An existing AND list is extended in place rather than nested.
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            _ => Filter::And(vec![self, other]),
        }
    }

    /// Combines this filter with another using logical OR.
    ///
    /// An existing OR list is extended in place rather than nested.
    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut parts) => {
                parts.push(other);
                Filter::Or(parts)
            }
            _ => Filter::Or(vec![self, other]),
        }
    }

    /// Negates this filter.
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }
}

/// Options for a single `find` against a store session.
///
/// Empty `sort` and `projection` lists mean the corresponding clause is
/// omitted from the store request entirely; backends must never send empty
/// sort or projection objects, which some stores interpret in surprising
/// ways.
#[derive(Debug, Clone, Default)]
pub struct FindSpec {
    /// Number of documents to skip before the first result.
    pub skip: Option<u64>,
    /// Maximum number of documents to return.
    pub limit: Option<i64>,
    /// Ordered sort keys; empty means store-natural order.
    pub sort: Vec<Sort>,
    /// Fields to project; empty means all fields.
    pub projection: Vec<String>,
}

impl FindSpec {
    /// An empty spec: no skip, no limit, natural order, all fields.
    pub fn new() -> Self {
        FindSpec::default()
    }

    /// Sets the number of documents to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Replaces the sort keys.
    pub fn sort(mut self, sort: Vec<Sort>) -> Self {
        self.sort = sort;
        self
    }

    /// Replaces the projected field list.
    pub fn projection(mut self, projection: Vec<String>) -> Self {
        self.projection = projection;
        self
    }
}

/// Walks a [`Filter`] expression tree.
///
/// Backends implement this once per query language: the in-memory session
/// evaluates filters against documents, the MongoDB session renders them
/// into native query documents.
pub trait FilterVisitor {
    /// The value a visit produces.
    type Output;
    /// The error a visit may fail with.
    type Error: Into<RepositoryError>;

    /// Visits the match-everything filter.
    fn visit_all(&mut self) -> Result<Self::Output, Self::Error>;
    /// Visits a conjunction.
    fn visit_and(&mut self, parts: &[Filter]) -> Result<Self::Output, Self::Error>;
    /// Visits a disjunction.
    fn visit_or(&mut self, parts: &[Filter]) -> Result<Self::Output, Self::Error>;
    /// Visits a negation.
    fn visit_not(&mut self, inner: &Filter) -> Result<Self::Output, Self::Error>;
    /// Visits a field-presence test.
    fn visit_exists(&mut self, field: &str, present: bool) -> Result<Self::Output, Self::Error>;
    /// Visits a field comparison.
    fn visit_cmp(
        &mut self,
        field: &str,
        op: CmpOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;
    /// Visits a membership test; `negated` selects exclusion.
    fn visit_in(
        &mut self,
        field: &str,
        values: &[Bson],
        negated: bool,
    ) -> Result<Self::Output, Self::Error>;

    /// Dispatches on the filter variant.
    fn visit_filter(&mut self, filter: &Filter) -> Result<Self::Output, Self::Error> {
        match filter {
            Filter::All => self.visit_all(),
            Filter::And(parts) => self.visit_and(parts),
            Filter::Or(parts) => self.visit_or(parts),
            Filter::Not(inner) => self.visit_not(inner),
            Filter::Exists { field, present } => self.visit_exists(field, *present),
            Filter::Cmp { field, op, value } => self.visit_cmp(field, *op, value),
            Filter::In { field, values } => self.visit_in(field, values, false),
            Filter::NotIn { field, values } => self.visit_in(field, values, true),
        }
    }
}

/// Conversion from a typed filter-parameter value into an opaque [`Filter`].
///
/// This is the seam domain repositories hang their query vocabulary on: a
/// parameter struct implements `IntoFilter`, and the generic entry points
/// on the repository accept it without this crate learning anything about
/// the domain.
pub trait IntoFilter {
    /// Builds the opaque filter.
    fn into_filter(self) -> Filter;
}

impl IntoFilter for Filter {
    fn into_filter(self) -> Filter {
        self
    }
}
