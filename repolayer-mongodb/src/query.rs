//! Filter translation from the repolayer expression tree to MongoDB
//! query documents.

use bson::{Bson, Document, doc};

use repolayer_core::{
    error::RepositoryError,
    query::{CmpOp, Filter, FilterVisitor},
};

/// Renders opaque filters into MongoDB's native BSON query syntax.
pub(crate) struct MongoFilterTranslator;

impl FilterVisitor for MongoFilterTranslator {
    type Output = Document;
    type Error = RepositoryError;

    fn visit_all(&mut self) -> Result<Document, RepositoryError> {
        Ok(doc! {})
    }

    fn visit_and(&mut self, parts: &[Filter]) -> Result<Document, RepositoryError> {
        Ok(doc! {
            "$and": parts
                .iter()
                .map(|part| self.visit_filter(part))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, parts: &[Filter]) -> Result<Document, RepositoryError> {
        Ok(doc! {
            "$or": parts
                .iter()
                .map(|part| self.visit_filter(part))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_not(&mut self, inner: &Filter) -> Result<Document, RepositoryError> {
        Ok(doc! {
            "$nor": [self.visit_filter(inner)?],
        })
    }

    fn visit_exists(&mut self, field: &str, present: bool) -> Result<Document, RepositoryError> {
        Ok(doc! {
            field: { "$exists": present },
        })
    }

    fn visit_cmp(
        &mut self,
        field: &str,
        op: CmpOp,
        value: &Bson,
    ) -> Result<Document, RepositoryError> {
        Ok(doc! {
            field: match op {
                CmpOp::Eq => doc! { "$eq": value },
                CmpOp::Ne => doc! { "$ne": value },
                CmpOp::Gt => doc! { "$gt": value },
                CmpOp::Gte => doc! { "$gte": value },
                CmpOp::Lt => doc! { "$lt": value },
                CmpOp::Lte => doc! { "$lte": value },
                CmpOp::Contains => match value {
                    Bson::String(needle) => doc! { "$regex": needle.clone() },
                    other => doc! { "$elemMatch": { "$eq": other } },
                },
                CmpOp::StartsWith => match value {
                    Bson::String(prefix) => doc! { "$regex": format!("^{prefix}") },
                    _ => return Err(RepositoryError::Store(
                        "StartsWith filter requires a string value".to_string(),
                    )),
                },
            }
        })
    }

    fn visit_in(
        &mut self,
        field: &str,
        values: &[Bson],
        negated: bool,
    ) -> Result<Document, RepositoryError> {
        Ok(doc! {
            field: match negated {
                false => doc! { "$in": values },
                true => doc! { "$nin": values },
            }
        })
    }
}
