use thiserror::Error;

use crate::contact::{ContactId, DraftField};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    /// One or more draft fields are empty. Listed in form order.
    #[error("missing required fields: {}", join_fields(.missing))]
    Validation { missing: Vec<DraftField> },

    #[error("category `{0}` is not offered by the form")]
    UnknownCategory(String),

    /// The row index no longer points into the collection.
    #[error("contact index {index} is out of range (collection has {len})")]
    StaleIndex { index: usize, len: usize },

    #[error("contact {0} no longer exists")]
    UnknownContact(ContactId),

    #[error("the contact form is not open")]
    FormClosed,
}

fn join_fields(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(|f| f.title())
        .collect::<Vec<_>>()
        .join(", ")
}
