//! Field and row selection state for the dashboard
//!
//! Two independent sets: selected field names (all fields selected by
//! default) and selected row indices (empty by default). Row indices are
//! only meaningful against the sender list they were made for, so every
//! reload of that list clears the row selection.

use crate::error::ClientError;
use crate::models::{Sender, SenderRequest};
use std::collections::BTreeSet;
use thiserror::Error;

/// The requestable columns of a [`Sender`] row, in display order
pub const ALL_SENDER_FIELDS: [&str; 5] = [
    "sender_name",
    "mobile_provider",
    "phone_number",
    "full_name",
    "date",
];

/// Why a submission was rejected before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Select at least one sender row.")]
    NoRowsSelected,

    #[error("Select at least one field.")]
    NoFieldsSelected,

    #[error("Row {index} is out of range for the loaded list of {len}")]
    RowOutOfRange { index: usize, len: usize },
}

impl From<SelectionError> for ClientError {
    fn from(err: SelectionError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

/// Dashboard selection state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    fields: BTreeSet<String>,
    rows: BTreeSet<usize>,
    /// Length of the sender list the row indices refer to
    loaded_len: usize,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SelectionState {
    /// Fresh state for a sender list of `loaded_len` rows: all fields
    /// selected, no rows selected
    pub fn new(loaded_len: usize) -> Self {
        Self {
            fields: ALL_SENDER_FIELDS.iter().map(|f| f.to_string()).collect(),
            rows: BTreeSet::new(),
            loaded_len,
        }
    }

    /// The sender list was reloaded: row indices are stale, drop them
    ///
    /// Field selection survives a reload; it refers to columns, not rows.
    pub fn reload(&mut self, loaded_len: usize) {
        self.rows.clear();
        self.loaded_len = loaded_len;
    }

    /// Toggle a field; present becomes absent and vice versa
    pub fn toggle_field(&mut self, field: &str) {
        if !self.fields.remove(field) {
            self.fields.insert(field.to_string());
        }
    }

    /// Toggle a row index against the currently loaded list
    pub fn toggle_row(&mut self, index: usize) -> Result<(), SelectionError> {
        if index >= self.loaded_len {
            return Err(SelectionError::RowOutOfRange {
                index,
                len: self.loaded_len,
            });
        }
        if !self.rows.remove(&index) {
            self.rows.insert(index);
        }
        Ok(())
    }

    pub fn is_field_selected(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn is_row_selected(&self, index: usize) -> bool {
        self.rows.contains(&index)
    }

    pub fn selected_field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn selected_row_count(&self) -> usize {
        self.rows.len()
    }

    /// Selected field names in display order
    pub fn selected_fields(&self) -> Vec<String> {
        ALL_SENDER_FIELDS
            .iter()
            .filter(|f| self.fields.contains(**f))
            .map(|f| f.to_string())
            .collect()
    }

    /// Reject submission if either set is empty
    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.rows.is_empty() {
            return Err(SelectionError::NoRowsSelected);
        }
        if self.fields.is_empty() {
            return Err(SelectionError::NoFieldsSelected);
        }
        Ok(())
    }

    /// Materialize the request body from the loaded sender list
    ///
    /// Validates first, so an empty selection never produces a request.
    /// Indices beyond `senders` (a list shorter than advertised) are an
    /// out-of-range error rather than silently dropped rows.
    pub fn build_request(&self, senders: &[Sender]) -> Result<SenderRequest, SelectionError> {
        self.validate()?;
        let mut rows = Vec::with_capacity(self.rows.len());
        for &index in &self.rows {
            let sender = senders.get(index).ok_or(SelectionError::RowOutOfRange {
                index,
                len: senders.len(),
            })?;
            rows.push(sender.clone());
        }
        Ok(SenderRequest {
            fields: self.selected_fields(),
            rows,
        })
    }
}
