//! Extracted invoice fields.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A field the extractor looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    InvoiceNumber,
    InvoiceDate,
    TotalAmount,
}

impl Field {
    /// All fields, in export order.
    pub const ALL: [Field; 3] = [Field::InvoiceNumber, Field::InvoiceDate, Field::TotalAmount];

    /// Human-facing name used by exports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Field::InvoiceNumber => "Invoice Number",
            Field::InvoiceDate => "Invoice Date",
            Field::TotalAmount => "Total Amount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fields extracted from a single document's text.
///
/// Every field is independently optional. Values are the raw matched text:
/// dates are not normalized and amounts keep their thousands separators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Invoice identifier (alphanumerics and hyphens).
    pub invoice_number: Option<String>,

    /// Date token as it appeared in the text.
    pub invoice_date: Option<String>,

    /// Total amount with exactly two fraction digits, without currency symbol.
    pub total_amount: Option<String>,
}

impl ExtractedFields {
    /// Get the value of a field.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::InvoiceNumber => self.invoice_number.as_deref(),
            Field::InvoiceDate => self.invoice_date.as_deref(),
            Field::TotalAmount => self.total_amount.as_deref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::InvoiceNumber => &mut self.invoice_number,
            Field::InvoiceDate => &mut self.invoice_date,
            Field::TotalAmount => &mut self.total_amount,
        }
    }

    /// True when no field was found.
    pub fn is_empty(&self) -> bool {
        self.found_count() == 0
    }

    /// Number of fields that were found.
    pub fn found_count(&self) -> usize {
        Field::ALL.iter().filter(|f| self.get(**f).is_some()).count()
    }

    /// Fields paired with their display names, in export order.
    pub fn display_pairs(&self) -> [(&'static str, Option<&str>); 3] {
        Field::ALL.map(|f| (f.display_name(), self.get(f)))
    }

    /// Parse the total amount as a decimal, dropping thousands separators.
    pub fn total_amount_value(&self) -> Option<Decimal> {
        let raw = self.total_amount.as_deref()?;
        Decimal::from_str(&raw.replace(',', "")).ok()
    }
}
