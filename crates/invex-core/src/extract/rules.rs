//! Ordered rule table for field extraction.

use lazy_static::lazy_static;
use regex::{Match, Regex};

use super::patterns::{DATE, INVOICE_NUMBER, INVOICE_NUMBER_LOOSE, TOTAL_AMOUNT};
use crate::models::fields::Field;

/// A single extraction rule: which field it fills, the pattern, and the
/// capture group holding the value.
#[derive(Debug)]
pub struct Rule {
    /// Stable rule name, reported by [`super::FieldExtractor::explain`].
    pub name: &'static str,
    /// Field this rule produces.
    pub field: Field,
    /// Pattern searched in the text.
    pub pattern: &'static Regex,
    /// Capture group with the value.
    pub group: usize,
    /// Only consulted when no earlier rule for the same field matched and
    /// loose matching is enabled.
    pub fallback: bool,
}

impl Rule {
    /// Find the leftmost match of this rule in `text`.
    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.pattern.captures(text)?.get(self.group)
    }
}

lazy_static! {
    /// Rules in priority order. For each field the first rule with a match
    /// wins; within a rule the leftmost match wins.
    pub static ref RULES: [Rule; 4] = [
        Rule {
            name: "invoice_number",
            field: Field::InvoiceNumber,
            pattern: &INVOICE_NUMBER,
            group: 1,
            fallback: false,
        },
        Rule {
            name: "invoice_number_loose",
            field: Field::InvoiceNumber,
            pattern: &INVOICE_NUMBER_LOOSE,
            group: 1,
            fallback: true,
        },
        Rule {
            name: "date",
            field: Field::InvoiceDate,
            pattern: &DATE,
            group: 1,
            fallback: false,
        },
        Rule {
            name: "total_amount",
            field: Field::TotalAmount,
            pattern: &TOTAL_AMOUNT,
            group: 1,
            fallback: false,
        },
    ];
}
