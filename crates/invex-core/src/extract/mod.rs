//! Invoice field extraction.
//!
//! Extraction is a pure function of the input text: a fixed table of rules
//! ([`rules::RULES`]) is applied in order, and for each field the first rule
//! that matches anywhere in the text wins. When a field has several
//! candidates (two dates, a subtotal before the total) the leftmost one is
//! returned; no attempt is made to rank them.

pub mod patterns;
pub mod rules;

use serde::Serialize;
use tracing::{debug, trace};

use crate::models::config::ExtractionConfig;
use crate::models::fields::{ExtractedFields, Field};

pub use rules::{Rule, RULES};

/// A value produced by a rule, with its location in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    /// Field filled by the match.
    pub field: Field,
    /// Name of the rule that matched.
    pub rule: &'static str,
    /// Matched value.
    pub value: String,
    /// Byte range of the value in the source text.
    pub position: (usize, usize),
}

/// Rule-based invoice field extractor.
///
/// Holds no per-call state; a single instance can be shared between threads.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    loose_invoice_number: bool,
}

impl FieldExtractor {
    /// Create an extractor with all rules enabled.
    pub fn new() -> Self {
        Self {
            loose_invoice_number: true,
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_loose_invoice_number(config.loose_invoice_number)
    }

    /// Enable or disable the bare "Invoice <token>" fallback.
    pub fn with_loose_invoice_number(mut self, enabled: bool) -> Self {
        self.loose_invoice_number = enabled;
        self
    }

    /// Rules this extractor consults, in priority order.
    pub fn rules(&self) -> impl Iterator<Item = &'static Rule> + '_ {
        RULES
            .iter()
            .filter(move |rule| !rule.fallback || self.loose_invoice_number)
    }

    /// Extract all fields from text. Fields without a match are `None`.
    pub fn extract(&self, text: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::default();
        for m in self.explain(text) {
            *fields.slot_mut(m.field) = Some(m.value);
        }
        fields
    }

    /// Like [`extract`](Self::extract), but reports which rule produced each
    /// value and where it was found.
    pub fn explain(&self, text: &str) -> Vec<FieldMatch> {
        let mut matches: Vec<FieldMatch> = Vec::with_capacity(Field::ALL.len());

        for rule in self.rules() {
            if matches.iter().any(|m| m.field == rule.field) {
                continue;
            }

            trace!("Trying rule {}", rule.name);
            if let Some(m) = rule.find(text) {
                debug!("Rule {} matched {:?} at {}..{}", rule.name, m.as_str(), m.start(), m.end());
                matches.push(FieldMatch {
                    field: rule.field,
                    rule: rule.name,
                    value: m.as_str().to_string(),
                    position: (m.start(), m.end()),
                });
            }
        }

        debug!(
            "Extracted {}/{} fields from {} bytes of text",
            matches.len(),
            Field::ALL.len(),
            text.len()
        );
        matches
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract fields with the default rule set.
pub fn extract_fields(text: &str) -> ExtractedFields {
    FieldExtractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(number: Option<&str>, date: Option<&str>, total: Option<&str>) -> ExtractedFields {
        ExtractedFields {
            invoice_number: number.map(String::from),
            invoice_date: date.map(String::from),
            total_amount: total.map(String::from),
        }
    }

    #[test]
    fn test_hash_marker_invoice() {
        let result = extract_fields("Invoice #12345 Total: $1,234.56 Date: 18/08/2025");
        assert_eq!(result, fields(Some("12345"), Some("18/08/2025"), Some("1,234.56")));
    }

    #[test]
    fn test_multiline_invoice() {
        let result = extract_fields("Invoice No: ABC-99\nGrand Total 999.99\n2025-08-18");
        assert_eq!(result, fields(Some("ABC-99"), Some("2025-08-18"), Some("999.99")));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_fields(""), ExtractedFields::default());
        assert_eq!(extract_fields("   \n\t"), ExtractedFields::default());
    }

    #[test]
    fn test_no_recognizable_fields() {
        let result = extract_fields("Thank you for shopping with us!\nSee you soon.");
        assert!(result.is_empty());
    }

    #[test]
    fn test_fields_are_independent() {
        let result = extract_fields("Amount Due: $75.00");
        assert_eq!(result, fields(None, None, Some("75.00")));

        let result = extract_fields("Issued 3 March 2024");
        assert_eq!(result, fields(None, Some("3 March 2024"), None));
    }

    #[test]
    fn test_leftmost_total_wins_over_label() {
        // "Subtotal" contains the "Total" label, and it comes first.
        let result = extract_fields("Subtotal: 10.00\nTax: 1.00\nGrand Total: 55.00");
        assert_eq!(result.total_amount.as_deref(), Some("10.00"));

        let result = extract_fields("Grand Total: 55.00\nTotal: 10.00");
        assert_eq!(result.total_amount.as_deref(), Some("55.00"));

        let result = extract_fields("Balance 3.50 then Total Amount: 99.00");
        assert_eq!(result.total_amount.as_deref(), Some("3.50"));
    }

    #[test]
    fn test_total_without_decimals_is_absent() {
        assert_eq!(extract_fields("Total: 100").total_amount, None);
        assert_eq!(extract_fields("Total: $1,000").total_amount, None);
    }

    #[test]
    fn test_total_followed_by_currency_code() {
        assert_eq!(extract_fields("Total:12.00USD").total_amount.as_deref(), Some("12.00"));
        assert_eq!(extract_fields("TOTAL 12.00EUR").total_amount.as_deref(), Some("12.00"));
        assert_eq!(extract_fields("Total: 100.505").total_amount, None);
    }

    #[test]
    fn test_unlabeled_amount_is_absent() {
        assert_eq!(extract_fields("Paid $20.00 in cash").total_amount, None);
    }

    #[test]
    fn test_date_not_calendar_validated() {
        let result = extract_fields("Date: 32/13/2025");
        assert_eq!(result.invoice_date.as_deref(), Some("32/13/2025"));
    }

    #[test]
    fn test_earliest_date_wins_over_shape_order() {
        let result = extract_fields("Issued 1 Aug 2025, due 2025-09-01, paid 15/09/2025");
        assert_eq!(result.invoice_date.as_deref(), Some("1 Aug 2025"));

        let result = extract_fields("2025-09-01 then 15/09/2025");
        assert_eq!(result.invoice_date.as_deref(), Some("2025-09-01"));
    }

    #[test]
    fn test_strict_invoice_rule_beats_earlier_loose_match() {
        let result = extract_fields("Invoice\nInvoice No: ABC-1");
        assert_eq!(result.invoice_number.as_deref(), Some("ABC-1"));
    }

    #[test]
    fn test_loose_invoice_number() {
        let result = extract_fields("INVOICE 2024-0042");
        assert_eq!(result.invoice_number.as_deref(), Some("2024-0042"));

        let strict = FieldExtractor::new().with_loose_invoice_number(false);
        assert_eq!(strict.extract("INVOICE 2024-0042").invoice_number, None);
        assert_eq!(
            strict.extract("Invoice # 2024-0042").invoice_number.as_deref(),
            Some("2024-0042")
        );
    }

    #[test]
    fn test_invoice_word_without_number() {
        let result = extract_fields("Invoices listed below\nTotal 5.00");
        assert_eq!(result, fields(None, None, Some("5.00")));

        assert_eq!(extract_fields("Invoice - 12").invoice_number, None);
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig {
            loose_invoice_number: false,
        };
        let extractor = FieldExtractor::from_config(&config);
        assert!(extractor.rules().all(|r| !r.fallback));
    }

    #[test]
    fn test_idempotent() {
        let extractor = FieldExtractor::new();
        let text = "Invoice #A-1\nDate 05/06/2024\nTotal $12.00";
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }

    #[test]
    fn test_explain_reports_rule_and_position() {
        let text = "Invoice 77 Total 1.00";
        let matches = FieldExtractor::new().explain(text);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].field, Field::InvoiceNumber);
        assert_eq!(matches[0].rule, "invoice_number_loose");
        assert_eq!(matches[0].position, (8, 10));
        assert_eq!(matches[1].rule, "total_amount");
        assert_eq!(&text[matches[1].position.0..matches[1].position.1], "1.00");
    }

    #[test]
    fn test_concurrent_extraction() {
        let extractor = &FieldExtractor::new();
        let texts: Vec<String> = (0..8)
            .map(|i| format!("Invoice #N-{i}\nTotal: {i}.00\n0{i}/01/2025"))
            .collect();

        std::thread::scope(|s| {
            let handles: Vec<_> = texts
                .iter()
                .map(|text| s.spawn(move || extractor.extract(text)))
                .collect();

            for (i, handle) in handles.into_iter().enumerate() {
                let result = handle.join().unwrap();
                assert_eq!(result.invoice_number, Some(format!("N-{i}")));
                assert_eq!(result.total_amount, Some(format!("{i}.00")));
                assert_eq!(result.invoice_date, Some(format!("0{i}/01/2025")));
            }
        });
    }
}
