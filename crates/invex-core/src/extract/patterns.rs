//! Regex patterns for invoice field extraction.
//!
//! Every pattern puts the value in capture group 1.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "Invoice No: ABC-99", "Invoice #12345", "Invoice Number - 77"
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)invoice\s*(?:number|no\b\.?|#)\s*[:\-]?\s*([A-Za-z0-9][A-Za-z0-9\-]*)"
    ).unwrap();

    // Bare marker: "Invoice 12345", "Invoice: X-1". "Invoice" must end the
    // word, so "Invoices" is not a marker.
    pub static ref INVOICE_NUMBER_LOOSE: Regex = Regex::new(
        r"(?i)invoice\b\s*#?:?\s*([A-Za-z0-9][A-Za-z0-9\-]*)"
    ).unwrap();

    // DD/MM/YYYY, YYYY-MM-DD or "18 Aug 2025". One alternation so the
    // earliest position wins over shape order. No calendar validation.
    pub static ref DATE: Regex = Regex::new(
        r"(\d{2}[/-]\d{2}[/-]\d{4}|\d{4}[/-]\d{2}[/-]\d{2}|\d{1,2}\s+\p{L}+\s+\d{4})"
    ).unwrap();

    // Labeled totals. Only the number is captured; "$" and the label are dropped.
    // The amount may run straight into a currency code ("12.00USD") but not
    // into a third fraction digit.
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"(?i)(?:grand\s*total|total\s*amount|amount\s*due|balance|total)\s*:?\s*\$?\s*((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})(?:\D|$)"
    ).unwrap();
}
