//! Line-item table parsing.
//!
//! The item table is bounded above by a header line naming the description,
//! quantity and price columns, and below by the first totals line. Rows in
//! between are parsed token by token; a row that cannot be read completely
//! is dropped rather than guessed at.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::invoice::LineItem;

use super::rules::{parse_amount, PatternSet};

/// Words that end the item table.
const TOTALS_WORDS: &[&str] = &["subtotal", "total", "tax"];

/// Minimum whitespace-separated tokens for a row candidate.
const MIN_ROW_TOKENS: usize = 3;

/// Where the scanner is relative to the item table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// Looking for the column header line.
    SeekingHeader,
    /// Between the header and the totals section.
    InTable,
    /// Past the totals line; nothing more is read.
    Done,
}

/// Parses the line-item table out of raw text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineItemTableParser;

impl LineItemTableParser {
    pub fn new() -> Self {
        Self
    }

    /// Items in document order. An empty result is not an error.
    pub fn parse(&self, text: &str, patterns: &PatternSet) -> Vec<LineItem> {
        let mut scanner = TableScanner::new(patterns);
        for line in text.lines() {
            if scanner.feed(line) == TableState::Done {
                break;
            }
        }

        debug!(
            items = scanner.items.len(),
            dropped = scanner.dropped,
            state = ?scanner.state,
            "item table parsed"
        );
        scanner.items
    }
}

struct TableScanner<'p> {
    patterns: &'p PatternSet,
    state: TableState,
    items: Vec<LineItem>,
    dropped: usize,
}

impl<'p> TableScanner<'p> {
    fn new(patterns: &'p PatternSet) -> Self {
        Self {
            patterns,
            state: TableState::SeekingHeader,
            items: Vec::new(),
            dropped: 0,
        }
    }

    fn feed(&mut self, line: &str) -> TableState {
        let line = line.trim();

        match self.state {
            TableState::SeekingHeader => {
                if is_header(line) {
                    trace!(line, "item table header");
                    self.state = TableState::InTable;
                }
            }
            TableState::InTable if line.is_empty() => {}
            TableState::InTable => {
                if is_totals_line(line) {
                    trace!(line, "item table end");
                    self.state = TableState::Done;
                } else if self.is_row_candidate(line) {
                    match parse_row(line) {
                        Some(item) => self.items.push(item),
                        None => {
                            trace!(line, "dropped incomplete row");
                            self.dropped += 1;
                        }
                    }
                }
            }
            TableState::Done => {}
        }

        self.state
    }

    fn is_row_candidate(&self, line: &str) -> bool {
        self.patterns.row_amount.is_match(line) && line.split_whitespace().count() >= MIN_ROW_TOKENS
    }
}

fn is_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("description")
        && (lower.contains("qty") || lower.contains("quantity"))
        && lower.contains("price")
}

fn is_totals_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    TOTALS_WORDS.iter().any(|word| lower.contains(word))
}

fn is_integer(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Description is every token before the first integer or `$` token; then
/// the first integer is the quantity and the first parseable `$` token the
/// unit price. Any printed row total is ignored.
fn parse_row(line: &str) -> Option<LineItem> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let desc_end = tokens
        .iter()
        .position(|t| is_integer(t) || t.starts_with('$'))
        .unwrap_or(tokens.len());

    let description = tokens[..desc_end].join(" ");
    let rest = &tokens[desc_end..];

    let quantity = rest
        .iter()
        .find(|t| is_integer(t))
        .and_then(|t| Decimal::from_str(t).ok())?;
    let unit_price = rest
        .iter()
        .filter(|t| t.starts_with('$'))
        .find_map(|t| parse_amount(t))?;

    LineItem::new(description, quantity, unit_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SAMPLE_INVOICE;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parse(text: &str) -> Vec<LineItem> {
        LineItemTableParser::new().parse(text, &PatternSet::new())
    }

    #[test]
    fn test_single_row_stops_at_subtotal() {
        let text = "Description Qty Unit Price Total\n\
                    Consulting Services 10 $150.00 $1,500.00\n\
                    Subtotal: $2,600.00\n";
        let items = parse(text);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description(), "Consulting Services");
        assert_eq!(items[0].quantity(), dec("10"));
        assert_eq!(items[0].unit_price(), dec("150.00"));
        assert_eq!(items[0].total(), dec("1500.00"));
    }

    #[test]
    fn test_sample_invoice_rows() {
        let items = parse(SAMPLE_INVOICE);
        let descriptions: Vec<&str> = items.iter().map(LineItem::description).collect();

        assert_eq!(
            descriptions,
            vec!["Consulting Services", "Software License", "Support Package"]
        );
        assert_eq!(items[2].total(), dec("600.00"));
    }

    #[test]
    fn test_printed_total_is_not_trusted() {
        let text = "Description Qty Price Amount\nWidget 3 $2.50 $9.99\n";
        let items = parse(text);
        assert_eq!(items[0].total(), dec("7.50"));
        assert_ne!(items[0].total(), dec("9.99"));
    }

    #[test]
    fn test_partial_decimal_unit_prices() {
        let text = "Description Qty Unit Price Total\n\
                    Pencil 10 $.50 $5.00\n\
                    Widget 2 $12. $24.00\n";
        let items = parse(text);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].unit_price(), dec("0.50"));
        assert_eq!(items[0].total(), dec("5.00"));
        assert_eq!(items[1].unit_price(), dec("12"));
        assert_eq!(items[1].total(), dec("24"));
    }

    #[test]
    fn test_rows_before_header_are_ignored() {
        let text = "Widget 3 $2.50 $7.50\nDescription Quantity Unit Price\nGadget 1 $4.00 $4.00\n";
        let items = parse(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description(), "Gadget");
    }

    #[test]
    fn test_rows_after_totals_are_ignored() {
        let text = "Description Qty Price\nA thing 1 $1.00\nTax: $0.10\nLate row 2 $5.00\n";
        let items = parse(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description(), "A thing");
    }

    #[test]
    fn test_incomplete_rows_are_dropped() {
        let text = "Description Qty Price\n\
                    Shipping flat $12.00 fee\n\
                    Hours 0 $80.00\n\
                    10 $5.00 $50.00\n\
                    Labor 4 $80.00 $320.00\n";
        let items = parse(text);

        // no quantity, zero quantity, no description
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description(), "Labor");
        assert_eq!(items[0].total(), dec("320.00"));
    }

    #[test]
    fn test_lines_without_dollar_token_are_not_rows() {
        let text = "Description Qty Price\nNote: prices in USD 2 1.00\nPen 2 $1.00\n";
        let items = parse(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description(), "Pen");
    }

    #[test]
    fn test_no_header_yields_empty() {
        assert!(parse("Consulting Services 10 $150.00 $1,500.00").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_scanner_states() {
        let patterns = PatternSet::new();
        let mut scanner = TableScanner::new(&patterns);

        assert_eq!(scanner.feed("ACME"), TableState::SeekingHeader);
        assert_eq!(scanner.feed("Description Qty Unit Price"), TableState::InTable);
        assert_eq!(scanner.feed(""), TableState::InTable);
        assert_eq!(scanner.feed("Total: $3.00"), TableState::Done);
        assert_eq!(scanner.feed("Description Qty Unit Price"), TableState::Done);
    }
}
