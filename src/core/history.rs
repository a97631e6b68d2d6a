//! In-memory log of completed conversions.

use serde::Serialize;

/// A completed conversion. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub base: String,
    pub target: String,
    pub exchange_rate: f64,
    pub amount: f64,
    pub converted_amount: f64,
}

/// The projection of a record handed to the advice collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSummary {
    pub exchange_rate: f64,
    pub amount: f64,
    pub converted_amount: f64,
}

/// Append-only conversion history for the lifetime of the process.
///
/// Owned by the caller and passed down explicitly so tests can use an
/// isolated instance.
#[derive(Debug, Default)]
pub struct HistoryLog {
    records: Vec<HistoryRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends unconditionally; no validation, no deduplication.
    pub fn append(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    /// Returns summaries of all records whose base/target exactly match
    /// the given pair, in insertion order. Always a fresh Vec.
    pub fn query(&self, from: &str, to: &str) -> Vec<TradeSummary> {
        self.records
            .iter()
            .filter(|r| r.base == from && r.target == to)
            .map(|r| TradeSummary {
                exchange_rate: r.exchange_rate,
                amount: r.amount,
                converted_amount: r.converted_amount,
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(base: &str, target: &str, amount: f64) -> HistoryRecord {
        HistoryRecord {
            base: base.to_string(),
            target: target.to_string(),
            exchange_rate: 0.85,
            amount,
            converted_amount: amount * 0.85,
        }
    }

    #[test]
    fn test_query_filters_exact_pair() {
        let mut log = HistoryLog::new();
        log.append(record("USD", "EUR", 100.0));
        log.append(record("USD", "JPY", 200.0));
        log.append(record("EUR", "USD", 300.0));
        log.append(record("USD", "EUR", 400.0));

        let matches = log.query("USD", "EUR");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].amount, 100.0);
        assert_eq!(matches[1].amount, 400.0);
    }

    #[test]
    fn test_query_no_match_is_empty() {
        let mut log = HistoryLog::new();
        log.append(record("USD", "EUR", 100.0));
        assert!(log.query("GBP", "EUR").is_empty());
        // The reverse direction of a pair is a different pair.
        assert!(log.query("EUR", "USD").is_empty());
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut log = HistoryLog::new();
        for amount in [3.0, 1.0, 2.0] {
            log.append(record("USD", "EUR", amount));
        }
        let amounts: Vec<f64> = log.query("USD", "EUR").iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![3.0, 1.0, 2.0]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_trade_summary_serializes_camel_case() {
        let summary = TradeSummary {
            exchange_rate: 0.85,
            amount: 100.0,
            converted_amount: 85.0,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["exchangeRate"], 0.85);
        assert_eq!(json["convertedAmount"], 85.0);
    }
}
