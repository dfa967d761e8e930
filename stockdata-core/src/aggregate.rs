//! Aggregate table — every fetched symbol's rows stacked in request order.

use chrono::NaiveDateTime;

use crate::domain::BarRow;

/// Non-empty, ordered concatenation of per-symbol rows.
///
/// Rows appear in symbol-request order, and within a symbol in the order the
/// provider delivered them. A table with no rows cannot be constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    rows: Vec<BarRow>,
    /// Row count of each non-empty part, in order.
    blocks: Vec<usize>,
}

/// One contiguous symbol block of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSummary {
    pub symbol: String,
    pub rows: usize,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

impl AggregateTable {
    /// Stack the parts in order. Returns `None` if no part has rows.
    pub fn concat<I>(parts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec<BarRow>>,
    {
        let mut rows = Vec::new();
        let mut blocks = Vec::new();
        for part in parts {
            if !part.is_empty() {
                blocks.push(part.len());
                rows.extend(part);
            }
        }
        if rows.is_empty() {
            None
        } else {
            Some(Self { rows, blocks })
        }
    }

    pub fn rows(&self) -> &[BarRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Per-block row counts and date span. A symbol requested twice shows up
    /// as two blocks.
    pub fn summary(&self) -> Vec<SymbolSummary> {
        let mut out = Vec::with_capacity(self.blocks.len());
        let mut start = 0;
        for &len in &self.blocks {
            let block = &self.rows[start..start + len];
            start += len;
            if let (Some(first), Some(last)) = (block.first(), block.last()) {
                out.push(SymbolSummary {
                    symbol: first.symbol.clone(),
                    rows: len,
                    first: first.date,
                    last: last.date,
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fetch::normalize;
    use crate::data::memory::synthetic_bars;

    #[test]
    fn all_empty_parts_yield_none() {
        assert!(AggregateTable::concat(Vec::<Vec<BarRow>>::new()).is_none());
        assert!(AggregateTable::concat(vec![Vec::new(), Vec::new()]).is_none());
    }

    #[test]
    fn stacks_in_part_order() {
        let a = normalize("A", synthetic_bars(3));
        let b = normalize("B", synthetic_bars(5));
        let table = AggregateTable::concat(vec![a.clone(), b.clone()]).unwrap();

        assert_eq!(table.len(), 8);
        assert_eq!(&table.rows()[..3], a.as_slice());
        assert_eq!(&table.rows()[3..], b.as_slice());
    }

    #[test]
    fn summary_per_block() {
        let table = AggregateTable::concat(vec![
            normalize("TCS", synthetic_bars(3)),
            normalize("INFY", synthetic_bars(2)),
            normalize("TCS", synthetic_bars(1)),
        ])
        .unwrap();

        let summary = table.summary();
        let names: Vec<&str> = summary.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["TCS", "INFY", "TCS"]);
        assert_eq!(summary[0].rows, 3);
        assert!(summary[0].first < summary[0].last);
        assert_eq!(summary[2].rows, 1);
    }

    #[test]
    fn repeated_symbol_keeps_separate_blocks() {
        let table = AggregateTable::concat(vec![
            normalize("TCS", synthetic_bars(1)),
            Vec::new(),
            normalize("TCS", synthetic_bars(1)),
        ])
        .unwrap();

        let summary = table.summary();
        assert_eq!(summary.len(), 2);
        assert!(summary.iter().all(|s| s.symbol == "TCS" && s.rows == 1));
    }
}
