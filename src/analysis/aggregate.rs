// Reducers turning a slice of rows into small summary tables.

use std::collections::HashMap;
use std::hash::Hash;

use crate::analysis::table::{tier_rows, Record, Tier, OUTCOME_AVERAGE, OUTCOME_QUOTIENT};

/// How many coalitions are kept in the coalition summaries.
pub const TOP_COALITIONS: usize = 10;

fn tally<K: Eq + Hash>(keys: impl Iterator<Item = K>) -> HashMap<K, u64> {
    let mut counts: HashMap<K, u64> = HashMap::new();
    for k in keys {
        *counts.entry(k).or_insert(0) += 1;
    }
    counts
}

/// Frequency of a categorical column, most frequent first.
///
/// Equal counts are ordered by ascending category label, so the output does not
/// depend on hash iteration order.
fn count_desc<F>(rows: &[&Record], key: F) -> Vec<(String, u64)>
where
    F: Fn(&Record) -> &str,
{
    let mut res: Vec<(String, u64)> =
        tally(rows.iter().map(|&r| key(r).to_string())).into_iter().collect();
    res.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
    res
}

/// Distribution of the race column.
pub fn race_counts(rows: &[&Record]) -> Vec<(String, u64)> {
    count_desc(rows, |r: &Record| r.race.as_str())
}

/// The `k` most frequent coalition labels.
pub fn top_coalitions(rows: &[&Record], k: usize) -> Vec<(String, u64)> {
    let mut res = count_desc(rows, |r: &Record| r.coalition.as_str());
    res.truncate(k);
    res
}

/// Distribution of ages at inauguration, youngest first.
pub fn age_counts(rows: &[&Record]) -> Vec<(u32, u64)> {
    let mut res: Vec<(u32, u64)> = tally(rows.iter().map(|r| r.age)).into_iter().collect();
    res.sort_by_key(|(age, _)| *age);
    res
}

/// The election-mode breakdown of one tier, in percent of the tier's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeShare {
    pub tier: Tier,
    pub pct_quotient: f64,
    pub pct_average: f64,
}

/// Percentage of each election mode per tier, in the fixed tier order
/// (all sizes first). An empty tier yields 0/0 rather than a division error.
pub fn outcome_shares(records: &[Record]) -> Vec<OutcomeShare> {
    Tier::ALL
        .iter()
        .map(|&tier| {
            let rows = tier_rows(records, tier);
            if rows.is_empty() {
                return OutcomeShare {
                    tier,
                    pct_quotient: 0.0,
                    pct_average: 0.0,
                };
            }
            let total = rows.len() as f64;
            let quotient = rows.iter().filter(|r| r.outcome == OUTCOME_QUOTIENT).count();
            let average = rows.iter().filter(|r| r.outcome == OUTCOME_AVERAGE).count();
            OutcomeShare {
                tier,
                pct_quotient: quotient as f64 / total * 100.0,
                pct_average: average as f64 / total * 100.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(size: &str, coalition: &str, race: &str, age: u32, outcome: &str) -> Record {
        Record {
            municipality_size: size.to_string(),
            coalition: coalition.to_string(),
            race: race.to_string(),
            age,
            outcome: outcome.to_string(),
        }
    }

    fn refs(records: &[Record]) -> Vec<&Record> {
        records.iter().collect()
    }

    #[test]
    fn race_counts_are_descending_with_label_tiebreak() {
        let records = vec![
            record("PEQUENO", "MDB", "PARDA", 40, OUTCOME_QUOTIENT),
            record("PEQUENO", "MDB", "BRANCA", 41, OUTCOME_QUOTIENT),
            record("PEQUENO", "MDB", "PARDA", 42, OUTCOME_QUOTIENT),
            record("PEQUENO", "MDB", "PRETA", 43, OUTCOME_QUOTIENT),
        ];
        let counts = race_counts(&refs(&records));
        assert_eq!(
            counts,
            vec![
                ("PARDA".to_string(), 2),
                // BRANCA and PRETA tie at one row each: label order applies.
                ("BRANCA".to_string(), 1),
                ("PRETA".to_string(), 1),
            ]
        );
    }

    #[test]
    fn categorical_counts_sum_to_row_count() {
        let records: Vec<Record> = (0..17)
            .map(|i| {
                record(
                    "PEQUENO",
                    ["MDB", "PT", "PL"][i % 3],
                    ["BRANCA", "PARDA"][i % 2],
                    30 + i as u32,
                    OUTCOME_QUOTIENT,
                )
            })
            .collect();
        let rows = refs(&records);
        let total: u64 = race_counts(&rows).iter().map(|(_, c)| c).sum();
        assert_eq!(total, 17);
    }

    #[test]
    fn top_coalitions_truncates_after_sorting() {
        // Twelve distinct coalitions, "C00" appearing twice.
        let mut records = vec![record("PEQUENO", "C00", "BRANCA", 40, OUTCOME_QUOTIENT)];
        for i in 0..12 {
            records.push(record(
                "PEQUENO",
                &format!("C{:02}", i),
                "BRANCA",
                40,
                OUTCOME_QUOTIENT,
            ));
        }
        let top = top_coalitions(&refs(&records), TOP_COALITIONS);
        assert_eq!(top.len(), TOP_COALITIONS);
        assert_eq!(top[0], ("C00".to_string(), 2));
        assert!(top.iter().skip(1).all(|(_, c)| *c == 1));
    }

    #[test]
    fn age_counts_are_sorted_by_age() {
        let records = vec![
            record("PEQUENO", "MDB", "BRANCA", 61, OUTCOME_QUOTIENT),
            record("PEQUENO", "MDB", "BRANCA", 35, OUTCOME_QUOTIENT),
            record("PEQUENO", "MDB", "BRANCA", 61, OUTCOME_QUOTIENT),
            record("PEQUENO", "MDB", "BRANCA", 47, OUTCOME_QUOTIENT),
        ];
        let counts = age_counts(&refs(&records));
        assert_eq!(counts, vec![(35, 1), (47, 1), (61, 2)]);
    }

    #[test]
    fn empty_rows_yield_empty_aggregates() {
        let rows: Vec<&Record> = Vec::new();
        assert!(race_counts(&rows).is_empty());
        assert!(top_coalitions(&rows, TOP_COALITIONS).is_empty());
        assert!(age_counts(&rows).is_empty());
    }

    #[test]
    fn outcome_shares_match_reference_breakdown() {
        // 3 small rows (2 quotient, 1 average), 3 medium rows (1 quotient,
        // 2 average), nothing large.
        let records = vec![
            record("PEQUENO", "MDB", "BRANCA", 40, OUTCOME_QUOTIENT),
            record("PEQUENO", "MDB", "BRANCA", 41, OUTCOME_QUOTIENT),
            record("PEQUENO", "MDB", "BRANCA", 42, OUTCOME_AVERAGE),
            record("MÉDIO", "MDB", "BRANCA", 43, OUTCOME_QUOTIENT),
            record("MÉDIO", "MDB", "BRANCA", 44, OUTCOME_AVERAGE),
            record("MÉDIO", "MDB", "BRANCA", 45, OUTCOME_AVERAGE),
        ];
        let shares = outcome_shares(&records);
        assert_eq!(shares.len(), 4);

        assert_eq!(shares[0].tier, Tier::Total);
        assert!((shares[0].pct_quotient - 50.0).abs() < 1e-9);
        assert!((shares[0].pct_average - 50.0).abs() < 1e-9);

        assert_eq!(shares[1].tier, Tier::Pequeno);
        assert!((shares[1].pct_quotient - 200.0 / 3.0).abs() < 1e-9);
        assert!((shares[1].pct_average - 100.0 / 3.0).abs() < 1e-9);

        assert_eq!(shares[2].tier, Tier::Medio);
        assert!((shares[2].pct_quotient - 100.0 / 3.0).abs() < 1e-9);
        assert!((shares[2].pct_average - 200.0 / 3.0).abs() < 1e-9);

        assert_eq!(shares[3].tier, Tier::Grande);
        assert_eq!(shares[3].pct_quotient, 0.0);
        assert_eq!(shares[3].pct_average, 0.0);
    }

    #[test]
    fn outcome_shares_of_nonempty_tiers_sum_to_hundred() {
        let records = vec![
            record("PEQUENO", "MDB", "BRANCA", 40, OUTCOME_QUOTIENT),
            record("PEQUENO", "MDB", "BRANCA", 41, OUTCOME_AVERAGE),
            record("GRANDE", "MDB", "BRANCA", 42, OUTCOME_AVERAGE),
        ];
        for share in outcome_shares(&records) {
            let sum = share.pct_quotient + share.pct_average;
            if share.tier == Tier::Medio {
                assert_eq!(sum, 0.0);
            } else {
                assert!((sum - 100.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn outcome_shares_of_empty_table() {
        let shares = outcome_shares(&[]);
        assert_eq!(shares.len(), 4);
        assert!(shares.iter().all(|s| s.pct_quotient == 0.0 && s.pct_average == 0.0));
    }
}
