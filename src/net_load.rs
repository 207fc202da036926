use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use itertools::{Itertools, MinMaxResult};
use tracing::{info, warn};

use crate::{
    config::JoinPolicy,
    error::{Error, Result},
    model::series::{AggregatedRenewable, GenerationRecord, LoadRecord, NetLoadRecord},
};

/// Sums renewable output per timestamp, ordered by timestamp.
///
/// Non-renewable rows are dropped before grouping, so a timestamp that only has
/// non-renewable sources produces no aggregate at all.
pub fn aggregate_renewable(generation: &[GenerationRecord]) -> Vec<AggregatedRenewable> {
    let mut totals: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();
    for record in generation.iter().filter(|record| record.is_renewable) {
        *totals.entry(record.timestamp).or_default() += record.power_mw;
    }
    totals
        .into_iter()
        .map(|(timestamp, total_renewable_mw)| AggregatedRenewable {
            timestamp,
            total_renewable_mw,
        })
        .collect()
}

/// Net load rows in load-table order plus how many of them found renewable output.
#[derive(Debug, Clone, PartialEq)]
pub struct NetLoadTable {
    pub records: Vec<NetLoadRecord>,
    pub matched: usize,
    pub renewable_hours: usize,
}

impl NetLoadTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fraction of load rows that matched an aggregate, `None` for an empty table.
    pub fn match_rate(&self) -> Option<f64> {
        (!self.records.is_empty()).then(|| self.matched as f64 / self.records.len() as f64)
    }

    /// Flags a join that silently zero-filled (nearly) everything.
    ///
    /// Only meaningful when the generation side had renewable output to match against.
    pub fn check_join(&self, policy: &JoinPolicy) -> Result<()> {
        let Some(rate) = self.match_rate() else {
            return Ok(());
        };
        if self.renewable_hours == 0 || rate >= policy.min_match_rate {
            return Ok(());
        }
        let err = Error::JoinMismatch {
            matched: self.matched,
            total: self.records.len(),
            min_rate: policy.min_match_rate,
        };
        if policy.strict {
            return Err(err);
        }
        warn!(match_rate = rate, "{err}");
        Ok(())
    }

    pub fn summary(&self) -> Option<NetLoadSummary> {
        let values = self.records.iter().map(|record| record.net_load_mw);
        let (min_mw, max_mw) = match values.clone().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(value) => (value, value),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        let mean_mw = values.sum::<f64>() / self.records.len() as f64;
        Some(NetLoadSummary {
            rows: self.records.len(),
            matched: self.matched,
            min_mw,
            mean_mw,
            max_mw,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetLoadSummary {
    pub rows: usize,
    pub matched: usize,
    pub min_mw: f64,
    pub mean_mw: f64,
    pub max_mw: f64,
}

/// Left-joins load onto aggregated renewable output and derives net load.
///
/// Every load row yields exactly one record, in the original order; hours without
/// renewable output get `renewable_mw = 0`.
pub fn build_net_load(load: &[LoadRecord], generation: &[GenerationRecord]) -> NetLoadTable {
    let aggregates = aggregate_renewable(generation);
    let renewable: HashMap<DateTime<Utc>, f64> = aggregates
        .iter()
        .map(|aggregate| (aggregate.timestamp, aggregate.total_renewable_mw))
        .collect();

    let mut matched = 0;
    let records = load
        .iter()
        .map(|load| {
            let renewable_mw = renewable
                .get(&load.timestamp)
                .copied()
                .inspect(|_| matched += 1);
            NetLoadRecord::new(load, renewable_mw.unwrap_or(0.0))
        })
        .collect_vec();

    info!(
        load_rows = load.len(),
        generation_rows = generation.len(),
        renewable_hours = aggregates.len(),
        matched,
        "Built net load table"
    );
    NetLoadTable {
        records,
        matched,
        renewable_hours: aggregates.len(),
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn hour(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::hours(n)
    }

    fn load(n: i64, forecast_load_mw: f64) -> LoadRecord {
        LoadRecord {
            timestamp: hour(n),
            forecast_load_mw,
        }
    }

    fn generation(n: i64, power_mw: f64, is_renewable: bool) -> GenerationRecord {
        GenerationRecord {
            timestamp: hour(n),
            is_renewable,
            power_mw,
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let loads = [load(0, 100.0), load(1, 110.0), load(2, 90.0)];
        let generations = [
            generation(0, 30.0, true),
            generation(1, 5.0, true),
            generation(1, 100.0, false),
        ];

        let table = build_net_load(&loads, &generations);

        let net = table
            .records
            .iter()
            .map(|r| (r.timestamp, r.net_load_mw))
            .collect_vec();
        assert_eq!(net, [(hour(0), 70.0), (hour(1), 105.0), (hour(2), 90.0)]);
        assert_eq!(table.records[2].renewable_mw, 0.0);
        assert_eq!(table.matched, 2);
    }

    #[test]
    fn test_aggregation_sums_renewable_only() {
        let generations = [
            generation(3, 10.0, true),
            generation(3, 20.0, true),
            generation(3, 5.0, true),
            generation(3, 1000.0, false),
            generation(1, 7.0, true),
        ];

        let aggregates = aggregate_renewable(&generations);

        assert_eq!(
            aggregates,
            [
                AggregatedRenewable {
                    timestamp: hour(1),
                    total_renewable_mw: 7.0
                },
                AggregatedRenewable {
                    timestamp: hour(3),
                    total_renewable_mw: 35.0
                },
            ]
        );
    }

    #[test]
    fn test_non_renewable_only_hour_is_zero_filled() {
        let table = build_net_load(&[load(0, 50.0)], &[generation(0, 40.0, false)]);

        assert_eq!(table.records[0].renewable_mw, 0.0);
        assert_eq!(table.records[0].net_load_mw, 50.0);
        assert_eq!(table.matched, 0);
    }

    #[test]
    fn test_cardinality_and_order_follow_load() {
        let loads = [load(2, 1.0), load(0, 2.0), load(2, 3.0), load(5, 4.0)];
        let generations = [generation(2, 0.5, true), generation(9, 8.0, true)];

        let table = build_net_load(&loads, &generations);

        assert_eq!(table.len(), loads.len());
        for (record, load) in table.records.iter().zip(&loads) {
            assert_eq!(record.timestamp, load.timestamp);
            assert_eq!(record.forecast_load_mw, load.forecast_load_mw);
            assert_eq!(record.net_load_mw, record.forecast_load_mw - record.renewable_mw);
        }
        assert_eq!(table.matched, 2);
    }

    #[test]
    fn test_negative_net_load_is_kept() {
        let table = build_net_load(&[load(0, 10.0)], &[generation(0, 25.0, true)]);

        assert_eq!(table.records[0].net_load_mw, -15.0);
    }

    #[test]
    fn test_check_join_flags_mismatch() {
        let loads = (0..10).map(|n| load(n, 100.0)).collect_vec();
        let shifted = (0..10).map(|n| generation(n + 100, 10.0, true)).collect_vec();
        let table = build_net_load(&loads, &shifted);

        assert_eq!(table.match_rate(), Some(0.0));
        assert!(table.check_join(&JoinPolicy::default()).is_ok());

        let strict = JoinPolicy {
            strict: true,
            ..JoinPolicy::default()
        };
        assert!(matches!(
            table.check_join(&strict),
            Err(Error::JoinMismatch {
                matched: 0,
                total: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_check_join_ignores_missing_renewables() {
        let table = build_net_load(&[load(0, 100.0)], &[]);
        let strict = JoinPolicy {
            strict: true,
            ..JoinPolicy::default()
        };

        assert!(table.check_join(&strict).is_ok());
    }

    #[test]
    fn test_summary() {
        let loads = [load(0, 100.0), load(1, 50.0), load(2, 30.0)];
        let table = build_net_load(&loads, &[generation(1, 60.0, true)]);

        let summary = table.summary().unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.min_mw, -10.0);
        assert_eq!(summary.max_mw, 100.0);
        assert_eq!(summary.mean_mw, 40.0);
        assert!(build_net_load(&[], &[]).summary().is_none());
    }
}
