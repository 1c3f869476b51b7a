use chrono::NaiveDate;
use std::collections::BTreeMap;

/// The per-field mean of every point sharing one `(date, key)` group.
#[derive(Debug, Clone, PartialEq)]
pub struct DateAverage<K, const N: usize> {
    pub date: NaiveDate,
    pub key: K,
    pub values: [f64; N],
    pub count: usize,
}

/// Groups points by date and tag, averaging `N` numeric fields per group.
///
/// `group_key` returns `None` for points that carry no date; those are
/// skipped. Groups are only created for observed keys, so no group is ever
/// emitted with zero members. Output is ascending by date, then by key.
pub fn aggregate_by_date_averaged<T, K, const N: usize>(
    points: &[T],
    group_key: impl Fn(&T) -> Option<(NaiveDate, K)>,
    value_fields: impl Fn(&T) -> [f64; N],
) -> Vec<DateAverage<K, N>>
where
    K: Ord,
{
    let mut groups: BTreeMap<(NaiveDate, K), ([f64; N], usize)> = BTreeMap::new();
    for point in points {
        let Some(key) = group_key(point) else {
            continue;
        };
        let values = value_fields(point);
        let (sums, count) = groups.entry(key).or_insert(([0.0; N], 0));
        for (sum, value) in sums.iter_mut().zip(values) {
            *sum += value;
        }
        *count += 1;
    }

    groups
        .into_iter()
        .map(|((date, key), (sums, count))| DateAverage {
            date,
            key,
            values: sums.map(|sum| sum / count as f64),
            count,
        })
        .collect()
}
