//! Null-ignoring column aggregates.
//!
//! Every function skips `None` entries and reports `None` when nothing is
//! left to aggregate.

pub fn max<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().fold(None, |acc, v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v),
    })
}

pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

pub fn any_present<I>(values: I) -> bool
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().any(|v| v.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_skips_nulls() {
        assert_eq!(max([None, Some(3.0), Some(-1.0), None, Some(7.5)]), Some(7.5));
        assert_eq!(max([None, None]), None);
        assert_eq!(max(Vec::<Option<f64>>::new()), None);
    }

    #[test]
    fn mean_skips_nulls() {
        assert_eq!(mean([Some(1.0), None, Some(2.0), Some(6.0)]), Some(3.0));
        assert_eq!(mean([None]), None);
    }

    #[test]
    fn any_present_detects_single_value() {
        assert!(any_present([None, None, Some(0.0)]));
        assert!(!any_present([None, None]));
    }
}
