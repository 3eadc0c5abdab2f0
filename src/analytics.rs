//! Mood Analytics
//!
//! Small arithmetic helpers over mood entries: the slider-to-risk bucket,
//! rolling averages and per-day chart buckets.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

use crate::models::{ChartPoint, MoodAnalytics, MoodEntry, RiskLevel};
use crate::validation::{MOOD_MAX, MOOD_MIN};

/// Longest chart range accepted by the API
pub const MAX_CHART_DAYS: u32 = 365;

/// Map a 1-10 mood slider value to a risk bucket.
///
/// 1-3 is HIGH, 4-6 MEDIUM, 7-10 LOW. Out-of-range values are clamped.
pub fn risk_for_slider(value: u8) -> RiskLevel {
    match value.clamp(MOOD_MIN, MOOD_MAX) {
        1..=3 => RiskLevel::High,
        4..=6 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean mood value of entries dated within the last `days` days of `now`
pub fn average_since(entries: &[MoodEntry], now: NaiveDateTime, days: i64) -> Option<f64> {
    let cutoff = now - Duration::days(days);
    let values: Vec<f64> = entries
        .iter()
        .filter(|e| e.date >= cutoff)
        .map(|e| e.mood_value as f64)
        .collect();

    if values.is_empty() {
        return None;
    }
    Some(round2(values.iter().sum::<f64>() / values.len() as f64))
}

/// 7- and 30-day averages
pub fn summarize(entries: &[MoodEntry], now: NaiveDateTime) -> MoodAnalytics {
    MoodAnalytics {
        avg_7_days: average_since(entries, now, 7),
        avg_30_days: average_since(entries, now, 30),
    }
}

#[derive(Default)]
struct DayBucket {
    sum: f64,
    count: u32,
    high: u32,
    medium: u32,
    low: u32,
}

/// One bucket per day for the last `range_days` days, oldest first.
///
/// Entries without a risk count as LOW. Days without entries have no
/// average so the chart leaves a gap.
pub fn daily_chart(entries: &[MoodEntry], now: NaiveDateTime, range_days: u32) -> Vec<ChartPoint> {
    let range = range_days.clamp(1, MAX_CHART_DAYS) as i64;
    let end = now.date();
    let start = end - Duration::days(range - 1);

    let mut buckets: BTreeMap<NaiveDate, DayBucket> = (0..range)
        .map(|i| (start + Duration::days(i), DayBucket::default()))
        .collect();

    for entry in entries {
        if entry.date > now {
            continue;
        }
        let Some(bucket) = buckets.get_mut(&entry.date.date()) else {
            continue;
        };
        bucket.sum += entry.mood_value as f64;
        bucket.count += 1;
        match entry.risk {
            Some(RiskLevel::High) => bucket.high += 1,
            Some(RiskLevel::Medium) => bucket.medium += 1,
            _ => bucket.low += 1,
        }
    }

    buckets
        .into_iter()
        .map(|(day, b)| ChartPoint {
            date: day.format("%Y-%m-%d").to_string(),
            avg: if b.count > 0 {
                Some(round2(b.sum / b.count as f64))
            } else {
                None
            },
            count: b.count,
            high: b.high,
            medium: b.medium,
            low: b.low,
        })
        .collect()
}

/// Entries across all chart buckets; zero triggers the empty-state hint
pub fn total_entries(points: &[ChartPoint]) -> u32 {
    points.iter().map(|p| p.count).sum()
}

/// Latest entry by date
pub fn latest_entry(entries: &[MoodEntry]) -> Option<&MoodEntry> {
    entries.iter().max_by_key(|e| e.date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn entry(id: i64, date: NaiveDateTime, value: u8, risk: Option<RiskLevel>) -> MoodEntry {
        MoodEntry {
            id,
            user_id: Some(1),
            date,
            text: None,
            mood_value: value,
            risk,
            sentiment: None,
        }
    }

    #[test]
    fn test_slider_buckets() {
        assert_eq!(risk_for_slider(1), RiskLevel::High);
        assert_eq!(risk_for_slider(3), RiskLevel::High);
        assert_eq!(risk_for_slider(4), RiskLevel::Medium);
        assert_eq!(risk_for_slider(6), RiskLevel::Medium);
        assert_eq!(risk_for_slider(7), RiskLevel::Low);
        assert_eq!(risk_for_slider(10), RiskLevel::Low);
        assert_eq!(risk_for_slider(0), RiskLevel::High);
        assert_eq!(risk_for_slider(42), RiskLevel::Low);
    }

    #[test]
    fn test_averages_respect_window() {
        let now = at(31, 12);
        let entries = vec![
            entry(1, at(30, 9), 8, None),
            entry(2, at(27, 9), 5, None),
            entry(3, at(10, 9), 2, None),
        ];

        let summary = summarize(&entries, now);
        assert_eq!(summary.avg_7_days, Some(6.5));
        assert_eq!(summary.avg_30_days, Some(5.0));
        assert_eq!(average_since(&[], now, 7), None);
    }

    #[test]
    fn test_average_rounds_to_two_decimals() {
        let now = at(31, 12);
        let entries = vec![
            entry(1, at(30, 9), 7, None),
            entry(2, at(30, 10), 7, None),
            entry(3, at(30, 11), 8, None),
        ];
        assert_eq!(average_since(&entries, now, 7), Some(7.33));
    }

    #[test]
    fn test_daily_chart_buckets() {
        let now = at(10, 18);
        let entries = vec![
            entry(1, at(10, 8), 2, Some(RiskLevel::High)),
            entry(2, at(10, 9), 6, Some(RiskLevel::Medium)),
            entry(3, at(8, 9), 9, None),
            entry(4, at(1, 9), 5, Some(RiskLevel::Low)),
        ];

        let chart = daily_chart(&entries, now, 7);
        assert_eq!(chart.len(), 7);
        assert_eq!(chart.first().unwrap().date, "2024-03-04");
        let today = chart.last().unwrap();
        assert_eq!(today.date, "2024-03-10");
        assert_eq!(today.avg, Some(4.0));
        assert_eq!((today.high, today.medium, today.low), (1, 1, 0));

        let eighth = &chart[4];
        assert_eq!(eighth.low, 1);
        assert_eq!(chart[5].avg, None);
        assert_eq!(total_entries(&chart), 3);
    }

    #[test]
    fn test_daily_chart_clamps_range() {
        let now = at(10, 18);
        assert_eq!(daily_chart(&[], now, 0).len(), 1);
        assert_eq!(daily_chart(&[], now, 1000).len(), MAX_CHART_DAYS as usize);
    }

    #[test]
    fn test_latest_entry() {
        let entries = vec![entry(1, at(2, 9), 5, None), entry(2, at(5, 9), 6, None)];
        assert_eq!(latest_entry(&entries).unwrap().id, 2);
        assert!(latest_entry(&[]).is_none());
    }
}
