use chrono::NaiveDate;

use crate::model::completion::CompletionStore;
use crate::model::habit::HabitId;
use crate::model::stats::StatsSummary;
use crate::time::YearMonth;

/// Computes streaks, totals and the completion rate of `month`.
///
/// `dates` must be ascending and free of duplicates, which is what
/// [`CompletionStore::all_dates`] returns. `month` is the month on display
/// and need not contain `reference`.
pub fn compute_stats(dates: &[NaiveDate], reference: NaiveDate, month: YearMonth) -> StatsSummary {
    if dates.is_empty() {
        return StatsSummary::default();
    }

    let completed_in_month = dates.iter().filter(|d| month.contains(**d)).count();

    StatsSummary {
        current_streak: current_streak(dates, reference),
        longest_streak: longest_streak(dates),
        total_completions: saturating_u32(dates.len()),
        monthly_rate: rate_percent(saturating_u32(completed_in_month), month.days()),
    }
}

pub fn compute_stats_for(
    store: &CompletionStore,
    habit_id: &HabitId,
    reference: NaiveDate,
    month: YearMonth,
) -> StatsSummary {
    compute_stats(&store.all_dates(habit_id), reference, month)
}

/// Consecutive completed days ending at `reference`; 0 if `reference` itself is open.
pub fn current_streak(dates: &[NaiveDate], reference: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = reference;
    while dates.binary_search(&day).is_ok() {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut last: Option<NaiveDate> = None;

    for &date in dates {
        run = match last {
            Some(prev) if (date - prev).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        last = Some(date);
    }

    longest
}

/// `part / whole` as a percentage, rounded half away from zero.
pub fn rate_percent(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    let rounded = (200 * part + whole) / (2 * whole);
    rounded.min(100) as u8
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn test_empty_dates_give_zero_stats() {
        let stats = compute_stats(&[], date(2024, 1, 5), month(2024, 1));
        assert_eq!(stats, StatsSummary::default());
        assert_eq!(stats.monthly_rate, 0);
    }

    #[test]
    fn test_gap_before_reference() {
        let dates = [date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 5)];
        let stats = compute_stats(&dates, date(2024, 1, 5), month(2024, 1));

        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.total_completions, 4);
    }

    #[test]
    fn test_reference_not_completed_breaks_streak() {
        let dates = [date(2024, 1, 3), date(2024, 1, 4)];
        assert_eq!(current_streak(&dates, date(2024, 1, 5)), 0);
        assert_eq!(current_streak(&dates, date(2024, 1, 4)), 2);
    }

    #[test]
    fn test_streak_spans_year_boundary() {
        let dates = [date(2023, 12, 30), date(2023, 12, 31), date(2024, 1, 1)];
        let stats = compute_stats(&dates, date(2024, 1, 1), month(2024, 1));
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.longest_streak, 3);
    }

    #[test]
    fn test_streak_spans_leap_day() {
        let dates = [date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)];
        assert_eq!(longest_streak(&dates), 3);
        let dates = [date(2023, 2, 27), date(2023, 2, 28), date(2023, 3, 1)];
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn test_longest_streak_small_inputs() {
        assert_eq!(longest_streak(&[]), 0);
        assert_eq!(longest_streak(&[date(2024, 1, 1)]), 1);
        assert_eq!(longest_streak(&[date(2024, 1, 1), date(2024, 1, 3)]), 1);
    }

    #[test]
    fn test_longest_streak_at_end_is_captured() {
        let dates = [
            date(2024, 1, 1),
            date(2024, 1, 10),
            date(2024, 1, 11),
            date(2024, 1, 12),
            date(2024, 1, 13),
        ];
        assert_eq!(longest_streak(&dates), 4);
    }

    #[test]
    fn test_monthly_rate_january() {
        let dates: Vec<NaiveDate> = (1..=10).map(|d| date(2024, 1, d * 3)).collect();
        let stats = compute_stats(&dates, date(2024, 1, 31), month(2024, 1));
        assert_eq!(stats.monthly_rate, 32);
    }

    #[test]
    fn test_monthly_rate_uses_displayed_month() {
        // Today is in March, but February is on display.
        let dates: Vec<NaiveDate> = (1..=29).map(|d| date(2024, 2, d)).collect();
        let stats = compute_stats(&dates, date(2024, 3, 15), month(2024, 2));
        assert_eq!(stats.monthly_rate, 100);
        assert_eq!(stats.current_streak, 0);

        let stats = compute_stats(&dates, date(2024, 3, 15), month(2024, 3));
        assert_eq!(stats.monthly_rate, 0);
    }

    #[test]
    fn test_monthly_rate_full_month() {
        let dates: Vec<NaiveDate> = (1..=30).map(|d| date(2024, 4, d)).collect();
        let stats = compute_stats(&dates, date(2024, 4, 30), month(2024, 4));
        assert_eq!(stats.monthly_rate, 100);
        assert_eq!(stats.current_streak, 30);
    }

    #[test]
    fn test_rate_rounds_half_away_from_zero() {
        assert_eq!(rate_percent(1, 8), 13); // 12.5
        assert_eq!(rate_percent(3, 8), 38); // 37.5
        assert_eq!(rate_percent(1, 3), 33);
        assert_eq!(rate_percent(2, 3), 67);
        assert_eq!(rate_percent(0, 31), 0);
        assert_eq!(rate_percent(5, 0), 0);
    }

    #[test]
    fn test_longest_at_least_current() {
        let base = date(2024, 1, 1);
        // Gap patterns over 40 days, encoded as bit masks.
        for mask in [0u64, 1, 0b1011, 0xFFFF, 0xF0F0_F0F0, 0xFF_FFFF_FFFF, 0xAAAA_AAAA] {
            let dates: Vec<NaiveDate> = (0..40)
                .filter(|i| mask & (1 << i) != 0)
                .map(|i| base + Duration::days(i))
                .collect();
            for offset in 0..42 {
                let reference = base + Duration::days(offset);
                let stats = compute_stats(&dates, reference, YearMonth::of(reference));
                assert!(stats.longest_streak >= stats.current_streak);
                assert!(stats.total_completions as usize == dates.len());
            }
        }
    }

    #[test]
    fn test_current_streak_non_increasing_as_gaps_appear() {
        let reference = date(2024, 1, 20);
        let mut dates: Vec<NaiveDate> = (0..20).map(|i| reference - Duration::days(19 - i)).collect();
        let mut previous = current_streak(&dates, reference);
        assert_eq!(previous, 20);

        // Open gaps ever closer to the reference.
        for back in (1..20).rev() {
            let gap = reference - Duration::days(back);
            dates.retain(|d| *d != gap);
            let streak = current_streak(&dates, reference);
            assert!(streak <= previous);
            assert_eq!(streak, back as u32);
            previous = streak;
        }
    }

    #[test]
    fn test_compute_stats_for_store() {
        let mut store = CompletionStore::new();
        let id = HabitId::from("h1");
        store.toggle(&id, date(2024, 1, 2));
        store.toggle(&id, date(2024, 1, 1));

        let stats = compute_stats_for(&store, &id, date(2024, 1, 2), month(2024, 1));
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.total_completions, 2);

        let other = compute_stats_for(&store, &HabitId::from("none"), date(2024, 1, 2), month(2024, 1));
        assert_eq!(other, StatsSummary::default());
    }
}
