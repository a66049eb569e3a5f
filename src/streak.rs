use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Count of consecutive calendar days with activity, ending at `today`.
///
/// The run must include today itself: the first expected date is today, so a
/// user active every day through yesterday but not yet today has a streak of
/// zero. Duplicate same-day activity collapses to one day; future-dated
/// activity is ignored.
pub fn current_streak(dates: &[DateTime<Utc>], today: DateTime<Utc>) -> u32 {
    let today = today.date_naive();
    let mut days: Vec<NaiveDate> = dates.iter().map(|ts| ts.date_naive()).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let mut streak = 0u32;
    for day in days {
        let expected = today - Duration::days(i64::from(streak));
        if day == expected {
            streak += 1;
        } else if day < expected {
            break;
        }
    }
    streak
}
