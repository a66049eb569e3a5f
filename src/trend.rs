use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::models::{DayBucket, EventLog, WeekdayCount};
use crate::window::{in_window, parse_timestamp, TimeRange};

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const TREND_DAYS: i64 = 7;

/// Activity counts bucketed by calendar weekday (Sunday first) for events
/// inside the window. Events with unparsable timestamps are skipped.
pub fn weekly_activity(log: &EventLog, range: TimeRange, now: DateTime<Utc>) -> [WeekdayCount; 7] {
    let mut counts = [0usize; 7];
    for raw in log.activity_timestamps() {
        if !in_window(raw, range, now) {
            continue;
        }
        match parse_timestamp(raw) {
            Some(ts) => {
                counts[ts.date_naive().weekday().num_days_from_sunday() as usize] += 1;
            }
            None => tracing::warn!(timestamp = raw, "skipping event with unparsable timestamp"),
        }
    }
    std::array::from_fn(|i| WeekdayCount { day: WEEKDAY_LABELS[i], count: counts[i] })
}

fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Score-bearing events (quizzes and exams) share one running average per
/// day, rounded at every step to mirror how the dashboard accumulated it.
fn roll_score(bucket: &mut DayBucket, score: f64) {
    let n = f64::from(bucket.quizzes + bucket.exams);
    bucket.avg_score = ((bucket.avg_score * (n - 1.0)) + score) / n;
    bucket.avg_score = bucket.avg_score.round();
}

/// Fixed 7-day series ending at `today`, oldest first. Buckets are seeded
/// zero-filled so the output always has exactly seven entries.
pub fn seven_day_trend(log: &EventLog, today: DateTime<Utc>) -> Vec<DayBucket> {
    let today = today.date_naive();
    let start = today - Duration::days(TREND_DAYS - 1);

    let mut buckets: Vec<DayBucket> = (0..TREND_DAYS)
        .map(|offset| DayBucket {
            label: day_label(start + Duration::days(offset)),
            quizzes: 0,
            exams: 0,
            flashcards: 0,
            chats: 0,
            avg_score: 0.0,
        })
        .collect();

    let index_for = |raw: &str| -> Option<usize> {
        let date = parse_timestamp(raw)?.date_naive();
        let offset = (date - start).num_days();
        (0..TREND_DAYS).contains(&offset).then_some(offset as usize)
    };

    for quiz in &log.quizzes {
        if let Some(i) = index_for(&quiz.taken_at) {
            buckets[i].quizzes += 1;
            roll_score(&mut buckets[i], quiz.percentage);
        }
    }
    for eval in &log.evaluations {
        if let Some(i) = index_for(&eval.evaluated_at) {
            buckets[i].exams += 1;
            roll_score(&mut buckets[i], eval.percentage);
        }
    }
    for set in &log.flashcard_sets {
        if let Some(i) = index_for(&set.created_at) {
            buckets[i].flashcards += 1;
        }
    }
    for chat in &log.chat_sessions {
        if let Some(i) = index_for(&chat.created_at) {
            buckets[i].chats += 1;
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatSession, ExamEvaluation, FlashcardSet, QuizAttempt};

    fn now() -> DateTime<Utc> {
        "2026-08-25T12:00:00Z".parse().unwrap()
    }

    fn quiz_on(ts: &str, percentage: f64) -> QuizAttempt {
        QuizAttempt {
            taken_at: ts.to_string(),
            topic: "Algebra".to_string(),
            subject: "Math".to_string(),
            percentage,
            correct_count: 8,
            total_questions: 10,
            duration_seconds: 240,
        }
    }

    fn eval_on(ts: &str, percentage: f64) -> ExamEvaluation {
        ExamEvaluation {
            topic: "Final".to_string(),
            subject: "Math".to_string(),
            total_score: 45.0,
            total_max_marks: 50.0,
            percentage,
            question_scores: vec![],
            evaluated_at: ts.to_string(),
        }
    }

    fn flashcards_on(ts: &str) -> FlashcardSet {
        FlashcardSet {
            created_at: ts.to_string(),
            topic: "Derivatives".to_string(),
            subject: "Math".to_string(),
            cards: vec![],
        }
    }

    fn chat_on(ts: &str) -> ChatSession {
        ChatSession {
            created_at: ts.to_string(),
            subject: None,
            message_count: 4,
        }
    }

    #[test]
    fn empty_log_yields_seven_zero_filled_buckets() {
        let buckets = seven_day_trend(&EventLog::default(), now());
        assert_eq!(buckets.len(), 7);
        for bucket in &buckets {
            assert_eq!(bucket.quizzes, 0);
            assert_eq!(bucket.exams, 0);
            assert_eq!(bucket.flashcards, 0);
            assert_eq!(bucket.chats, 0);
            assert_eq!(bucket.avg_score, 0.0);
        }
        assert_eq!(buckets[0].label, "Aug 19");
        assert_eq!(buckets[6].label, "Aug 25");
    }

    #[test]
    fn running_average_rounds_at_every_step() {
        let log = EventLog {
            quizzes: vec![
                quiz_on("2026-08-25T08:00:00Z", 80.0),
                quiz_on("2026-08-25T09:00:00Z", 91.0),
            ],
            ..Default::default()
        };
        let buckets = seven_day_trend(&log, now());
        let today = &buckets[6];
        assert_eq!(today.quizzes, 2);
        // round((80*1 + 91) / 2) = 86, not 85.5
        assert_eq!(today.avg_score, 86.0);
    }

    #[test]
    fn quizzes_and_exams_share_one_average() {
        let log = EventLog {
            quizzes: vec![quiz_on("2026-08-24T08:00:00Z", 100.0)],
            evaluations: vec![eval_on("2026-08-24T18:00:00Z", 70.0)],
            ..Default::default()
        };
        let buckets = seven_day_trend(&log, now());
        let yesterday = &buckets[5];
        assert_eq!(yesterday.quizzes, 1);
        assert_eq!(yesterday.exams, 1);
        assert_eq!(yesterday.avg_score, 85.0);
    }

    #[test]
    fn flashcards_and_chats_do_not_touch_the_average() {
        let log = EventLog {
            flashcard_sets: vec![flashcards_on("2026-08-25T08:00:00Z")],
            chat_sessions: vec![chat_on("2026-08-25T09:00:00Z")],
            ..Default::default()
        };
        let buckets = seven_day_trend(&log, now());
        assert_eq!(buckets[6].flashcards, 1);
        assert_eq!(buckets[6].chats, 1);
        assert_eq!(buckets[6].avg_score, 0.0);
    }

    #[test]
    fn events_outside_the_seven_days_are_ignored() {
        let log = EventLog {
            quizzes: vec![
                quiz_on("2026-08-18T08:00:00Z", 50.0),
                quiz_on("2026-08-26T08:00:00Z", 60.0),
            ],
            ..Default::default()
        };
        let buckets = seven_day_trend(&log, now());
        assert!(buckets.iter().all(|b| b.quizzes == 0));
    }

    #[test]
    fn malformed_timestamps_do_not_panic_the_trend() {
        let log = EventLog {
            quizzes: vec![quiz_on("not-a-date", 90.0)],
            ..Default::default()
        };
        let buckets = seven_day_trend(&log, now());
        assert!(buckets.iter().all(|b| b.quizzes == 0));
    }

    #[test]
    fn weekly_pattern_buckets_by_weekday() {
        // 2026-08-25 is a Tuesday, 2026-08-23 a Sunday
        let log = EventLog {
            quizzes: vec![quiz_on("2026-08-25T08:00:00Z", 80.0)],
            chat_sessions: vec![chat_on("2026-08-23T10:00:00Z")],
            documents: vec![],
            ..Default::default()
        };
        let pattern = weekly_activity(&log, TimeRange::Week, now());
        assert_eq!(pattern[0].day, "Sun");
        assert_eq!(pattern[0].count, 1);
        assert_eq!(pattern[2].day, "Tue");
        assert_eq!(pattern[2].count, 1);
        assert_eq!(pattern.iter().map(|d| d.count).sum::<usize>(), 2);
    }

    #[test]
    fn weekly_pattern_respects_the_window_and_skips_bad_dates() {
        let log = EventLog {
            quizzes: vec![
                quiz_on("2026-08-25T08:00:00Z", 80.0),
                quiz_on("2026-07-01T08:00:00Z", 80.0),
                quiz_on("garbage", 80.0),
            ],
            ..Default::default()
        };
        let pattern = weekly_activity(&log, TimeRange::Week, now());
        assert_eq!(pattern.iter().map(|d| d.count).sum::<usize>(), 1);

        // All admits the dated events but still skips the unparsable one
        let pattern = weekly_activity(&log, TimeRange::All, now());
        assert_eq!(pattern.iter().map(|d| d.count).sum::<usize>(), 2);
    }
}
