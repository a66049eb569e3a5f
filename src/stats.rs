use chrono::{DateTime, Utc};

use crate::models::{AggregatedStats, EventLog, RawCounts};
use crate::streak::current_streak;
use crate::window::{in_window, parse_timestamp, TimeRange};

// Engagement weights per event kind. The score is a policy constant table,
// clamped to MAX_ACTIVITY_SCORE.
const QUIZ_WEIGHT: usize = 8;
const EXAM_WEIGHT: usize = 15;
const FLASHCARD_SET_WEIGHT: usize = 5;
const CHAT_SESSION_WEIGHT: usize = 3;
const DOCUMENT_WEIGHT: usize = 2;
const MAX_ACTIVITY_SCORE: usize = 100;

/// Bounded 0-100 engagement score from weighted event counts.
pub fn activity_score(counts: &RawCounts) -> u32 {
    let weighted = counts.quizzes * QUIZ_WEIGHT
        + counts.exams * EXAM_WEIGHT
        + counts.flashcard_sets * FLASHCARD_SET_WEIGHT
        + counts.chat_sessions * CHAT_SESSION_WEIGHT
        + counts.documents * DOCUMENT_WEIGHT;
    weighted.min(MAX_ACTIVITY_SCORE) as u32
}

/// All-time event counts, used by the achievement evaluator.
pub fn raw_counts(log: &EventLog) -> RawCounts {
    RawCounts {
        quizzes: log.quizzes.len(),
        exams: log.evaluations.len(),
        flashcard_sets: log.flashcard_sets.len(),
        chat_sessions: log.chat_sessions.len(),
        documents: log.documents.len(),
    }
}

fn rounded_mean(total: f64, count: usize) -> u32 {
    if count == 0 {
        0
    } else {
        (total / count as f64).round() as u32
    }
}

fn best_percentage<'a, I: Iterator<Item = &'a f64>>(percentages: I) -> u32 {
    percentages.fold(0.0f64, |best, &pct| best.max(pct)).round() as u32
}

/// Reduces the event log to one `AggregatedStats` snapshot.
///
/// Counts, averages and totals honor the active window; best scores and the
/// streak look at full history, matching how the dashboard surfaced them.
pub fn aggregate(log: &EventLog, range: TimeRange, now: DateTime<Utc>) -> AggregatedStats {
    let quizzes: Vec<_> = log
        .quizzes
        .iter()
        .filter(|q| in_window(&q.taken_at, range, now))
        .collect();
    let evaluations: Vec<_> = log
        .evaluations
        .iter()
        .filter(|e| in_window(&e.evaluated_at, range, now))
        .collect();
    let flashcard_sets: Vec<_> = log
        .flashcard_sets
        .iter()
        .filter(|f| in_window(&f.created_at, range, now))
        .collect();
    let chat_sessions: Vec<_> = log
        .chat_sessions
        .iter()
        .filter(|c| in_window(&c.created_at, range, now))
        .collect();
    let documents: Vec<_> = log
        .documents
        .iter()
        .filter(|d| in_window(&d.uploaded_at, range, now))
        .collect();

    let quiz_pct_total: f64 = quizzes.iter().map(|q| q.percentage).sum();
    let exam_pct_total: f64 = evaluations.iter().map(|e| e.percentage).sum();
    let graded = quizzes.len() + evaluations.len();

    let total_duration: u64 = quizzes.iter().map(|q| u64::from(q.duration_seconds)).sum();

    let activity_dates: Vec<DateTime<Utc>> =
        log.activity_timestamps().filter_map(parse_timestamp).collect();

    let windowed = RawCounts {
        quizzes: quizzes.len(),
        exams: evaluations.len(),
        flashcard_sets: flashcard_sets.len(),
        chat_sessions: chat_sessions.len(),
        documents: documents.len(),
    };

    AggregatedStats {
        total_quizzes: quizzes.len(),
        average_quiz_score: rounded_mean(quiz_pct_total, quizzes.len()),
        best_quiz_score: best_percentage(log.quizzes.iter().map(|q| &q.percentage)),
        total_questions: quizzes.iter().map(|q| q.total_questions).sum(),
        correct_answers: quizzes.iter().map(|q| q.correct_count).sum(),
        total_exams: evaluations.len(),
        average_exam_score: rounded_mean(exam_pct_total, evaluations.len()),
        best_exam_score: best_percentage(log.evaluations.iter().map(|e| &e.percentage)),
        total_exam_marks: evaluations.iter().map(|e| e.total_score).sum(),
        total_possible_marks: evaluations.iter().map(|e| e.total_max_marks).sum(),
        combined_average: rounded_mean(quiz_pct_total + exam_pct_total, graded),
        total_flashcard_sets: flashcard_sets.len(),
        total_flashcards: flashcard_sets.iter().map(|f| f.cards.len()).sum(),
        total_chat_sessions: chat_sessions.len(),
        total_messages: chat_sessions.iter().map(|c| c.message_count).sum(),
        total_documents: documents.len(),
        study_minutes: (total_duration as f64 / 60.0).round() as u32,
        current_streak: current_streak(&activity_dates, now),
        activity_score: activity_score(&windowed),
    }
}
