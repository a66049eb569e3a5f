use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::achievements::{self, AchievementInput};
use crate::models::{ActivityItem, EventLog, SubjectStat};
use crate::stats;
use crate::subjects::{aggregate_by_subject, subject_label};
use crate::trend::{seven_day_trend, weekly_activity};
use crate::window::{in_window, parse_timestamp, TimeRange};

const RECENT_ACTIVITY_LIMIT: usize = 20;
const REPORT_ACTIVITY_LINES: usize = 10;

// A subject is a focus area when its average sits below this over at least
// MIN_FOCUS_ATTEMPTS graded attempts.
const FOCUS_SCORE_THRESHOLD: u32 = 70;
const MIN_FOCUS_ATTEMPTS: usize = 2;

pub fn range_label(range: TimeRange) -> &'static str {
    match range {
        TimeRange::Week => "last 7 days",
        TimeRange::Month => "last 30 days",
        TimeRange::All => "all time",
    }
}

/// Merged event timeline inside the window, newest first, capped at 20.
/// Events whose timestamp cannot be parsed have no place on a timeline and
/// are left out.
pub fn recent_activity(log: &EventLog, range: TimeRange, now: DateTime<Utc>) -> Vec<ActivityItem> {
    let mut items: Vec<ActivityItem> = Vec::new();

    for quiz in &log.quizzes {
        if !in_window(&quiz.taken_at, range, now) {
            continue;
        }
        if let Some(occurred_at) = parse_timestamp(&quiz.taken_at) {
            items.push(ActivityItem {
                kind: "quiz",
                title: format!("Quiz: {}", quiz.topic),
                subtitle: format!("{} - {}%", subject_label(&quiz.subject), quiz.percentage),
                occurred_at,
                score: Some(quiz.percentage),
            });
        }
    }
    for eval in &log.evaluations {
        if !in_window(&eval.evaluated_at, range, now) {
            continue;
        }
        if let Some(occurred_at) = parse_timestamp(&eval.evaluated_at) {
            items.push(ActivityItem {
                kind: "exam",
                title: format!("Exam: {}", eval.topic),
                subtitle: format!(
                    "{} - {:.1}% ({}/{})",
                    subject_label(&eval.subject),
                    eval.percentage,
                    eval.total_score,
                    eval.total_max_marks
                ),
                occurred_at,
                score: Some(eval.percentage),
            });
        }
    }
    for set in &log.flashcard_sets {
        if !in_window(&set.created_at, range, now) {
            continue;
        }
        if let Some(occurred_at) = parse_timestamp(&set.created_at) {
            items.push(ActivityItem {
                kind: "flashcard",
                title: format!("Flashcards: {}", set.topic),
                subtitle: format!("{} - {} cards", subject_label(&set.subject), set.cards.len()),
                occurred_at,
                score: None,
            });
        }
    }
    for chat in &log.chat_sessions {
        if !in_window(&chat.created_at, range, now) {
            continue;
        }
        if let Some(occurred_at) = parse_timestamp(&chat.created_at) {
            let subject = chat.subject.as_deref().unwrap_or("All Subjects");
            items.push(ActivityItem {
                kind: "chat",
                title: "Chat Session".to_string(),
                subtitle: format!("{} - {} messages", subject, chat.message_count),
                occurred_at,
                score: None,
            });
        }
    }
    for doc in &log.documents {
        if !in_window(&doc.uploaded_at, range, now) {
            continue;
        }
        if let Some(occurred_at) = parse_timestamp(&doc.uploaded_at) {
            items.push(ActivityItem {
                kind: "document",
                title: format!("Document: {}", doc.title),
                subtitle: subject_label(&doc.subject),
                occurred_at,
                score: None,
            });
        }
    }

    items.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    items.truncate(RECENT_ACTIVITY_LIMIT);
    items
}

/// Subjects with a weak average over enough attempts to mean something.
pub fn focus_areas(subject_stats: &[SubjectStat]) -> Vec<SubjectStat> {
    subject_stats
        .iter()
        .filter(|s| s.average < FOCUS_SCORE_THRESHOLD && s.attempt_count >= MIN_FOCUS_ATTEMPTS)
        .cloned()
        .collect()
}

/// Whether the last three evaluations (in recorded order) are non-decreasing.
pub fn scores_improving(log: &EventLog) -> bool {
    let recent: Vec<f64> = log
        .evaluations
        .iter()
        .rev()
        .take(3)
        .rev()
        .map(|e| e.percentage)
        .collect();
    recent.len() >= 3 && recent.windows(2).all(|pair| pair[1] >= pair[0])
}

pub fn format_time_ago(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - ts;
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        ts.format("%Y-%m-%d").to_string()
    }
}

pub fn build_report(log: &EventLog, range: TimeRange, now: DateTime<Utc>) -> String {
    let stats = stats::aggregate(log, range, now);
    let subject_stats = aggregate_by_subject(&log.quizzes, &log.evaluations, range, now);
    let weak_subjects = focus_areas(&subject_stats);
    let pattern = weekly_activity(log, range, now);
    let trend = seven_day_trend(log, now);
    let timeline = recent_activity(log, range, now);
    let achievements = achievements::evaluate(&AchievementInput::new(log, &stats));

    let mut output = String::new();

    let _ = writeln!(output, "# Learning Activity Report");
    let _ = writeln!(
        output,
        "Generated for {} (as of {})",
        range_label(range),
        now.format("%Y-%m-%d")
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(
        output,
        "- Quizzes: {} (average {}%, best {}%)",
        stats.total_quizzes, stats.average_quiz_score, stats.best_quiz_score
    );
    let _ = writeln!(
        output,
        "- Exams: {} (average {}%, best {}%)",
        stats.total_exams, stats.average_exam_score, stats.best_exam_score
    );
    let _ = writeln!(output, "- Combined average: {}%", stats.combined_average);
    let _ = writeln!(
        output,
        "- Questions answered: {} ({} correct)",
        stats.total_questions, stats.correct_answers
    );
    let _ = writeln!(
        output,
        "- Exam marks: {}/{}",
        stats.total_exam_marks, stats.total_possible_marks
    );
    let _ = writeln!(
        output,
        "- Flashcard sets: {} ({} cards)",
        stats.total_flashcard_sets, stats.total_flashcards
    );
    let _ = writeln!(
        output,
        "- Chat sessions: {} ({} messages)",
        stats.total_chat_sessions, stats.total_messages
    );
    let _ = writeln!(output, "- Documents uploaded: {}", stats.total_documents);
    let _ = writeln!(output, "- Study time: {} minutes", stats.study_minutes);
    let _ = writeln!(output, "- Current streak: {} days", stats.current_streak);
    let _ = writeln!(output, "- Activity score: {}/100", stats.activity_score);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subject Performance");
    if subject_stats.is_empty() {
        let _ = writeln!(output, "No graded work recorded for this window.");
    } else {
        for stat in &subject_stats {
            let _ = writeln!(
                output,
                "- {}: average {}% across {} attempts (accuracy {}%)",
                stat.subject, stat.average, stat.attempt_count, stat.accuracy
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Focus Areas");
    if weak_subjects.is_empty() {
        let _ = writeln!(output, "No weak subjects identified.");
    } else {
        for stat in &weak_subjects {
            let _ = writeln!(
                output,
                "- Focus on {}: your average score is {}%",
                stat.subject, stat.average
            );
        }
    }
    if scores_improving(log) {
        let _ = writeln!(
            output,
            "Your last three exam scores are holding or improving. Keep it up!"
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Pattern");
    if pattern.iter().all(|d| d.count == 0) {
        let _ = writeln!(output, "Complete activities to see weekly patterns.");
    } else {
        for day in &pattern {
            let _ = writeln!(output, "- {}: {} activities", day.day, day.count);
        }
        if let Some(busiest) = pattern.iter().max_by_key(|d| d.count) {
            let _ = writeln!(
                output,
                "Most active: {} ({} activities)",
                busiest.day, busiest.count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Last 7 Days");
    for bucket in &trend {
        let total = bucket.quizzes + bucket.exams + bucket.flashcards + bucket.chats;
        if bucket.quizzes + bucket.exams > 0 {
            let _ = writeln!(
                output,
                "- {}: {} activities (avg score {}%)",
                bucket.label, total, bucket.avg_score
            );
        } else {
            let _ = writeln!(output, "- {}: {} activities", bucket.label, total);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Achievements");
    for achievement in &achievements {
        let marker = if achievement.unlocked { "x" } else { " " };
        let _ = writeln!(
            output,
            "- [{marker}] {}: {} ({}%)",
            achievement.name, achievement.description, achievement.progress_pct
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");
    if timeline.is_empty() {
        let _ = writeln!(output, "No activity recorded for this window.");
    } else {
        for item in timeline.iter().take(REPORT_ACTIVITY_LINES) {
            let _ = writeln!(
                output,
                "- {} ({}) {}",
                item.title,
                item.subtitle,
                format_time_ago(item.occurred_at, now)
            );
        }
    }

    output
}

/// Per-subject stats as CSV, one row per subject in ranked order.
pub fn write_subject_csv(path: &Path, subject_stats: &[SubjectStat]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for stat in subject_stats {
        writer.serialize(stat)?;
    }
    writer.flush()?;
    Ok(())
}
