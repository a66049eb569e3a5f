use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::models::EventLog;

// File names mirror the keys the client app exports its event log under.
pub const QUIZ_HISTORY_FILE: &str = "quizHistory.json";
pub const EXAM_EVALUATIONS_FILE: &str = "examEvaluations.json";
pub const FLASHCARD_SETS_FILE: &str = "flashcardSets.json";
pub const CHAT_SESSIONS_FILE: &str = "chat_sessions.json";
pub const DOCUMENT_HISTORY_FILE: &str = "documentHistory.json";

/// Loads the five event arrays from `data_dir`. A missing file is an empty
/// list; a record that fails to decode is skipped with a warning so one dirty
/// row never takes down the whole snapshot.
pub fn load_events(data_dir: &Path) -> anyhow::Result<EventLog> {
    let mut log = EventLog {
        quizzes: load_records(data_dir, QUIZ_HISTORY_FILE)?,
        evaluations: load_records(data_dir, EXAM_EVALUATIONS_FILE)?,
        flashcard_sets: load_records(data_dir, FLASHCARD_SETS_FILE)?,
        chat_sessions: load_records(data_dir, CHAT_SESSIONS_FILE)?,
        documents: load_records(data_dir, DOCUMENT_HISTORY_FILE)?,
    };

    for quiz in &mut log.quizzes {
        quiz.percentage = normalize_percentage(
            quiz.percentage,
            f64::from(quiz.correct_count),
            f64::from(quiz.total_questions),
        );
    }
    for eval in &mut log.evaluations {
        eval.percentage =
            normalize_percentage(eval.percentage, eval.total_score, eval.total_max_marks);
    }

    Ok(log)
}

fn load_records<T: DeserializeOwned>(data_dir: &Path, file_name: &str) -> anyhow::Result<Vec<T>> {
    let path = data_dir.join(file_name);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array", path.display()))?;

    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(file = file_name, error = %err, "skipping malformed record");
            }
        }
    }
    Ok(records)
}

/// Keeps the stored percentage when present, derives it from marks when the
/// exporter omitted it, and clamps the result to [0, 100].
fn normalize_percentage(stored: f64, score: f64, max: f64) -> f64 {
    let pct = if stored != 0.0 || max <= 0.0 {
        stored
    } else {
        score / max * 100.0
    };
    if pct.is_finite() {
        pct.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
