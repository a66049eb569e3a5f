use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One graded quiz attempt, as exported under the `quizHistory` key.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizAttempt {
    #[serde(rename = "date")]
    pub taken_at: String,
    pub topic: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub percentage: f64,
    #[serde(rename = "score")]
    pub correct_count: u32,
    #[serde(rename = "numQuestions")]
    pub total_questions: u32,
    #[serde(rename = "duration", default)]
    pub duration_seconds: u32,
}

/// Output of the external exam evaluator (`examEvaluations` key).
#[derive(Debug, Clone, Deserialize)]
pub struct ExamEvaluation {
    pub topic: String,
    #[serde(default)]
    pub subject: String,
    pub total_score: f64,
    pub total_max_marks: f64,
    #[serde(default)]
    pub percentage: f64,
    #[serde(rename = "evaluations", default)]
    pub question_scores: Vec<QuestionScore>,
    pub evaluated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionScore {
    pub score: f64,
    pub max_marks: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlashcardSet {
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub topic: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub cards: Vec<Flashcard>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatSession {
    #[serde(rename = "created")]
    pub created_at: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUpload {
    #[serde(rename = "uploadDate")]
    pub uploaded_at: String,
    pub title: String,
    #[serde(default)]
    pub subject: String,
}

/// Immutable snapshot of every activity event known to the engine.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub quizzes: Vec<QuizAttempt>,
    pub evaluations: Vec<ExamEvaluation>,
    pub flashcard_sets: Vec<FlashcardSet>,
    pub chat_sessions: Vec<ChatSession>,
    pub documents: Vec<DocumentUpload>,
}

impl EventLog {
    /// Raw timestamps of every event across all five kinds.
    pub fn activity_timestamps(&self) -> impl Iterator<Item = &str> {
        self.quizzes
            .iter()
            .map(|q| q.taken_at.as_str())
            .chain(self.evaluations.iter().map(|e| e.evaluated_at.as_str()))
            .chain(self.flashcard_sets.iter().map(|f| f.created_at.as_str()))
            .chain(self.chat_sessions.iter().map(|c| c.created_at.as_str()))
            .chain(self.documents.iter().map(|d| d.uploaded_at.as_str()))
    }
}

/// Event counts fed to the activity scorer (windowed) and the achievement
/// evaluator (all-time).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RawCounts {
    pub quizzes: usize,
    pub exams: usize,
    pub flashcard_sets: usize,
    pub chat_sessions: usize,
    pub documents: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregatedStats {
    pub total_quizzes: usize,
    pub average_quiz_score: u32,
    pub best_quiz_score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub total_exams: usize,
    pub average_exam_score: u32,
    pub best_exam_score: u32,
    pub total_exam_marks: f64,
    pub total_possible_marks: f64,
    pub combined_average: u32,
    pub total_flashcard_sets: usize,
    pub total_flashcards: usize,
    pub total_chat_sessions: usize,
    pub total_messages: u32,
    pub total_documents: usize,
    pub study_minutes: u32,
    pub current_streak: u32,
    pub activity_score: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectStat {
    pub subject: String,
    pub average: u32,
    pub attempt_count: usize,
    pub correct: u32,
    pub incorrect: u32,
    pub accuracy: u32,
    pub total_marks: f64,
    pub max_marks: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekdayCount {
    pub day: &'static str,
    pub count: usize,
}

/// One day in the 7-day trend, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct DayBucket {
    pub label: String,
    pub quizzes: u32,
    pub exams: u32,
    pub flashcards: u32,
    pub chats: u32,
    pub avg_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
    pub progress_pct: u32,
}

/// One row of the recent-activity timeline.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    pub kind: &'static str,
    pub title: String,
    pub subtitle: String,
    pub occurred_at: DateTime<Utc>,
    pub score: Option<f64>,
}
