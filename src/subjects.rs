use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{ExamEvaluation, QuizAttempt, SubjectStat};
use crate::window::{in_window, TimeRange};

/// Exam questions have no ground-truth correctness, so a question earning at
/// least this share of its max marks is treated as answered correctly.
const CORRECT_MARK_RATIO: f64 = 0.70;

#[derive(Default)]
struct SubjectAccumulator {
    total_pct: f64,
    count: usize,
    correct: u32,
    incorrect: u32,
    total_marks: f64,
    max_marks: f64,
}

pub fn subject_label(subject: &str) -> String {
    let trimmed = subject.trim();
    if trimmed.is_empty() {
        "Other".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Merges quiz and exam records within the window into one stat per subject,
/// sorted descending by average score.
pub fn aggregate_by_subject(
    quizzes: &[QuizAttempt],
    evaluations: &[ExamEvaluation],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Vec<SubjectStat> {
    let mut by_subject: HashMap<String, SubjectAccumulator> = HashMap::new();

    for quiz in quizzes.iter().filter(|q| in_window(&q.taken_at, range, now)) {
        let entry = by_subject.entry(subject_label(&quiz.subject)).or_default();
        entry.total_pct += quiz.percentage;
        entry.count += 1;
        entry.correct += quiz.correct_count;
        entry.incorrect += quiz.total_questions.saturating_sub(quiz.correct_count);
    }

    for eval in evaluations
        .iter()
        .filter(|e| in_window(&e.evaluated_at, range, now))
    {
        let entry = by_subject.entry(subject_label(&eval.subject)).or_default();
        entry.total_pct += eval.percentage;
        entry.count += 1;
        entry.total_marks += eval.total_score;
        entry.max_marks += eval.total_max_marks;

        for question in &eval.question_scores {
            if question.max_marks > 0.0 && question.score / question.max_marks >= CORRECT_MARK_RATIO
            {
                entry.correct += 1;
            } else {
                entry.incorrect += 1;
            }
        }
    }

    let mut stats: Vec<SubjectStat> = by_subject
        .into_iter()
        .map(|(subject, acc)| {
            let answered = acc.correct + acc.incorrect;
            SubjectStat {
                subject,
                // count is nonzero for every key by construction
                average: (acc.total_pct / acc.count as f64).round() as u32,
                attempt_count: acc.count,
                correct: acc.correct,
                incorrect: acc.incorrect,
                accuracy: if answered == 0 {
                    0
                } else {
                    (f64::from(acc.correct) / f64::from(answered) * 100.0).round() as u32
                },
                total_marks: acc.total_marks,
                max_marks: acc.max_marks,
            }
        })
        .collect();

    stats.sort_by(|a, b| b.average.cmp(&a.average));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionScore;

    fn now() -> DateTime<Utc> {
        "2026-08-25T12:00:00Z".parse().unwrap()
    }

    fn quiz(subject: &str, percentage: f64, correct: u32, total: u32) -> QuizAttempt {
        QuizAttempt {
            taken_at: "2026-08-24T10:00:00Z".to_string(),
            topic: "Photosynthesis".to_string(),
            subject: subject.to_string(),
            percentage,
            correct_count: correct,
            total_questions: total,
            duration_seconds: 300,
        }
    }

    fn evaluation(subject: &str, percentage: f64, questions: Vec<QuestionScore>) -> ExamEvaluation {
        let total_score: f64 = questions.iter().map(|q| q.score).sum();
        let total_max: f64 = questions.iter().map(|q| q.max_marks).sum();
        ExamEvaluation {
            topic: "Midterm".to_string(),
            subject: subject.to_string(),
            total_score,
            total_max_marks: total_max,
            percentage,
            question_scores: questions,
            evaluated_at: "2026-08-24T16:00:00Z".to_string(),
        }
    }

    #[test]
    fn averages_quiz_percentages_per_subject() {
        let quizzes = vec![
            quiz("Biology", 80.0, 8, 10),
            quiz("Biology", 90.0, 9, 10),
            quiz("Biology", 100.0, 10, 10),
        ];
        let stats = aggregate_by_subject(&quizzes, &[], TimeRange::Week, now());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].subject, "Biology");
        assert_eq!(stats[0].average, 90);
        assert_eq!(stats[0].attempt_count, 3);
        assert_eq!(stats[0].correct, 27);
        assert_eq!(stats[0].incorrect, 3);
        assert_eq!(stats[0].accuracy, 90);
    }

    #[test]
    fn exam_questions_use_the_mark_ratio_proxy() {
        let evals = vec![evaluation(
            "History",
            65.0,
            vec![
                QuestionScore { score: 8.0, max_marks: 10.0 },
                QuestionScore { score: 7.0, max_marks: 10.0 },
                QuestionScore { score: 4.5, max_marks: 10.0 },
            ],
        )];
        let stats = aggregate_by_subject(&[], &evals, TimeRange::Week, now());
        assert_eq!(stats[0].correct, 2);
        assert_eq!(stats[0].incorrect, 1);
        assert_eq!(stats[0].total_marks, 19.5);
        assert_eq!(stats[0].max_marks, 30.0);
    }

    #[test]
    fn zero_max_mark_questions_count_as_incorrect() {
        let evals = vec![evaluation(
            "History",
            50.0,
            vec![QuestionScore { score: 1.0, max_marks: 0.0 }],
        )];
        let stats = aggregate_by_subject(&[], &evals, TimeRange::Week, now());
        assert_eq!(stats[0].correct, 0);
        assert_eq!(stats[0].incorrect, 1);
    }

    #[test]
    fn accuracy_is_zero_without_answered_questions() {
        let evals = vec![evaluation("Physics", 75.0, vec![])];
        let stats = aggregate_by_subject(&[], &evals, TimeRange::Week, now());
        assert_eq!(stats[0].accuracy, 0);
        assert_eq!(stats[0].average, 75);
    }

    #[test]
    fn quizzes_and_exams_merge_into_one_subject() {
        let quizzes = vec![quiz("Chemistry", 80.0, 4, 5)];
        let evals = vec![evaluation(
            "Chemistry",
            60.0,
            vec![QuestionScore { score: 6.0, max_marks: 10.0 }],
        )];
        let stats = aggregate_by_subject(&quizzes, &evals, TimeRange::Week, now());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].average, 70);
        assert_eq!(stats[0].attempt_count, 2);
        // 4 correct + 1 incorrect from the quiz, 1 incorrect from the exam
        assert_eq!(stats[0].correct, 4);
        assert_eq!(stats[0].incorrect, 2);
    }

    #[test]
    fn missing_subject_falls_back_to_other() {
        let quizzes = vec![quiz("", 50.0, 1, 2), quiz("  ", 70.0, 1, 2)];
        let stats = aggregate_by_subject(&quizzes, &[], TimeRange::Week, now());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].subject, "Other");
        assert_eq!(stats[0].attempt_count, 2);
    }

    #[test]
    fn subjects_sort_descending_by_average() {
        let quizzes = vec![
            quiz("Biology", 60.0, 6, 10),
            quiz("Chemistry", 95.0, 9, 10),
            quiz("History", 80.0, 8, 10),
        ];
        let stats = aggregate_by_subject(&quizzes, &[], TimeRange::Week, now());
        let order: Vec<&str> = stats.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(order, vec!["Chemistry", "History", "Biology"]);
    }

    #[test]
    fn events_outside_the_window_are_ignored() {
        let mut old = quiz("Biology", 40.0, 2, 5);
        old.taken_at = "2026-07-01T10:00:00Z".to_string();
        let quizzes = vec![old, quiz("Biology", 90.0, 9, 10)];
        let stats = aggregate_by_subject(&quizzes, &[], TimeRange::Week, now());
        assert_eq!(stats[0].attempt_count, 1);
        assert_eq!(stats[0].average, 90);
    }
}
