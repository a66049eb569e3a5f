use crate::models::{Achievement, AggregatedStats, EventLog, RawCounts};
use crate::stats::raw_counts;

const QUIZ_MASTER_TARGET: usize = 10;
const EXAM_CHAMPION_TARGET: usize = 5;
const FLASHCARD_TARGET: usize = 5;
const CHAT_TARGET: usize = 10;
const STREAK_TARGET: u32 = 7;

/// Everything the rule table is evaluated against. Counts are all-time:
/// milestones do not regress when the viewer narrows the window.
#[derive(Debug, Clone, Copy)]
pub struct AchievementInput {
    pub counts: RawCounts,
    pub best_quiz_score: u32,
    pub best_exam_score: u32,
    pub current_streak: u32,
}

impl AchievementInput {
    pub fn new(log: &EventLog, stats: &AggregatedStats) -> Self {
        Self {
            counts: raw_counts(log),
            best_quiz_score: stats.best_quiz_score,
            best_exam_score: stats.best_exam_score,
            current_streak: stats.current_streak,
        }
    }

    fn best_graded_score(&self) -> u32 {
        self.best_quiz_score.max(self.best_exam_score)
    }
}

struct Rule {
    name: &'static str,
    description: &'static str,
    unlocked: fn(&AchievementInput) -> bool,
    progress: fn(&AchievementInput) -> u32,
}

static RULES: [Rule; 7] = [
    Rule {
        name: "First Steps",
        description: "Complete your first quiz",
        unlocked: |input| input.counts.quizzes >= 1,
        progress: |input| ((input.counts.quizzes * 100).min(100)) as u32,
    },
    Rule {
        name: "Quiz Master",
        description: "Complete 10 quizzes",
        unlocked: |input| input.counts.quizzes >= QUIZ_MASTER_TARGET,
        progress: |input| ratio_progress(input.counts.quizzes, QUIZ_MASTER_TARGET),
    },
    Rule {
        name: "Perfect Score",
        description: "Score 100% on a quiz or exam",
        unlocked: |input| input.best_graded_score() >= 100,
        progress: |input| input.best_graded_score().min(100),
    },
    Rule {
        name: "Exam Champion",
        description: "Complete 5 exams",
        unlocked: |input| input.counts.exams >= EXAM_CHAMPION_TARGET,
        progress: |input| ratio_progress(input.counts.exams, EXAM_CHAMPION_TARGET),
    },
    Rule {
        name: "Flashcard Enthusiast",
        description: "Create 5 flashcard sets",
        unlocked: |input| input.counts.flashcard_sets >= FLASHCARD_TARGET,
        progress: |input| ratio_progress(input.counts.flashcard_sets, FLASHCARD_TARGET),
    },
    Rule {
        name: "Week Warrior",
        description: "Maintain a 7-day streak",
        unlocked: |input| input.current_streak >= STREAK_TARGET,
        progress: |input| ratio_progress(input.current_streak as usize, STREAK_TARGET as usize),
    },
    Rule {
        name: "Conversation Starter",
        description: "Have 10 chat sessions",
        unlocked: |input| input.counts.chat_sessions >= CHAT_TARGET,
        progress: |input| ratio_progress(input.counts.chat_sessions, CHAT_TARGET),
    },
];

fn ratio_progress(count: usize, target: usize) -> u32 {
    ((count as f64 / target as f64) * 100.0).min(100.0).round() as u32
}

/// Evaluates the fixed rule table against one input snapshot, so the
/// milestone view can never disagree with the numeric stats view.
pub fn evaluate(input: &AchievementInput) -> Vec<Achievement> {
    RULES
        .iter()
        .map(|rule| Achievement {
            name: rule.name,
            description: rule.description,
            unlocked: (rule.unlocked)(input),
            progress_pct: (rule.progress)(input),
        })
        .collect()
}
