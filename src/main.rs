use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod achievements;
mod models;
mod report;
mod stats;
mod store;
mod streak;
mod subjects;
mod trend;
mod window;

use window::TimeRange;

#[derive(Parser)]
#[command(name = "study-insights")]
#[command(about = "Learning activity analytics over exported study event logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print aggregate statistics for a time range
    Stats {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long, value_enum, default_value = "week")]
        range: TimeRange,
        /// Pin "now" to the end of this date for reproducible output
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Rank subjects by average score
    Subjects {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long, value_enum, default_value = "week")]
        range: TimeRange,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show achievement progress
    Achievements {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long, value_enum, default_value = "week")]
        range: TimeRange,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export per-subject stats to CSV
    Export {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long, value_enum, default_value = "week")]
        range: TimeRange,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value = "subjects.csv")]
        out: PathBuf,
    },
}

fn resolve_now(as_of: Option<NaiveDate>) -> anyhow::Result<DateTime<Utc>> {
    match as_of {
        Some(date) => Ok(date
            .and_hms_opt(23, 59, 59)
            .context("invalid as-of date")?
            .and_utc()),
        None => Ok(Utc::now()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { data_dir, range, as_of } => {
            let now = resolve_now(as_of)?;
            let log = store::load_events(&data_dir)?;
            let stats = stats::aggregate(&log, range, now);

            println!("Statistics for {}:", report::range_label(range));
            println!(
                "- Quizzes: {} (average {}%, best {}%)",
                stats.total_quizzes, stats.average_quiz_score, stats.best_quiz_score
            );
            println!(
                "- Exams: {} (average {}%, best {}%)",
                stats.total_exams, stats.average_exam_score, stats.best_exam_score
            );
            println!("- Combined average: {}%", stats.combined_average);
            println!(
                "- Flashcard sets: {} ({} cards)",
                stats.total_flashcard_sets, stats.total_flashcards
            );
            println!(
                "- Chat sessions: {} ({} messages)",
                stats.total_chat_sessions, stats.total_messages
            );
            println!("- Documents: {}", stats.total_documents);
            println!("- Study time: {} minutes", stats.study_minutes);
            println!("- Current streak: {} days", stats.current_streak);
            println!("- Activity score: {}/100", stats.activity_score);
        }
        Commands::Subjects { data_dir, range, as_of, limit } => {
            let now = resolve_now(as_of)?;
            let log = store::load_events(&data_dir)?;
            let subject_stats =
                subjects::aggregate_by_subject(&log.quizzes, &log.evaluations, range, now);

            if subject_stats.is_empty() {
                println!("No graded work found for this window.");
                return Ok(());
            }

            println!("Subjects by average score ({}):", report::range_label(range));
            for stat in subject_stats.iter().take(limit) {
                println!(
                    "- {}: average {}% across {} attempts (accuracy {}%, marks {}/{})",
                    stat.subject,
                    stat.average,
                    stat.attempt_count,
                    stat.accuracy,
                    stat.total_marks,
                    stat.max_marks
                );
            }
        }
        Commands::Achievements { data_dir, as_of } => {
            let now = resolve_now(as_of)?;
            let log = store::load_events(&data_dir)?;
            let stats = stats::aggregate(&log, TimeRange::All, now);
            let input = achievements::AchievementInput::new(&log, &stats);

            for achievement in achievements::evaluate(&input) {
                let marker = if achievement.unlocked { "x" } else { " " };
                println!(
                    "[{marker}] {}: {} ({}%)",
                    achievement.name, achievement.description, achievement.progress_pct
                );
            }
        }
        Commands::Report { data_dir, range, as_of, out } => {
            let now = resolve_now(as_of)?;
            let log = store::load_events(&data_dir)?;
            let report = report::build_report(&log, range, now);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { data_dir, range, as_of, out } => {
            let now = resolve_now(as_of)?;
            let log = store::load_events(&data_dir)?;
            let subject_stats =
                subjects::aggregate_by_subject(&log.quizzes, &log.evaluations, range, now);
            report::write_subject_csv(&out, &subject_stats)?;
            println!(
                "Exported {} subjects to {}.",
                subject_stats.len(),
                out.display()
            );
        }
    }

    Ok(())
}
