use crate::play::{run_play, PlayArgs};
use crate::recommend::{run_recommend, RecommendArgs};
use crate::render;
use clap::{Args, Parser, Subcommand};
use solution_finder::config::{AppConfig, QuizConfig};
use solution_finder::error::AppError;
use solution_finder::quiz::{Questionnaire, ScoringEngine};
use solution_finder::telemetry;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Solution Finder",
    about = "Answer a few questions and get ranked product recommendations",
    version
)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through the quiz interactively (default command)
    Play(PlayArgs),
    /// Score a set of answers without the step wizard
    Recommend(RecommendArgs),
    /// List every question and its permissible answers
    Questions,
}

/// Overrides for the quiz data and ranking settings loaded from the environment.
#[derive(Args, Debug, Default)]
pub(crate) struct DataArgs {
    /// JSON questionnaire replacing the built-in questions
    #[arg(long, global = true)]
    pub(crate) questionnaire: Option<PathBuf>,
    /// JSON product catalog replacing the built-in catalog
    #[arg(long, global = true)]
    pub(crate) catalog: Option<PathBuf>,
    /// Rule table (.csv or .json) replacing the built-in scoring rules
    #[arg(long, global = true)]
    pub(crate) rules: Option<PathBuf>,
    /// Maximum number of recommendations to show
    #[arg(long, global = true, value_parser = parse_limit)]
    pub(crate) limit: Option<usize>,
    /// Score that counts as a 100% match
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) calibration: Option<u32>,
}

impl DataArgs {
    fn apply(self, config: &mut QuizConfig) {
        if let Some(path) = self.questionnaire {
            config.questionnaire_path = Some(path);
        }
        if let Some(path) = self.catalog {
            config.catalog_path = Some(path);
        }
        if let Some(path) = self.rules {
            config.rules_path = Some(path);
        }
        if let Some(limit) = self.limit {
            config.result_limit = limit;
        }
        if let Some(calibration) = self.calibration {
            config.match_calibration = calibration;
        }
    }
}

fn parse_limit(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(format!("expected a positive number of results, got '{raw}'")),
    }
}

/// Static quiz data shared by every command.
pub(crate) struct QuizData {
    pub(crate) questionnaire: Questionnaire,
    pub(crate) engine: ScoringEngine,
}

impl QuizData {
    pub(crate) fn load(config: &QuizConfig) -> Result<Self, AppError> {
        let questionnaire = Questionnaire::from_config(config)?;
        let engine = ScoringEngine::from_config(config)?;
        Ok(Self {
            questionnaire,
            engine,
        })
    }
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    cli.data.apply(&mut config.quiz);

    telemetry::init(&config.telemetry)?;

    let data = QuizData::load(&config.quiz)?;
    info!(
        environment = ?config.environment,
        questions = data.questionnaire.total_steps(),
        products = data.engine.catalog().len(),
        "solution finder ready"
    );

    let command = cli
        .command
        .unwrap_or_else(|| Command::Play(PlayArgs::default()));

    match command {
        Command::Play(args) => run_play(args, data),
        Command::Recommend(args) => run_recommend(args, &data),
        Command::Questions => {
            let stdout = std::io::stdout();
            render::render_questionnaire(&data.questionnaire, &mut stdout.lock())?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn data_flags_override_quiz_config() {
        let cli = Cli::try_parse_from(["solution-finder", "recommend", "--limit", "2"])
            .expect("flags parse");
        let mut config = QuizConfig::default();
        cli.data.apply(&mut config);
        assert_eq!(config.result_limit, 2);
        assert_eq!(config.match_calibration, 25);
    }

    #[test]
    fn zero_limit_is_a_usage_error() {
        let err = Cli::try_parse_from(["solution-finder", "--limit", "0"])
            .expect_err("zero limit rejected");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn zero_calibration_is_a_usage_error() {
        let err = Cli::try_parse_from(["solution-finder", "questions", "--calibration", "0"])
            .expect_err("zero calibration rejected");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
