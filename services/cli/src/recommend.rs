use crate::cli::QuizData;
use crate::render;
use clap::Args;
use serde::Serialize;
use solution_finder::error::AppError;
use solution_finder::quiz::{AnswerStore, Questionnaire, RecommendationList, ScoreSheet};
use std::io::{self, Write};

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Answer as question=value; repeat for each answered question
    #[arg(long = "answer", short = 'a', value_parser = parse_answer)]
    pub(crate) answers: Vec<(String, String)>,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
    /// Include the per-product score breakdown
    #[arg(long)]
    pub(crate) explain: bool,
}

#[derive(Debug, Serialize)]
struct RecommendResponse<'a> {
    answers: &'a AnswerStore,
    recommendations: &'a RecommendationList,
    #[serde(skip_serializing_if = "Option::is_none")]
    scores: Option<&'a ScoreSheet>,
}

pub(crate) fn run_recommend(args: RecommendArgs, data: &QuizData) -> Result<(), AppError> {
    let answers = collect_answers(&args.answers, &data.questionnaire)?;
    let sheet = data.engine.score(&answers);
    let recommendations = data.engine.rank(&sheet);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        let response = RecommendResponse {
            answers: &answers,
            recommendations: &recommendations,
            scores: args.explain.then_some(&sheet),
        };
        let body = serde_json::to_string_pretty(&response).map_err(io::Error::from)?;
        writeln!(out, "{body}")?;
        return Ok(());
    }

    render::render_recommendations(&recommendations, &mut out)?;
    if args.explain {
        render::render_explanation(&sheet, &mut out)?;
    }
    Ok(())
}

/// Checks each answer against the questionnaire before it reaches the store.
fn collect_answers(
    pairs: &[(String, String)],
    questionnaire: &Questionnaire,
) -> Result<AnswerStore, AppError> {
    let mut answers = AnswerStore::new();
    for (question_key, value) in pairs {
        let question = questionnaire
            .get(question_key)
            .ok_or_else(|| AppError::Usage(format!("unknown question '{question_key}'")))?;
        if !question.allows(value) {
            let allowed: Vec<&str> = question
                .options
                .iter()
                .map(|option| option.value.as_str())
                .collect();
            return Err(AppError::Usage(format!(
                "'{value}' is not a valid answer for '{question_key}' (expected one of: {})",
                allowed.join(", ")
            )));
        }
        answers.set(question_key.clone(), value.clone());
    }
    Ok(answers)
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    let (question, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected question=value, got '{raw}'"))?;
    let (question, value) = (question.trim(), value.trim());
    if question.is_empty() || value.is_empty() {
        return Err(format!("expected question=value, got '{raw}'"));
    }
    Ok((question.to_string(), value.to_string()))
}
