use solution_finder::quiz::{
    Questionnaire, QuizError, RecommendationList, ScoreSheet, WizardPhase, WizardView,
};
use std::io::{self, Write};

pub(crate) fn render_questionnaire<W: Write>(
    questionnaire: &Questionnaire,
    out: &mut W,
) -> io::Result<()> {
    for (index, question) in questionnaire.questions().iter().enumerate() {
        writeln!(out, "{}. {} ({})", index + 1, question.prompt, question.key)?;
        for option in &question.options {
            writeln!(out, "   - {}: {}", option.value, option.label)?;
        }
    }
    Ok(())
}

pub(crate) fn render_view<W: Write>(view: &WizardView, out: &mut W) -> io::Result<()> {
    match view.phase {
        WizardPhase::Step(step) => {
            writeln!(
                out,
                "\nQuestion {} of {} [{:>3.0}%]",
                step,
                view.total_steps,
                view.progress * 100.0
            )?;
            if let Some(question) = &view.question {
                writeln!(out, "{}", question.prompt)?;
                for (index, option) in question.options.iter().enumerate() {
                    let marker = if view.selected.as_deref() == Some(option.value.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    writeln!(out, " {marker}{}) {}", index + 1, option.label)?;
                }
            }

            let mut hints = Vec::new();
            if view.previous_enabled {
                hints.push("back".to_string());
            }
            if view.selected.is_some() {
                hints.push(format!("next ({})", view.next_label));
            }
            hints.push("restart".to_string());
            hints.push("quit".to_string());
            writeln!(out, "Choose an option or type: {}", hints.join(", "))
        }
        WizardPhase::Completed => {
            writeln!(out, "\nComplete!")?;
            match &view.recommendations {
                Some(recommendations) => render_recommendations(recommendations, out)?,
                None => render_recommendations(&RecommendationList::default(), out)?,
            }
            writeln!(out, "Type 'restart' to start over or 'quit' to leave.")
        }
    }
}

pub(crate) fn render_recommendations<W: Write>(
    recommendations: &RecommendationList,
    out: &mut W,
) -> io::Result<()> {
    if recommendations.is_empty() {
        return writeln!(out, "No product matched these answers.");
    }

    for recommendation in recommendations {
        writeln!(
            out,
            "\n[{}] {}% Match",
            recommendation.rank_label(),
            recommendation.match_percent
        )?;
        writeln!(
            out,
            "{} - {}",
            recommendation.product.name, recommendation.product.title
        )?;
        writeln!(out, "{}", recommendation.product.description)?;
        writeln!(out, "Learn more: {}", recommendation.product.link)?;
    }
    Ok(())
}

pub(crate) fn render_explanation<W: Write>(sheet: &ScoreSheet, out: &mut W) -> io::Result<()> {
    writeln!(out, "\nScore breakdown")?;
    for entry in sheet.positive() {
        let parts: Vec<String> = entry
            .contributions
            .iter()
            .map(|c| format!("{}={} +{}", c.question, c.answer, c.points))
            .collect();
        writeln!(out, "- {}: {} ({})", entry.key, entry.score, parts.join(", "))?;
    }
    Ok(())
}

pub(crate) fn render_rejection<W: Write>(error: &QuizError, out: &mut W) -> io::Result<()> {
    match error {
        QuizError::IncompleteStep { .. } => {
            writeln!(out, "Please choose an answer before continuing.")
        }
        other => writeln!(out, "Cannot do that: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solution_finder::quiz::QuizController;

    fn rendered(view: &WizardView) -> String {
        let mut out = Vec::new();
        render_view(view, &mut out).expect("render succeeds");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn first_step_lists_options_without_back_hint() {
        let controller = QuizController::standard();
        let text = rendered(&controller.view());

        assert!(text.contains("Question 1 of 5"));
        assert!(text.contains("1) Hospital"));
        assert!(!text.contains("back"));
    }

    #[test]
    fn completed_view_marks_best_match() {
        let mut controller = QuizController::standard();
        for (question, value) in [
            ("facilityType", "lab"),
            ("orgSize", "small"),
            ("primaryNeed", "lab-automation"),
            ("currentSystem", "paper"),
            ("region", "other"),
        ] {
            controller.select_answer(question, value).expect("accepted");
        }

        let text = rendered(&controller.view());
        assert!(text.contains("Complete!"));
        assert!(text.contains("[Best Match] 100% Match"));
        assert!(text.contains("E-Lab - Laboratory Information System"));
    }

    #[test]
    fn empty_recommendations_render_a_notice() {
        let mut out = Vec::new();
        render_recommendations(&RecommendationList::default(), &mut out).expect("render");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "No product matched these answers.\n"
        );
    }
}
