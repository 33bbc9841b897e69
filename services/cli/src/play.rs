use crate::cli::QuizData;
use crate::render;
use clap::Args;
use solution_finder::error::AppError;
use solution_finder::quiz::{QuizController, QuizError, QuizEvent, QuizObserver, WizardView};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

#[derive(Args, Debug, Default)]
pub(crate) struct PlayArgs {
    /// Print the per-product score breakdown once the quiz completes
    #[arg(long)]
    pub(crate) explain: bool,
}

enum Notification {
    View(WizardView),
    Rejected(QuizError),
}

/// Buffers controller notifications until the prompt loop renders them.
#[derive(Clone, Default)]
struct NotificationQueue {
    pending: Rc<RefCell<VecDeque<Notification>>>,
}

impl NotificationQueue {
    fn drain(&self) -> Vec<Notification> {
        self.pending.borrow_mut().drain(..).collect()
    }
}

impl QuizObserver for NotificationQueue {
    fn state_changed(&mut self, view: &WizardView) {
        self.pending
            .borrow_mut()
            .push_back(Notification::View(view.clone()));
    }

    fn transition_rejected(&mut self, error: &QuizError) {
        self.pending
            .borrow_mut()
            .push_back(Notification::Rejected(error.clone()));
    }
}

enum Command {
    Event(QuizEvent),
    Quit,
    Ignore,
}

pub(crate) fn run_play(args: PlayArgs, data: QuizData) -> Result<(), AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let controller = QuizController::new(Arc::new(data.questionnaire), data.engine);
    play_session(controller, args.explain, stdin.lock(), &mut stdout.lock())?;
    Ok(())
}

fn play_session<R: BufRead, W: Write>(
    mut controller: QuizController,
    explain: bool,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    let queue = NotificationQueue::default();
    controller.subscribe(Box::new(queue.clone()));

    writeln!(out, "Solution Finder")?;
    render::render_view(&controller.view(), out)?;

    for line in input.lines() {
        let line = line?;
        let event = match parse_command(line.trim(), &controller) {
            Command::Event(event) => event,
            Command::Quit => break,
            Command::Ignore => continue,
        };

        debug!(?event, "quiz input");
        // Outcomes arrive through the queue as well.
        let _ = controller.handle(event);

        for notification in queue.drain() {
            match notification {
                Notification::View(view) => {
                    render::render_view(&view, out)?;
                    if explain && controller.is_completed() {
                        let sheet = controller.engine().score(controller.answers());
                        render::render_explanation(&sheet, out)?;
                    }
                }
                Notification::Rejected(error) => render::render_rejection(&error, out)?,
            }
        }
        out.flush()?;
    }

    Ok(())
}

fn parse_command(input: &str, controller: &QuizController) -> Command {
    match input.to_ascii_lowercase().as_str() {
        "" => return Command::Ignore,
        "q" | "quit" | "exit" => return Command::Quit,
        "b" | "back" | "prev" | "previous" => return Command::Event(QuizEvent::Previous),
        "n" | "next" => return Command::Event(QuizEvent::Next),
        "r" | "restart" => return Command::Event(QuizEvent::Restart),
        _ => {}
    }

    let Some(question) = controller.current_question() else {
        // Anything else after completion is an attempt to keep answering.
        return Command::Event(QuizEvent::Next);
    };

    let value = input
        .parse::<usize>()
        .ok()
        .and_then(|choice| choice.checked_sub(1))
        .and_then(|index| question.options.get(index))
        .map(|option| option.value.clone())
        .unwrap_or_else(|| input.to_string());

    Command::Event(QuizEvent::SelectAnswer {
        question: question.key.clone(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn transcript(input: &str, explain: bool) -> String {
        let mut out = Vec::new();
        play_session(
            QuizController::standard(),
            explain,
            Cursor::new(input.to_string()),
            &mut out,
        )
        .expect("session runs");
        String::from_utf8(out).expect("utf8 transcript")
    }

    #[test]
    fn numbered_and_named_answers_complete_the_quiz() {
        let text = transcript("1\nenterprise\n2\nlegacy\n1\n", false);

        assert!(text.contains("Question 5 of 5"));
        assert!(text.contains("Complete!"));
        assert!(text.contains("[Best Match] 100% Match"));
        assert!(text.contains("E-Lab"));
    }

    #[test]
    fn next_without_answer_prompts_again() {
        let text = transcript("next\nquit\n", false);
        assert!(text.contains("Please choose an answer before continuing."));
        assert!(!text.contains("Question 2 of 5"));
    }

    #[test]
    fn back_then_next_reuses_recorded_answer() {
        let text = transcript("pharmacy\nback\nnext\n", false);
        let second_step_renders = text.matches("Question 2 of 5").count();
        assert_eq!(second_step_renders, 2);
        assert!(text.contains("*4) Pharmacy"));
    }

    #[test]
    fn invalid_option_is_reported() {
        let text = transcript("9\n", false);
        assert!(text.contains(
            "Cannot do that: '9' is not a permissible answer for 'facilityType'"
        ));
    }

    #[test]
    fn explain_prints_breakdown_after_completion() {
        let text = transcript("lab\nsmall\nlab-automation\npaper\nuae\n", true);
        assert!(text.contains("Score breakdown"));
        assert!(text.contains("- elab: 25"));
    }

    #[test]
    fn restart_after_completion_returns_to_first_question() {
        let text = transcript("lab\nsmall\nlab-automation\npaper\nuae\nrestart\n", false);
        let after_results = text.split("Complete!").nth(1).expect("results rendered");
        assert!(after_results.contains("Question 1 of 5"));
    }
}
