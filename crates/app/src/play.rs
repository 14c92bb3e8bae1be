//! Line-oriented quiz driver over the controller's view projection.

use std::io::{self, Write};

use quiz_core::model::{QuestionId, QuizMode};
use services::session::{AnswerMark, QuestionView, QuizSummary, format_elapsed};
use services::{AppServices, QuizController, QuizView, SessionError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    pub shuffle_answers: bool,
    pub asset_base_url: Option<String>,
}

/// Input lines plus an output sink.
pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R: AsyncBufRead + Unpin, W: Write> Console<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: reader.lines(),
            out,
        }
    }

    /// Prompt and read one trimmed line; `None` at end of input.
    async fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MenuCommand {
    Start(QuizMode),
    Custom,
    Subjects,
    Pool(Option<String>),
    Toggle(QuestionId),
    Selection,
    Clear,
    Help,
    Quit,
}

impl MenuCommand {
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = words.next()?;
        let arg = words.next();
        let cmd = match (command, arg) {
            ("all", None) => Self::Start(QuizMode::all()),
            ("random", None) => Self::Start(QuizMode::random()),
            ("module", Some(n)) => Self::Start(QuizMode::module(n.parse().ok()?)),
            ("subject", Some(name)) => Self::Start(QuizMode::subject(name)),
            ("custom", None) => Self::Custom,
            ("subjects", None) => Self::Subjects,
            ("pool", filter) => Self::Pool(filter.map(str::to_string)),
            ("toggle", Some(id)) => Self::Toggle(QuestionId::new(id)),
            ("selection", None) => Self::Selection,
            ("clear", None) => Self::Clear,
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            _ => return None,
        };
        if words.next().is_some() {
            return None;
        }
        Some(cmd)
    }
}

/// What the question loop should do after rendering.
enum Screen {
    Question { answers: usize, answered: bool },
    Finished,
}

/// Run the mode-selection menu until `quit` or end of input.
///
/// # Errors
///
/// Returns an I/O error if reading input or writing output fails.
pub async fn run<R, W>(
    app: &AppServices,
    options: &PlayOptions,
    console: &mut Console<R, W>,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut controller = app.controller();
    print_help(&mut console.out)?;

    loop {
        let Some(line) = console.ask("\nquiz> ").await? else {
            return Ok(());
        };
        if line.is_empty() {
            continue;
        }
        let Some(command) = MenuCommand::parse(&line) else {
            writeln!(console.out, "unknown command: {line} (type `help`)")?;
            continue;
        };

        let mode = match command {
            MenuCommand::Quit => return Ok(()),
            MenuCommand::Help => {
                print_help(&mut console.out)?;
                continue;
            }
            MenuCommand::Subjects => {
                print_subjects(app, &mut console.out)?;
                continue;
            }
            MenuCommand::Pool(filter) => {
                print_pool(app, filter.as_deref(), &mut console.out).await?;
                continue;
            }
            MenuCommand::Selection => {
                let selection = app.preferences().load().await;
                writeln!(console.out, "{} question(s) selected", selection.len())?;
                for id in selection.ids() {
                    writeln!(console.out, "  {id}")?;
                }
                continue;
            }
            MenuCommand::Toggle(id) => {
                match app.preferences().toggle(id.clone()).await {
                    Ok(selection) if selection.contains(&id) => {
                        writeln!(console.out, "added {id}")?;
                    }
                    Ok(_) => writeln!(console.out, "removed {id}")?,
                    Err(err) => {
                        warn!(error = %err, "failed to save custom selection");
                        writeln!(console.out, "could not save selection: {err}")?;
                    }
                }
                continue;
            }
            MenuCommand::Clear => {
                if let Err(err) = app.preferences().clear().await {
                    warn!(error = %err, "failed to clear custom selection");
                    writeln!(console.out, "could not clear selection: {err}")?;
                } else {
                    writeln!(console.out, "selection cleared")?;
                }
                continue;
            }
            MenuCommand::Custom => app.preferences().custom_mode(options.shuffle_answers).await,
            MenuCommand::Start(mode) => mode.with_randomized_answers(options.shuffle_answers),
        };

        info!(scope = ?mode.scope, "starting quiz");
        controller.start_session(mode).await;
        if !play_session(&mut controller, options, console).await? {
            return Ok(());
        }
    }
}

/// Drive one session to its end. Returns `false` if input ran out.
async fn play_session<R, W>(
    controller: &mut QuizController,
    options: &PlayOptions,
    console: &mut Console<R, W>,
) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let live_elapsed = controller.subscribe_elapsed().map(|rx| *rx.borrow());
        let screen = match controller.view() {
            QuizView::ModeSelection | QuizView::Loading { .. } => Screen::Finished,
            QuizView::NoQuestions { title } => {
                writeln!(console.out, "\n{title}: no questions found.")?;
                Screen::Finished
            }
            QuizView::Completed {
                title,
                summary,
                show_final_score_banner,
            } => {
                print_summary(&mut console.out, &title, &summary, show_final_score_banner)?;
                Screen::Finished
            }
            QuizView::Question(view) => {
                let elapsed = live_elapsed.unwrap_or(view.elapsed);
                print_question(&mut console.out, &view, elapsed, options)?;
                Screen::Question {
                    answers: view.answers.len(),
                    answered: view.feedback.is_some(),
                }
            }
        };

        let Screen::Question { answers, answered } = screen else {
            controller.back_to_mode_selection();
            return Ok(true);
        };

        let prompt = if answered {
            "[enter] continue, [q] menu: ".to_string()
        } else {
            format!("answer 1-{answers}, [q] menu: ")
        };
        let Some(line) = console.ask(&prompt).await? else {
            controller.back_to_mode_selection();
            return Ok(false);
        };
        if line.eq_ignore_ascii_case("q") {
            controller.back_to_mode_selection();
            return Ok(true);
        }

        let outcome = if answered {
            controller.continue_to_next().map(|_| ())
        } else {
            submit_choice(controller, &line)
        };
        if let Err(err) = outcome {
            writeln!(console.out, "{err}")?;
        }
    }
}

fn submit_choice(controller: &mut QuizController, line: &str) -> Result<(), SessionError> {
    let Some(position) = line.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
        return Err(SessionError::NoSelection);
    };
    controller.select_displayed(position)?;
    controller.submit_selected().map(|_| ())
}

fn print_question(
    out: &mut impl Write,
    view: &QuestionView<'_>,
    elapsed: chrono::Duration,
    options: &PlayOptions,
) -> io::Result<()> {
    let progress = &view.progress;
    writeln!(out)?;
    writeln!(
        out,
        "{} | question {}/{} | {:.0}% | {}",
        view.title,
        progress.position,
        progress.total,
        view.progress_fraction * 100.0,
        format_elapsed(elapsed)
    )?;
    if view.show_running_score {
        writeln!(
            out,
            "score: {}% ({} of {} correct)",
            view.score_percentage, progress.correct, progress.answered
        )?;
    }
    writeln!(out, "{}", view.question.prompt())?;
    let image = match options.asset_base_url.as_deref() {
        Some(base) => view.question.image_url(base),
        None => view.question.image().map(str::to_string),
    };
    if let Some(image) = image {
        writeln!(out, "[image: {image}]")?;
    }

    for answer in &view.answers {
        let marker = match view.feedback.as_ref().map(|marks| marks[answer.position]) {
            Some(AnswerMark::Correct) => "+",
            Some(AnswerMark::ChosenWrong) => "x",
            Some(AnswerMark::Neutral) => " ",
            None if view.selected == Some(answer.original_index) => ">",
            None => " ",
        };
        writeln!(out, " {marker} {}. {}", answer.position + 1, answer.text)?;
    }

    if view.feedback.is_some() {
        let wrong = view
            .feedback
            .as_ref()
            .is_some_and(|marks| marks.contains(&AnswerMark::ChosenWrong));
        let verdict = if wrong { "Wrong." } else { "Correct!" };
        let next = if view.is_last_question {
            "finish"
        } else {
            "next question"
        };
        writeln!(out, "{verdict} Press enter for the {next}.")?;
    }
    Ok(())
}

fn print_summary(
    out: &mut impl Write,
    title: &str,
    summary: &QuizSummary,
    show_final_score_banner: bool,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}: finished in {}", format_elapsed(summary.total_time))?;
    if show_final_score_banner {
        let verdict = if summary.passed { "passed" } else { "not passed" };
        writeln!(out, "Final score: {}% ({verdict})", summary.score_percentage)?;
    }
    writeln!(
        out,
        "{} correct out of {} attempts, {} wrong",
        summary.correct, summary.attempts, summary.wrong
    )
}

fn print_subjects(app: &AppServices, out: &mut impl Write) -> io::Result<()> {
    let catalog = app.catalog();
    for module in catalog.modules() {
        writeln!(out, "module {}: {}", module.number, module.name)?;
        for subject in catalog.subjects_in_module(module.number) {
            writeln!(out, "  {} ({})", subject.name, subject.display_name)?;
        }
    }
    Ok(())
}

async fn print_pool(app: &AppServices, filter: Option<&str>, out: &mut impl Write) -> io::Result<()> {
    let selection = app.preferences().load().await;
    let pool = app.builder().load_pool_with_ids().await;
    let mut shown = 0usize;
    for question in &pool {
        let Some(id) = question.id() else {
            continue;
        };
        if filter.is_some_and(|subject| id.parts().is_none_or(|(name, _)| name != subject)) {
            continue;
        }
        let mark = if selection.contains(id) { "*" } else { " " };
        writeln!(out, "{mark} {id}  {}", question.prompt())?;
        shown += 1;
    }
    writeln!(out, "{shown} question(s)")
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  all | random | module <n> | subject <name> | custom")?;
    writeln!(out, "  subjects                 list modules and subjects")?;
    writeln!(out, "  pool [subject]           list questions with their ids")?;
    writeln!(out, "  toggle <id>              add/remove a question from the custom quiz")?;
    writeln!(out, "  selection | clear        show or reset the custom quiz")?;
    writeln!(out, "  quit")
}
