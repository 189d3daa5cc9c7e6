use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;
use tracing::{error, info};

use crate::cerebras::SynthesisProvider;
use crate::exa::SearchProvider;
use crate::export::save_result;
use crate::report::format_result;
use crate::research::{Mode, Orchestrator, ResearchError, ResearchResult};

const RULE: &str = "==================================================";

/// Exit status of a process ended by SIGINT.
const INTERRUPTED_EXIT: i32 = 130;

/// Session-wide Ctrl-C routing. A press while research is running cancels
/// that research; a press anywhere else (menu, query or save prompt) ends
/// the process.
#[derive(Clone, Default)]
pub struct Interrupt {
    notify: Arc<Notify>,
    armed: Arc<AtomicBool>,
}

impl Interrupt {
    /// Installs the one Ctrl-C listener for the life of the process.
    pub fn listen() -> Self {
        let interrupt = Self::default();
        let router = interrupt.clone();
        tokio::spawn(async move {
            loop {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        if !router.route_press() {
                            eprintln!("\nInterrupted.");
                            std::process::exit(INTERRUPTED_EXIT);
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "cannot listen for Ctrl-C; research is not cancellable");
                        return;
                    }
                }
            }
        });
        interrupt
    }

    /// Hands a press to the running research, if any.
    fn route_press(&self) -> bool {
        if self.armed.load(Ordering::SeqCst) {
            self.notify.notify_waiters();
            true
        } else {
            false
        }
    }

    /// Resolves on the next press. Presses are routed here only while this
    /// future is alive.
    pub async fn pressed(&self) {
        let notified = self.notify.notified();
        let _armed = Armed::new(&self.armed);
        notified.await;
    }
}

struct Armed<'a>(&'a AtomicBool);

impl<'a> Armed<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Races a research call against `cancel`. Dropping the losing future
/// drops its in-flight HTTP request.
pub async fn cancellable<T>(
    work: impl Future<Output = Result<T, ResearchError>>,
    cancel: impl Future<Output = ()>,
) -> Result<T, ResearchError> {
    tokio::select! {
        biased;
        () = cancel => {
            info!("cancel requested");
            Err(ResearchError::Cancelled)
        }
        result = work => result,
    }
}

pub async fn run_mode<S, L>(
    orchestrator: &Orchestrator<S, L>,
    mode: Mode,
    query: &str,
) -> Result<ResearchResult, ResearchError>
where
    S: SearchProvider,
    L: SynthesisProvider,
{
    match mode {
        Mode::Basic => orchestrator.basic_research(query).await,
        Mode::Deep => orchestrator.deep_research(query).await,
    }
}

fn print_result(output: &mut impl Write, result: &ResearchResult) -> io::Result<()> {
    writeln!(output, "\n{RULE}")?;
    write!(output, "{}", format_result(result))?;
    writeln!(output, "{RULE}")
}

fn save_and_report(output: &mut impl Write, result: &ResearchResult, dir: &Path) -> io::Result<()> {
    match save_result(result, dir) {
        Ok(path) => writeln!(output, "Research saved to: {}", path.display()),
        Err(e) => {
            error!(error = %e, "failed to save research");
            writeln!(output, "Could not save results: {e}")
        }
    }
}

/// Reads one trimmed line; `None` on EOF.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt(output: &mut impl Write, text: &str) -> io::Result<()> {
    write!(output, "{text}")?;
    output.flush()
}

/// Non-interactive mode: research once, print, optionally save.
pub async fn run_once<S, L>(
    orchestrator: &Orchestrator<S, L>,
    query: &str,
    mode: Mode,
    save_dir: Option<&Path>,
    output: &mut impl Write,
    cancel: impl Future<Output = ()>,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: SearchProvider,
    L: SynthesisProvider,
{
    let result = cancellable(run_mode(orchestrator, mode, query), cancel).await?;
    print_result(output, &result)?;
    if let Some(dir) = save_dir {
        let path = save_result(&result, dir)?;
        writeln!(output, "Research saved to: {}", path.display())?;
    }
    Ok(())
}

/// Menu-driven loop: pick a mode, enter a query, read the report, optionally save.
/// Research errors are printed and the loop continues; EOF exits.
/// `cancel` is called once per research run.
pub async fn run_interactive<S, L, C>(
    orchestrator: &Orchestrator<S, L>,
    mut input: impl BufRead,
    output: &mut impl Write,
    save_dir: &Path,
    cancel: impl Fn() -> C,
) -> io::Result<()>
where
    S: SearchProvider,
    L: SynthesisProvider,
    C: Future<Output = ()>,
{
    loop {
        writeln!(output, "\nOptions:")?;
        writeln!(output, "1. Basic research")?;
        writeln!(output, "2. Deep research (two rounds)")?;
        writeln!(output, "3. Exit")?;
        prompt(output, "\nEnter your choice (1-3): ")?;

        let Some(choice) = read_line(&mut input)? else {
            break;
        };
        let mode = match choice.as_str() {
            "1" => Mode::Basic,
            "2" => Mode::Deep,
            "3" => {
                writeln!(output, "Goodbye!")?;
                return Ok(());
            }
            _ => {
                writeln!(output, "Invalid choice")?;
                continue;
            }
        };

        prompt(output, "\nEnter your research query: ")?;
        let Some(query) = read_line(&mut input)? else {
            break;
        };
        if query.is_empty() {
            continue;
        }

        let result = match cancellable(run_mode(orchestrator, mode, &query), cancel()).await {
            Ok(result) => result,
            Err(ResearchError::Cancelled) => {
                writeln!(output, "\nResearch cancelled.")?;
                continue;
            }
            Err(e) => {
                error!(error = %e, "research failed");
                writeln!(output, "Error: {e}")?;
                continue;
            }
        };
        print_result(output, &result)?;

        prompt(output, "\nSave results? (y/n): ")?;
        let Some(answer) = read_line(&mut input)? else {
            break;
        };
        if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
            save_and_report(output, &result, save_dir)?;
        }
    }
    Ok(())
}
