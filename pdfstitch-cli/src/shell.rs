//! Interactive shell over a [`Controller`].
//!
//! The shell is a thin view: commands call controller operations, and the
//! screen is redrawn from the snapshots the controller publishes. A merge
//! runs in the background, so commands typed meanwhile see the busy state.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::debug;

use pdfstitch::candidate::FileInput;
use pdfstitch::controller::{Controller, ControllerEvent, StateSnapshot};
use pdfstitch::error::{Result, StitchError};
use pdfstitch::io::{InputLoader, expand_patterns};
use pdfstitch::output::{OutputFormatter, format_bytes};

const PROMPT: &str = "pdfstitch> ";

const HELP: &str = "\
Commands:
  add <file|glob>...   append files to the list
  drop <file|glob>...  drop files onto the list
  rm <n>               remove entry n
  mv <from> <to>       move entry <from> to position <to>
  drag <n>             pick up entry n
  release <n>          put the picked-up entry at position n
  cancel               put the picked-up entry back
  ls                   show the list
  clear                remove every entry
  merge                merge the list into one PDF
  help                 show this text
  quit                 leave (waits for a running merge)";

/// One line of shell input. Indices are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Append files matching the patterns.
    Add(Vec<String>),
    /// Add files through the drop region.
    Drop(Vec<String>),
    /// Remove one entry.
    Remove(usize),
    /// Move one entry.
    Move {
        /// Current position.
        from: usize,
        /// New position.
        to: usize,
    },
    /// Start a drag on an entry.
    Drag(usize),
    /// Finish the drag on a position.
    Release(usize),
    /// Abandon the drag.
    Cancel,
    /// Show the collection.
    List,
    /// Empty the collection.
    Clear,
    /// Start a merge.
    Merge,
    /// Show the command list.
    Help,
    /// Leave the shell.
    Quit,
}

impl Command {
    /// Parse one line. Positions are typed 1-based.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err("empty command".to_string());
        };
        let args: Vec<&str> = words.collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "add" => Command::Add(patterns(name, &args)?),
            "drop" => Command::Drop(patterns(name, &args)?),
            "rm" | "remove" => {
                let [n] = arity::<1>(name, &args)?;
                Command::Remove(position(n)?)
            }
            "mv" | "move" => {
                let [from, to] = arity::<2>(name, &args)?;
                Command::Move {
                    from: position(from)?,
                    to: position(to)?,
                }
            }
            "drag" => {
                let [n] = arity::<1>(name, &args)?;
                Command::Drag(position(n)?)
            }
            "release" => {
                let [n] = arity::<1>(name, &args)?;
                Command::Release(position(n)?)
            }
            "cancel" => bare(name, &args, Command::Cancel)?,
            "ls" | "list" => bare(name, &args, Command::List)?,
            "clear" => bare(name, &args, Command::Clear)?,
            "merge" => bare(name, &args, Command::Merge)?,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };

        Ok(command)
    }
}

fn patterns(name: &str, args: &[&str]) -> std::result::Result<Vec<String>, String> {
    if args.is_empty() {
        return Err(format!("usage: {name} <file|glob>..."));
    }
    Ok(args.iter().map(|s| s.to_string()).collect())
}

fn arity<'a, const N: usize>(name: &str, args: &[&'a str]) -> std::result::Result<[&'a str; N], String> {
    <[&str; N]>::try_from(args)
        .map_err(|_| format!("'{name}' takes {N} argument{}", if N == 1 { "" } else { "s" }))
}

fn bare(name: &str, args: &[&str], command: Command) -> std::result::Result<Command, String> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(format!("'{name}' takes no arguments"))
    }
}

fn position(word: &str) -> std::result::Result<usize, String> {
    match word.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("'{word}' is not a list position (1, 2, ...)")),
    }
}

/// The interactive session.
pub struct Shell {
    controller: Arc<Controller>,
    loader: InputLoader,
    jobs: usize,
    formatter: OutputFormatter,
    merge: Option<JoinHandle<Result<pdfstitch::controller::ExportReceipt>>>,
    last_rendered: Option<StateSnapshot>,
}

impl Shell {
    /// Create a shell over `controller`.
    pub fn new(controller: Arc<Controller>, formatter: OutputFormatter, jobs: usize) -> Self {
        Self {
            controller,
            loader: InputLoader::new(),
            jobs,
            formatter,
            merge: None,
            last_rendered: None,
        }
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut events = self.controller.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        self.formatter.info("Type 'help' for commands.");
        self.render(self.controller.snapshot());
        prompt().await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        prompt().await?;
                        continue;
                    }
                    match Command::parse(&line) {
                        Ok(command) => {
                            if self.execute(command).await.is_break() {
                                break;
                            }
                        }
                        Err(message) => self.formatter.warning(&message),
                    }
                    self.drain(&mut events);
                    prompt().await?;
                }
                event = events.recv() => self.on_event(event),
            }
        }

        self.finish().await;
        self.drain(&mut events);
        Ok(())
    }

    /// Apply one command.
    pub async fn execute(&mut self, command: Command) -> ControlFlow<()> {
        debug!(?command, "shell command");

        let outcome = match command {
            Command::Add(patterns) => self.load(&patterns).await.and_then(|inputs| {
                self.controller.add(inputs).map(|_| ())
            }),
            Command::Drop(patterns) => {
                self.controller.drag_enter_zone();
                match self.load(&patterns).await {
                    Ok(inputs) => self.controller.drop_files(inputs).map(|_| ()),
                    Err(err) => {
                        self.controller.drag_leave_zone();
                        Err(err)
                    }
                }
            }
            Command::Remove(index) => self.controller.remove(index),
            Command::Move { from, to } => self.controller.reorder(from, to),
            Command::Drag(index) => self.controller.begin_drag(index),
            Command::Release(index) => self.controller.drop_on_item(index),
            Command::Cancel => {
                self.controller.end_drag();
                Ok(())
            }
            Command::List => {
                self.formatter.collection(&self.controller.snapshot());
                Ok(())
            }
            Command::Clear => self.controller.clear(),
            Command::Merge => {
                self.start_merge();
                Ok(())
            }
            Command::Help => {
                println!("{HELP}");
                Ok(())
            }
            Command::Quit => return ControlFlow::Break(()),
        };

        if let Err(err) = outcome {
            self.report(&err);
        }
        ControlFlow::Continue(())
    }

    /// Wait for a background merge, if one is running.
    pub async fn finish(&mut self) {
        if let Some(handle) = self.merge.take() {
            if !handle.is_finished() {
                self.formatter.info("Waiting for the merge to finish...");
            }
            // Outcomes arrive as controller events
            if let Err(err) = handle.await {
                self.formatter.error(&format!("Merge task failed: {err}"));
            }
        }
    }

    /// Spawn a merge unless one is running or still waiting to start.
    fn start_merge(&mut self) {
        let pending = self.merge.as_ref().is_some_and(|handle| !handle.is_finished());
        if pending || self.controller.is_busy() {
            self.report(&StitchError::Busy);
            return;
        }

        let controller = Arc::clone(&self.controller);
        self.merge = Some(tokio::spawn(async move {
            controller.merge_and_export().await
        }));
    }

    /// Expand and read files, reporting the ones that could not be read.
    async fn load(&self, patterns: &[String]) -> Result<Vec<FileInput>> {
        let paths = expand_patterns(patterns)?;
        let mut inputs = Vec::with_capacity(paths.len());

        for result in self.loader.load_all(&paths, self.jobs).await {
            match result {
                Ok(input) => inputs.push(input),
                Err(err) => self.formatter.error(&err.to_string()),
            }
        }

        Ok(inputs)
    }

    fn report(&self, err: &StitchError) {
        match err {
            StitchError::Busy => self.formatter.warning("A merge is running; try again when it finishes."),
            err => self.formatter.error(&err.to_string()),
        }
    }

    fn drain(&mut self, events: &mut broadcast::Receiver<ControllerEvent>) {
        loop {
            match events.try_recv() {
                Ok(event) => self.on_event(Ok(event)),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }

    fn on_event(&mut self, event: std::result::Result<ControllerEvent, RecvError>) {
        match event {
            Ok(ControllerEvent::StateChanged(snapshot)) => self.render(snapshot),
            Ok(ControllerEvent::Exported(receipt)) => self.formatter.success(&format!(
                "Merged {} documents into {} ({})",
                receipt.documents,
                receipt.location,
                format_bytes(receipt.size, 2)
            )),
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "shell fell behind controller events");
                self.render(self.controller.snapshot());
            }
            Err(RecvError::Closed) => {}
        }
    }

    fn render(&mut self, snapshot: StateSnapshot) {
        if self.last_rendered.as_ref() == Some(&snapshot) {
            return;
        }
        self.formatter.collection(&snapshot);
        self.last_rendered = Some(snapshot);
    }
}

async fn prompt() -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(PROMPT.as_bytes()).await?;
    stdout.flush().await
}
