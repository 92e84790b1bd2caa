// # Confirmation policies
//
// Before a record is written the engine asks a `Confirm` implementation
// whether to go ahead. The binary picks the policy:
//
// - `-y` given                  → engine skips the question entirely
// - stdout is a terminal        → `InteractivePrompt` over stdin/stdout
// - otherwise                   → `AlwaysNo`
//
// Tests use `AlwaysYes`/`AlwaysNo` or an `InteractivePrompt` over in-memory
// buffers.

use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;

/// Decides whether a pending change may be applied
///
/// Implementations may block (e.g. on terminal input). The engine calls
/// `confirm` at most once per record, and only when the record content
/// actually differs from the current IP.
pub trait Confirm: Send + Sync {
    /// Ask whether to apply the change described by `question`
    fn confirm(&self, question: &str) -> bool;
}

/// Approves every change
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysYes;

impl Confirm for AlwaysYes {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}

/// Declines every change (the non-interactive default)
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysNo;

impl Confirm for AlwaysNo {
    fn confirm(&self, _question: &str) -> bool {
        false
    }
}

/// Asks a human on `writer` and reads one line from `reader`
///
/// `y` and `yes` (any case, surrounding whitespace ignored) approve; anything
/// else, including an empty line, EOF or a read error, declines.
pub struct InteractivePrompt<R, W> {
    reader: Mutex<R>,
    writer: Mutex<W>,
}

impl<R, W> InteractivePrompt<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    /// Consume the prompt and return the writer (for inspecting test output)
    pub fn into_writer(self) -> Option<W> {
        self.writer.into_inner().ok()
    }
}

impl InteractivePrompt<BufReader<Stdin>, Stdout> {
    /// Prompt on stdout, answer on stdin
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R, W> Confirm for InteractivePrompt<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm(&self, question: &str) -> bool {
        if let Ok(mut writer) = self.writer.lock() {
            if write!(writer, "{} (Y/n) ", question)
                .and_then(|_| writer.flush())
                .is_err()
            {
                tracing::warn!("Failed to write confirmation prompt");
            }
        }

        let Ok(mut reader) = self.reader.lock() else {
            return false;
        };

        let mut answer = String::new();
        match reader.read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                tracing::warn!("Failed to read confirmation answer: {}", e);
                false
            }
        }
    }
}

/// `y` / `yes`, case-insensitive, surrounding whitespace ignored
fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "y" || answer == "yes"
}
