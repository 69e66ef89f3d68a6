//! Line-oriented terminal prompting
//!
//! [`Prompter`] is generic over its input and output streams so the interactive
//! session can be driven from in-memory buffers in tests.

use std::fmt::Display;
use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` without a newline and read one line of input.
    ///
    /// The trailing line terminator is removed; nothing else is trimmed.
    /// End of input is reported as [`io::ErrorKind::UnexpectedEof`].
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    /// Ask a Y/N question. Only `y` (after trimming, any case) counts as yes.
    pub fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let answer = self.ask(prompt)?;
        Ok(answer.trim().to_lowercase() == "y")
    }

    /// Print one line of output
    pub fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    /// Wait for one line of input before returning. A closed input is fine here.
    pub fn pause(&mut self, prompt: &str) -> io::Result<()> {
        match self.ask(prompt) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl Prompter<StdinLock<'static>, Stdout> {
    /// Prompter bound to the process's standard input and output
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}
