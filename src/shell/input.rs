//! Cancellable line input for the shell.
//!
//! The shell reads every answer through [`Prompt`]. On a terminal the line
//! is read key by key in raw mode so Ctrl-C and Ctrl-D can cancel the
//! current operation instead of killing the process. Anywhere else lines
//! come from a plain [`BufRead`].

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::fmt;
use std::io::{self, BufRead, Write};

/// Why a prompt produced no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancel {
    /// Ctrl-C.
    Interrupt,
    /// Ctrl-D or end of the input stream.
    EndOfInput,
}

impl fmt::Display for Cancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cancel::Interrupt => write!(f, "interrupt"),
            Cancel::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// Outcome of reading one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Line(String),
    Cancelled(Cancel),
}

/// A source of answers for the shell.
pub trait Prompt {
    /// Read one line, without its terminator.
    fn read_line(&mut self) -> io::Result<Reply>;

    /// Whether end of input is permanent, so nothing more will ever arrive.
    fn is_exhausted(&self) -> bool;
}

/// Reads `\n`-terminated lines from any buffered reader.
///
/// Used when stdin is not a terminal. Nothing here intercepts Ctrl-C, so an
/// interrupt terminates the process as usual.
pub struct LineInput<R> {
    reader: R,
    exhausted: bool,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            exhausted: false,
        }
    }
}

impl<R: BufRead> Prompt for LineInput<R> {
    fn read_line(&mut self) -> io::Result<Reply> {
        if self.exhausted {
            return Ok(Reply::Cancelled(Cancel::EndOfInput));
        }

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            self.exhausted = true;
            return Ok(Reply::Cancelled(Cancel::EndOfInput));
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Reply::Line(line))
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Reads lines from an interactive terminal in raw mode.
///
/// Echoes printable keys, handles Backspace, and maps Ctrl-C to an
/// interrupt and Ctrl-D on an empty line to end of input.
pub struct TerminalInput<W> {
    echo: W,
}

impl<W: Write> TerminalInput<W> {
    pub fn new(echo: W) -> Self {
        Self { echo }
    }

    fn read_raw(&mut self) -> io::Result<Reply> {
        let mut line = String::new();

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }

            match edit_line(&mut line, key) {
                KeyAction::Insert(c) => {
                    write!(self.echo, "{}", c)?;
                }
                KeyAction::Erase => {
                    write!(self.echo, "\u{8} \u{8}")?;
                }
                KeyAction::Submit => {
                    write!(self.echo, "\r\n")?;
                    self.echo.flush()?;
                    return Ok(Reply::Line(line));
                }
                KeyAction::Cancel(cancel) => {
                    write!(self.echo, "\r\n")?;
                    self.echo.flush()?;
                    return Ok(Reply::Cancelled(cancel));
                }
                KeyAction::Ignore => {}
            }
            self.echo.flush()?;
        }
    }
}

impl<W: Write> Prompt for TerminalInput<W> {
    fn read_line(&mut self) -> io::Result<Reply> {
        terminal::enable_raw_mode()?;
        let result = self.read_raw();
        terminal::disable_raw_mode()?;
        result
    }

    fn is_exhausted(&self) -> bool {
        false
    }
}

/// What a key press does to the line being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Insert(char),
    Erase,
    Submit,
    Cancel(Cancel),
    Ignore,
}

fn edit_line(line: &mut String, key: KeyEvent) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => KeyAction::Cancel(Cancel::Interrupt),
        KeyCode::Char('d') if ctrl && line.is_empty() => KeyAction::Cancel(Cancel::EndOfInput),
        KeyCode::Char(_) if ctrl => KeyAction::Ignore,
        KeyCode::Char(c) => {
            line.push(c);
            KeyAction::Insert(c)
        }
        KeyCode::Backspace => match line.pop() {
            Some(_) => KeyAction::Erase,
            None => KeyAction::Ignore,
        },
        KeyCode::Enter => KeyAction::Submit,
        _ => KeyAction::Ignore,
    }
}
