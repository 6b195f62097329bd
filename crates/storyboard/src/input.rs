//! Reading and interpreting what the user types.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// The line that ends a `/paste` block.
const PASTE_END: &str = ".";

pub const DRAW_USAGE: &str = "usage: /draw <option number | prompt>";

/// Reads user input line by line from a single buffered source.
///
/// A line ending with `\` continues on the next one, so an excerpt can span
/// several lines.
pub struct InputReader<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> InputReader<R> {
    #[inline]
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Reads one logical line, joining continued lines with `\n`.
    ///
    /// Returns `None` at the end of input.
    pub async fn read_entry(&mut self) -> Option<String> {
        let mut entry = self.next_line().await?;
        while let Some(head) = entry.strip_suffix('\\') {
            let head_len = head.len();
            entry.truncate(head_len);
            entry.push('\n');
            match self.next_line().await {
                Some(line) => entry.push_str(&line),
                None => break,
            }
        }
        Some(entry)
    }

    /// Reads lines up to a line holding only `.`, or the end of input.
    pub async fn read_block(&mut self) -> String {
        let mut block = vec![];
        while let Some(line) = self.next_line().await {
            if line.trim() == PASTE_END {
                break;
            }
            block.push(line);
        }
        block.join("\n")
    }

    async fn next_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(err) => {
                error!("error reading input: {err}");
                None
            }
        }
    }
}

/// What a line of input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Quit,
    Show,
    Paste,
    Choose(usize),
    Draw(&'a str),
    Send(&'a str),
    Usage(&'static str),
}

impl<'a> Command<'a> {
    /// Interprets `line`, or returns `None` for a blank line.
    ///
    /// A bare number picks an option only while options are on offer;
    /// otherwise it is sent as text like anything else.
    pub fn parse(line: &'a str, has_options: bool) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if has_options {
            if let Ok(number) = line.parse() {
                return Some(Command::Choose(number));
            }
        }

        let command = match line {
            "/quit" | "/exit" => Command::Quit,
            "/show" => Command::Show,
            "/paste" => Command::Paste,
            "/draw" => Command::Usage(DRAW_USAGE),
            _ => match line.strip_prefix("/draw ").map(str::trim) {
                Some(arg) => match arg.parse() {
                    Ok(number) => Command::Choose(number),
                    Err(_) => Command::Draw(arg),
                },
                None => Command::Send(line),
            },
        };
        Some(command)
    }
}
