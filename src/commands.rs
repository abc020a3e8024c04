//! Line-oriented command interpreter over a [`Sheet`].
//!
//! ```text
//! set A1 =B1*2     # everything after "A1 " is the cell text, may be empty
//! get A1           # print the value
//! text A1          # print the text
//! clear A1
//! refs A1          # print referenced cells, comma separated
//! ```

use log::debug;
use regex::Regex;
use sheetcell_core::{Position, Sheet};
use std::io::{BufRead, Write};
use std::sync::OnceLock;

use crate::error::{CommandError, Result};

#[derive(Debug, PartialEq)]
enum Command {
    Set(Position, String),
    Get(Position),
    Text(Position),
    Clear(Position),
    Refs(Position),
}

fn command_re() -> &'static Regex {
    static COMMAND_RE: OnceLock<Regex> = OnceLock::new();
    COMMAND_RE.get_or_init(|| {
        Regex::new(r"^(?<cmd>[A-Za-z]+)(?:\s+(?<pos>\S+)(?: (?<text>.*))?)?$")
            .expect("command regex must compile")
    })
}

/// Parse one line. Blank lines and `#` comments yield `None`.
fn parse_command(line: &str, line_no: usize) -> Result<Option<Command>> {
    let line = line.trim_start();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parse_error = |message: String| CommandError::Parse {
        line: line_no,
        message,
    };

    let caps = command_re()
        .captures(line)
        .ok_or_else(|| parse_error(format!("malformed command '{}'", line)))?;
    let cmd = caps["cmd"].to_ascii_lowercase();
    let pos = match caps.name("pos") {
        Some(m) => Position::from_str(m.as_str())
            .ok_or_else(|| parse_error(format!("invalid position '{}'", m.as_str())))?,
        None => return Err(parse_error(format!("'{}' needs a position", cmd))),
    };
    let text = caps.name("text").map(|m| m.as_str());

    let command = match (cmd.as_str(), text) {
        ("set", text) => Command::Set(pos, text.unwrap_or_default().to_string()),
        ("get", None) => Command::Get(pos),
        ("text", None) => Command::Text(pos),
        ("clear", None) => Command::Clear(pos),
        ("refs", None) => Command::Refs(pos),
        ("get" | "text" | "clear" | "refs", Some(_)) => {
            return Err(parse_error(format!("'{}' takes only a position", cmd)));
        }
        _ => return Err(parse_error(format!("unknown command '{}'", cmd))),
    };
    Ok(Some(command))
}

fn execute(sheet: &mut Sheet, command: Command) -> Result<Option<String>> {
    debug!("executing {:?}", command);
    let output = match command {
        Command::Set(pos, text) => {
            sheet.set_cell(pos, &text)?;
            None
        }
        Command::Get(pos) => Some(sheet.value(&pos)?.to_string()),
        Command::Text(pos) => Some(sheet.text(&pos)?),
        Command::Clear(pos) => {
            sheet.clear_cell(&pos)?;
            None
        }
        Command::Refs(pos) => Some(
            sheet
                .referenced_cells(&pos)?
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(","),
        ),
    };
    Ok(output)
}

/// Run every command from `input`, writing results and per-line errors to `out`.
///
/// Returns the number of commands that failed.
pub fn run<R: BufRead, W: Write>(sheet: &mut Sheet, input: R, out: &mut W) -> Result<usize> {
    let mut failures = 0;
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let result = parse_command(&line, idx + 1).and_then(|command| match command {
            Some(command) => execute(sheet, command),
            None => Ok(None),
        });
        match result {
            Ok(Some(output)) => writeln!(out, "{}", output)?,
            Ok(None) => {}
            Err(err) => {
                failures += 1;
                writeln!(out, "error: {}", err)?;
            }
        }
    }
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(name: &str) -> Position {
        Position::from_str(name).unwrap()
    }

    fn run_script(script: &str) -> (String, usize) {
        let mut sheet = Sheet::new();
        let mut out = Vec::new();
        let failures = run(&mut sheet, script.as_bytes(), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), failures)
    }

    #[test]
    fn test_parse_set_keeps_text_verbatim() {
        assert_eq!(
            parse_command("set A1 =1 + 2", 1).unwrap(),
            Some(Command::Set(pos("A1"), "=1 + 2".into()))
        );
        assert_eq!(
            parse_command("set B2  padded ", 1).unwrap(),
            Some(Command::Set(pos("B2"), " padded ".into()))
        );
        assert_eq!(
            parse_command("set c3", 1).unwrap(),
            Some(Command::Set(pos("C3"), String::new()))
        );
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert_eq!(parse_command("", 1).unwrap(), None);
        assert_eq!(parse_command("   ", 1).unwrap(), None);
        assert_eq!(parse_command("# set A1 1", 1).unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["bogus A1", "get", "get A0", "get A1 extra", "set ?? 1"] {
            assert!(
                matches!(parse_command(bad, 7), Err(CommandError::Parse { line: 7, .. })),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn test_run_script() {
        let (output, failures) = run_script(
            "set A1 2\n\
             set B1 =A1*(A1+1)\n\
             get B1\n\
             text B1\n\
             refs B1\n\
             set A1 'x\n\
             get A1\n\
             get B1\n\
             clear A1\n\
             get B1\n",
        );
        assert_eq!(output, "6\n=A1*(A1+1)\nA1\nx\n#VALUE!\n0\n");
        assert_eq!(failures, 0);
    }

    #[test]
    fn test_run_reports_errors_and_continues() {
        let (output, failures) = run_script("set A1 =A1\nset A2 =1/\nget A1\nget A3\n");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "error: Circular dependency detected at A1: A1 -> A1");
        assert!(lines[1].starts_with("error: Formula syntax error"));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "");
        assert_eq!(failures, 2);
    }
}
