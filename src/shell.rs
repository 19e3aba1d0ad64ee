// SPDX: CC0-1.0

use crate::{eval::Program, lex::Span};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetExpr,
    PrintProg,
    Plot,
    SetView,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetExpr,
            Self::Plot,
            Self::SetView,
            Self::PrintProg,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetExpr => "set the expression to plot",
            Self::PrintProg => "print the program compiled from the expression (for debugging)",
            Self::Plot => "plot the curve of the expression that has been set",
            Self::SetView => "set viewport parameters",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetExpr => "set",
            Self::PrintProg => "prog",
            Self::Plot => "plot",
            Self::SetView => "view",
        }
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for c in Self::exhaustive() {
            if s == c.name() {
                return Ok(*c);
            }
        }
        Err(())
    }
}

/// result of prompting for an optional value
#[derive(Debug)]
pub enum ReadOutcome<T> {
    Value(T),
    /// blank input, keep whatever was there
    Skipped,
    /// unparseable input, already reported to the user
    Invalid,
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn prompt_parse<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
) -> anyhow::Result<ReadOutcome<T>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let raw = Arc::new(input(&mut out, prompt)?);
    if raw.is_empty() {
        return Ok(ReadOutcome::Skipped);
    }
    match raw.parse::<T>() {
        Ok(val) => Ok(ReadOutcome::Value(val)),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &Span::all(raw))?;
            writeln!(out, "parse error: {err}")?;
            Ok(ReadOutcome::Invalid)
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &Span) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.start()),
        "^".repeat(span.len())
    )?;
    Ok(())
}

pub fn dump_program<W: Write>(
    mut out: W,
    prog: &Program,
    title: core::fmt::Arguments,
) -> io::Result<()> {
    writeln!(out, "{title}: ")?;
    if prog.instrs().len() == 0 {
        writeln!(out, "  (empty)")?;
    }
    for instr in prog.instrs() {
        writeln!(out, "  {instr}")?;
    }
    Ok(())
}

pub fn expr_undefined<W: Write>(mut out: W) -> io::Result<()> {
    writeln!(out, "error: no expression is defined")
}

pub fn expr_empty<W: Write>(mut out: W) -> io::Result<()> {
    writeln!(out, "please enter a mathematical expression")
}

pub fn prog_undefined<W: Write>(mut out: W) -> io::Result<()> {
    writeln!(out, "error: no program is defined")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_parses_from_its_name() {
        for cmd in Command::exhaustive() {
            assert_eq!(cmd.name().parse::<Command>(), Ok(*cmd));
        }
        assert!("bogus".parse::<Command>().is_err());
    }

    #[test]
    fn underline_points_at_the_span() {
        let src = Arc::new(String::from("1 + oops"));
        let span = Span::new(Arc::clone(&src), 4, 4);
        let mut out = Vec::new();
        underline(&mut out, &span).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 + oops\n    ^^^^\n");
    }
}
