// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use core::num::NonZeroU16;
use curve_plot::{
    canvas::{Surface, SvgSurface},
    draw_axes,
    eval::{self, EvalErr, EvalErrKind, Ident, Idents, Program},
    lex::{LexErrKind, Lexer, Span, TokKind},
    parse::{self, ParseErrKind},
    shell::{self, Command, ReadOutcome},
    stdlib, trace, Number, Viewport, CURVE_STROKE,
};
use std::{
    fs::OpenOptions,
    io::{stdout, BufWriter, Write},
    process::ExitCode,
    sync::Arc,
};

const DEFAULT_WIDTH: u16 = 400;
const DEFAULT_HEIGHT: u16 = 400;
const DEFAULT_SCALE: Number = 40.0;

fn output_svg_filename(now: DateTime<Local>) -> String {
    format!(
        "{}-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        "svg"
    )
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
struct State {
    expr: Option<Arc<String>>,
    prog: Option<Program>,
    idents: Idents,
    view: Viewport,
}

fn try_main() -> anyhow::Result<()> {
    let mut state = State {
        expr: Some(Arc::new(String::from("x^2"))),
        prog: None,
        idents: stdlib::standard_idents(),
        view: Viewport::new(
            DEFAULT_WIDTH.try_into().unwrap(),
            DEFAULT_HEIGHT.try_into().unwrap(),
            DEFAULT_SCALE,
        )
        .context("default viewport is invalid")?,
    };

    let mut stdout = BufWriter::new(stdout());
    loop {
        if let Some(ref expr) = state.expr {
            writeln!(stdout, "y = {expr}")?;
        } else {
            writeln!(stdout, "y is not set")?;
        }

        let mut try_cmd = shell::input(&mut stdout, "> ")?;
        try_cmd.make_ascii_lowercase();
        writeln!(stdout)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::SetExpr => set_expr(&mut stdout, &mut state)?,

                Command::Plot => plot_expr(&mut stdout, &mut state)?,

                Command::SetView => set_view(&mut stdout, &mut state)?,

                Command::PrintProg => {
                    if let Some(ref prog) = state.prog {
                        shell::dump_program(&mut stdout, prog, format_args!("program"))?;
                    } else {
                        shell::prog_undefined(&mut stdout)?;
                    }
                }
            }
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn set_view<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    writeln!(out, "view = {:#}", state.view)?;
    writeln!(out)?;
    writeln!(out, "note: leave blank to keep the current value")?;

    let mut width: NonZeroU16 = state.view.width().try_into().unwrap();
    let mut height: NonZeroU16 = state.view.height().try_into().unwrap();
    let mut scale = state.view.scale();

    writeln!(out, "note: width and height must be nonzero integers")?;
    for (name, dst) in [("width", &mut width), ("height", &mut height)] {
        match shell::prompt_parse::<_, NonZeroU16>(
            &mut out,
            format_args!("?{name} (is {cur}) = ", cur = *dst),
        )? {
            ReadOutcome::Value(new) => *dst = new,
            ReadOutcome::Skipped => {}
            ReadOutcome::Invalid => return Ok(()),
        }
    }

    writeln!(out, "note: scale is pixels per graph unit and must be positive")?;
    match shell::prompt_parse::<_, Number>(&mut out, format_args!("?scale (is {scale}) = "))? {
        ReadOutcome::Value(new) => scale = new,
        ReadOutcome::Skipped => {}
        ReadOutcome::Invalid => return Ok(()),
    }

    match Viewport::new(width, height, scale) {
        Some(view) => state.view = view,
        None => writeln!(out, "error: scale must be a positive number")?,
    }

    Ok(())
}

fn plot_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    compile_expr(&mut out, state)?;

    let (expr, prog) = if let Some(ref expr) = state.expr {
        if let Some(ref prog) = state.prog {
            (expr, prog)
        } else {
            shell::prog_undefined(&mut out)?;
            return Ok(());
        }
    } else {
        shell::expr_undefined(&mut out)?;
        return Ok(());
    };

    // clear, axes and grid, then the curve on top
    let view = &state.view;
    let mut surface = SvgSurface::new(view.width(), view.height());
    surface.clear();
    draw_axes(&mut surface, view);

    let mut stack: Vec<Number> = Vec::new();
    let mut first_err: Option<EvalErr> = None;
    let summary = trace(&mut surface, view, CURVE_STROKE, |x| {
        eval::eval(prog, &state.idents, x, &mut stack).map_err(|err| {
            // keep one representative failure for the report
            if first_err.is_none() {
                first_err = Some(err);
            }
        })
    });

    writeln!(
        out,
        "traced {drawn} of {total} samples in {segments} segment{s} ({skipped} skipped)",
        drawn = summary.drawn,
        total = summary.drawn + summary.skipped,
        segments = summary.segments,
        s = if summary.segments == 1 { "" } else { "s" },
        skipped = summary.skipped,
    )?;

    let now = Local::now();
    let svg_path = output_svg_filename(now);
    let mut file = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&svg_path)
            .context("failed to open output svg file")?,
    );
    file.write_all(surface.render().as_bytes())
        .context("failed to write output svg file")?;
    file.flush()?;
    file.get_mut().sync_data()?;
    writeln!(out, "wrote {svg_path}")?;

    if let Some(err) = first_err {
        writeln!(out)?;
        let loc = err.instr.clone().map(|instr| instr.loc);
        shell::underline(
            &mut out,
            &loc.clone()
                .unwrap_or_else(|| Span::new(Arc::clone(expr), expr.len(), 1)),
        )?;
        writeln!(out, "evaluation error: {err}")?;

        if loc.is_none() {
            writeln!(
                out,
                "note: exactly 1 final value is expected on the stack after evaluation"
            )?;
        }

        match err.kind {
            EvalErrKind::Empty | EvalErrKind::MissingArgs { .. } => {}

            EvalErrKind::StackMismatch { .. } => {
                writeln!(
                    out,
                    "note: implicit multiplication is not supported, so for example '5x' would be '5*x'",
                )?;
            }

            EvalErrKind::UndefinedIdent { text } => {
                let needle = text.text().to_ascii_lowercase();
                let most_similar = state
                    .idents
                    .iter()
                    .map(|(name, ident)| {
                        (
                            strsim::normalized_damerau_levenshtein(
                                &needle,
                                &name.text().to_ascii_lowercase(),
                            ),
                            (name, ident),
                        )
                    })
                    .reduce(|(acc_sim, acc_kv), (elem_sim, elem_kv)| {
                        if elem_sim > acc_sim {
                            (elem_sim, elem_kv)
                        } else {
                            (acc_sim, acc_kv)
                        }
                    });
                if let Some((sim, (name, ident))) = most_similar {
                    if sim > 0.3 {
                        let ident_kind = match ident {
                            Ident::Var => "variable",
                            Ident::Const(_) => "constant",
                            Ident::Fun(_) => "function",
                        };
                        writeln!(out, "note: {ident_kind} '{name}' has a similar name")?;
                    }
                }
            }
        }
    }

    Ok(())
}

fn set_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let input = shell::input(&mut out, "y = ")?;
    submit_expr(out, state, input)
}

fn submit_expr<W: Write>(mut out: W, state: &mut State, input: String) -> anyhow::Result<()> {
    if input.trim().is_empty() {
        // nothing is compiled, evaluated or drawn for a blank expression
        shell::expr_empty(&mut out)?;
        return Ok(());
    }

    state.prog = None;
    state.expr = Some(Arc::new(input));

    compile_expr(&mut out, state)?;

    Ok(())
}

fn compile_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    if state.prog.is_some() {
        return Ok(());
    }
    let input = if let Some(ref expr) = state.expr {
        expr
    } else {
        return Ok(());
    };

    match parse::parse(Lexer::new(input), &state.idents) {
        Ok(prog) => {
            state.prog = Some(prog);
        }

        Err(err) => {
            writeln!(out)?;
            shell::underline(&mut out, &err.loc)?;
            writeln!(out, "parse error: {}", err.kind)?;
            match err.kind {
                ParseErrKind::Lex(lex_err) => match lex_err {
                    LexErrKind::InvalidChar => {
                        writeln!(
                            out,
                            "note: available tokens are numbers, alphabetic identifiers, and symbols +-*/^,()"
                        )?;
                    }
                    LexErrKind::Unsupported(kind) => match kind {
                        TokKind::XEqual => {
                            writeln!(out, "note: expected an expression but found an equation")?;
                        }
                        TokKind::XLess | TokKind::XGreater => {
                            writeln!(out, "note: expected an expression but found an inequality")?;
                        }
                        TokKind::XPipe => {
                            writeln!(
                                out,
                                "note: use the 'abs' function to compute absolute value"
                            )?;
                        }
                        TokKind::Ident
                        | TokKind::Number
                        | TokKind::Op(_)
                        | TokKind::Comma
                        | TokKind::OpenParen
                        | TokKind::CloseParen => {
                            unreachable!("supported token reported as unsupported")
                        }
                    },
                },

                ParseErrKind::Num(_) => {
                    writeln!(out, "note: parsing as a floating point number")?;
                }

                ParseErrKind::ParenMismatch => {}
            }
        }
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_state() -> State {
        State {
            expr: None,
            prog: None,
            idents: stdlib::standard_idents(),
            view: Viewport::new(
                DEFAULT_WIDTH.try_into().unwrap(),
                DEFAULT_HEIGHT.try_into().unwrap(),
                DEFAULT_SCALE,
            )
            .unwrap(),
        }
    }

    #[test]
    fn blank_expression_notifies_once_and_changes_nothing() {
        let mut state = fresh_state();
        for raw in ["", "   ", "\t \t"] {
            let mut out = Vec::new();
            submit_expr(&mut out, &mut state, String::from(raw)).unwrap();
            assert_eq!(
                String::from_utf8(out).unwrap(),
                "please enter a mathematical expression\n"
            );
            assert!(state.expr.is_none());
            assert!(state.prog.is_none());
        }
    }

    #[test]
    fn blank_input_keeps_the_previous_expression() {
        let mut state = fresh_state();
        let mut out = Vec::new();
        submit_expr(&mut out, &mut state, String::from("x^2")).unwrap();
        assert!(String::from_utf8(out).unwrap().is_empty());
        assert!(state.prog.is_some());

        let mut out = Vec::new();
        submit_expr(&mut out, &mut state, String::new()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "please enter a mathematical expression\n"
        );
        assert_eq!(state.expr.as_deref().map(String::as_str), Some("x^2"));
        assert!(state.prog.is_some());
    }
}
