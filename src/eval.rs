// SPDX: CC0-1.0

use crate::{lex::Span, Number};
use core::fmt;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl Operator {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Neg | Self::Sub => "-",
            Self::Add => "+",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }

    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add | Self::Sub => 2,
            Self::Mul | Self::Div => 3,
            Self::Neg => 4,
            Self::Pow => 5,
        }
    }

    pub const fn associativity(&self) -> Associativity {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div => Associativity::Left,
            // -(-x) and 2^(3^2)
            Self::Neg | Self::Pow => Associativity::Right,
        }
    }

    pub const fn arity(&self) -> usize {
        match self {
            Self::Neg => 1,
            _ => 2,
        }
    }

    pub fn apply(&self, args: &[Number]) -> Number {
        match (self, args) {
            (Self::Neg, &[x]) => -x,
            (Self::Add, &[a, b]) => a + b,
            (Self::Sub, &[a, b]) => a - b,
            (Self::Mul, &[a, b]) => a * b,
            (Self::Div, &[a, b]) => a / b,
            (Self::Pow, &[a, b]) => a.powf(b),
            _ => unreachable!("arity is checked before apply"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum InstrKind {
    Push(Number),
    Op(Operator),
    Ident,
}

#[derive(Clone, Debug)]
pub struct Instr {
    pub kind: InstrKind,
    pub loc: Span,
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            InstrKind::Push(val) => write!(f, "push {val}"),
            InstrKind::Op(op) => write!(f, "apply '{}'", op.symbol()),
            InstrKind::Ident => write!(f, "call '{}'", self.loc.text()),
        }
    }
}

/// Identifier key usable both for built-ins (static names) and for names
/// taken from user input (spans). Compares and hashes by text.
#[derive(Clone, Debug, Eq)]
pub enum Name {
    Span(Span),
    Static(&'static str),
}

impl Name {
    pub fn text(&self) -> &str {
        match self {
            Self::Span(s) => s.text(),
            Self::Static(s) => s,
        }
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
    }
}

impl core::hash::Hash for Name {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.text().hash(state)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl From<Span> for Name {
    fn from(s: Span) -> Self {
        Self::Span(s)
    }
}

impl From<&'static str> for Name {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Fun {
    pub arity: usize,
    pub call: fn(&[Number]) -> Number,
}

impl Fun {
    pub const fn new(arity: usize, call: fn(&[Number]) -> Number) -> Self {
        Self { arity, call }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Ident {
    /// the plot variable, bound to the sample value during [`eval`]
    Var,
    Const(Number),
    Fun(Fun),
}

pub type Idents = HashMap<Name, Ident>;

/// expression compiled to reverse polish notation
#[derive(Debug)]
pub struct Program {
    pub(crate) instrs: Vec<Instr>,
}

impl Program {
    #[inline]
    pub const fn new(instrs: Vec<Instr>) -> Self {
        Self { instrs }
    }

    #[inline]
    pub fn instrs(&self) -> core::slice::Iter<'_, Instr> {
        self.instrs.iter()
    }
}

#[derive(Clone, Debug)]
pub enum EvalErrKind {
    Empty,
    MissingArgs {
        name: Name,
        arity: usize,
        found: usize,
    },
    StackMismatch {
        expected: usize,
        found: usize,
    },
    UndefinedIdent {
        text: Span,
    },
}

#[derive(Clone, Debug)]
pub struct EvalErr {
    pub kind: EvalErrKind,
    /// if none, the error came from end-of-program checking
    pub instr: Option<Instr>,
}

impl fmt::Display for EvalErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EvalErrKind::Empty => write!(f, "cannot evaluate an empty program"),

            EvalErrKind::MissingArgs { name, arity, found } => write!(
                f,
                "'{name}' requires {arity} argument{s}, but found {found}",
                s = if *arity == 1 { "" } else { "s" }
            ),

            EvalErrKind::StackMismatch { expected, found } => write!(
                f,
                "expected {expected} value{s} on the stack but found {found}",
                s = if *expected == 1 { "" } else { "s" }
            ),

            EvalErrKind::UndefinedIdent { text } => {
                write!(f, "undefined identifier '{text}'")
            }
        }
    }
}

fn missing_args(name: impl Into<Name>, arity: usize, found: usize, instr: &Instr) -> EvalErr {
    EvalErr {
        kind: EvalErrKind::MissingArgs {
            name: name.into(),
            arity,
            found,
        },
        instr: Some(instr.clone()),
    }
}

/// Runs `prog` with the plot variable bound to `x`. The scratch `stack` is
/// cleared on entry; reusing one allocation across samples keeps the per-pixel
/// evaluation cheap.
///
/// NaN and infinity are legal results here; rejecting them is the tracer's
/// job, not the evaluator's.
pub fn eval(
    prog: &Program,
    idents: &Idents,
    x: Number,
    stack: &mut Vec<Number>,
) -> Result<Number, EvalErr> {
    if prog.instrs.is_empty() {
        return Err(EvalErr {
            kind: EvalErrKind::Empty,
            instr: None,
        });
    }

    stack.clear();
    for instr in prog.instrs() {
        let val = match instr.kind {
            InstrKind::Push(num) => num,

            InstrKind::Op(op) => {
                let split = stack
                    .len()
                    .checked_sub(op.arity())
                    .ok_or_else(|| missing_args(op.symbol(), op.arity(), stack.len(), instr))?;
                let val = op.apply(&stack[split..]);
                stack.truncate(split);
                val
            }

            InstrKind::Ident => {
                let sym = instr.loc.clone();
                match idents.get(&sym.clone().into()) {
                    Some(Ident::Var) => x,
                    Some(Ident::Const(val)) => *val,
                    Some(Ident::Fun(fun)) => {
                        let split = stack
                            .len()
                            .checked_sub(fun.arity)
                            .ok_or_else(|| missing_args(sym, fun.arity, stack.len(), instr))?;
                        let val = (fun.call)(&stack[split..]);
                        stack.truncate(split);
                        val
                    }
                    None => {
                        return Err(EvalErr {
                            kind: EvalErrKind::UndefinedIdent { text: sym },
                            instr: Some(instr.clone()),
                        });
                    }
                }
            }
        };
        stack.push(val);
    }

    if stack.len() != 1 {
        return Err(EvalErr {
            kind: EvalErrKind::StackMismatch {
                expected: 1,
                found: stack.len(),
            },
            instr: None,
        });
    }
    Ok(stack.pop().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib;
    use std::sync::Arc;

    fn instr(kind: InstrKind, text: &str) -> Instr {
        let src = Arc::new(String::from(text));
        Instr {
            kind,
            loc: Span::all(src),
        }
    }

    fn run(instrs: Vec<Instr>, x: Number) -> Result<Number, EvalErr> {
        let prog = Program::new(instrs);
        let mut stack = Vec::new();
        eval(&prog, &stdlib::standard_idents(), x, &mut stack)
    }

    #[test]
    fn operators_apply() {
        assert_eq!(Operator::Neg.apply(&[3.0]), -3.0);
        assert_eq!(Operator::Add.apply(&[1.0, 2.0]), 3.0);
        assert_eq!(Operator::Sub.apply(&[1.0, 2.0]), -1.0);
        assert_eq!(Operator::Mul.apply(&[3.0, 4.0]), 12.0);
        assert_eq!(Operator::Div.apply(&[1.0, 4.0]), 0.25);
        assert_eq!(Operator::Pow.apply(&[2.0, 10.0]), 1024.0);
    }

    #[test]
    fn variable_takes_the_sample_value() {
        let got = run(vec![instr(InstrKind::Ident, "x")], 7.5).unwrap();
        assert_eq!(got, 7.5);
    }

    #[test]
    fn empty_program_is_an_error() {
        let err = run(vec![], 0.0).unwrap_err();
        assert!(matches!(err.kind, EvalErrKind::Empty));
    }

    #[test]
    fn leftover_stack_values_are_an_error() {
        let err = run(
            vec![
                instr(InstrKind::Push(1.0), "1"),
                instr(InstrKind::Push(2.0), "2"),
            ],
            0.0,
        )
        .unwrap_err();
        assert!(matches!(
            err.kind,
            EvalErrKind::StackMismatch {
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn operator_without_arguments_is_an_error() {
        let err = run(vec![instr(InstrKind::Op(Operator::Add), "+")], 0.0).unwrap_err();
        assert!(matches!(
            err.kind,
            EvalErrKind::MissingArgs { arity: 2, found: 0, .. }
        ));
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let err = run(vec![instr(InstrKind::Ident, "frobnicate")], 0.0).unwrap_err();
        match err.kind {
            EvalErrKind::UndefinedIdent { text } => assert_eq!(text.text(), "frobnicate"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn names_compare_by_text() {
        let spanned: Name = Span::all(Arc::new(String::from("pi"))).into();
        assert_eq!(spanned, Name::Static("pi"));
    }
}
