// SPDX: CC0-1.0

// shunting yard algorithm by dijkstra (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm),
// with '-' resolved to negation wherever an operand may start

use crate::{
    eval::{Associativity, Ident, Idents, Instr, InstrKind, Operator, Program},
    lex::{LexErr, LexErrKind, Lexer, Span, TokKind},
    Number,
};
use core::{fmt, num::ParseFloatError};

#[derive(Debug)]
pub enum ParseErrKind {
    Lex(LexErrKind),
    Num(ParseFloatError),
    ParenMismatch,
}

impl fmt::Display for ParseErrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{err}"),
            Self::Num(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
        }
    }
}

#[derive(Debug)]
pub struct ParseErr {
    pub kind: ParseErrKind,
    pub loc: Span,
}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            kind: ParseErrKind::Lex(err.kind),
            loc: err.loc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StackOpKind {
    Op(Operator),
    Fun,
    OpenParen,
}

#[derive(Clone, Debug)]
struct StackOp {
    kind: StackOpKind,
    loc: Span,
}

impl StackOp {
    /// whether this stacked operator must move to the output before
    /// `incoming` goes on the stack
    fn binds_before(&self, incoming: Operator) -> bool {
        match self.kind {
            StackOpKind::OpenParen => false,
            // function application binds tightest
            StackOpKind::Fun => true,
            StackOpKind::Op(op) => {
                op.precedence() > incoming.precedence()
                    || (op.precedence() == incoming.precedence()
                        && incoming.associativity() == Associativity::Left)
            }
        }
    }

    fn into_output(self) -> Instr {
        let kind = match self.kind {
            StackOpKind::Op(op) => InstrKind::Op(op),
            StackOpKind::Fun => InstrKind::Ident,
            StackOpKind::OpenParen => unreachable!("parentheses never reach the output"),
        };
        Instr {
            kind,
            loc: self.loc,
        }
    }
}

pub fn parse(lex: Lexer<'_>, idents: &Idents) -> Result<Program, ParseErr> {
    let mut out: Vec<Instr> = Vec::new(); // output, in reverse polish order
    let mut ops: Vec<StackOp> = Vec::new(); // operator stack
    let mut expect_operand = true;

    for tok in lex {
        let tok = tok?;
        match tok.kind {
            TokKind::Number => {
                let num: Number = tok.loc.text().parse().map_err(|err| ParseErr {
                    kind: ParseErrKind::Num(err),
                    loc: tok.loc.clone(),
                })?;
                out.push(Instr {
                    kind: InstrKind::Push(num),
                    loc: tok.loc,
                });
                expect_operand = false;
            }

            TokKind::Ident => match idents.get(&tok.loc.clone().into()) {
                Some(Ident::Fun(_)) => {
                    ops.push(StackOp {
                        kind: StackOpKind::Fun,
                        loc: tok.loc,
                    });
                    expect_operand = true;
                }
                // unknown names parse as variables; whether they exist is an
                // evaluation-time question
                _ => {
                    out.push(Instr {
                        kind: InstrKind::Ident,
                        loc: tok.loc,
                    });
                    expect_operand = false;
                }
            },

            TokKind::Op(op) => {
                let op = if expect_operand && op == Operator::Sub {
                    Operator::Neg
                } else {
                    op
                };
                // a prefix operator has no left operand to fight over
                if op.arity() == 2 {
                    while let Some(top) = ops.last() {
                        if top.binds_before(op) {
                            let top = ops.pop().unwrap();
                            out.push(top.into_output());
                        } else {
                            break;
                        }
                    }
                }
                ops.push(StackOp {
                    kind: StackOpKind::Op(op),
                    loc: tok.loc,
                });
                expect_operand = true;
            }

            TokKind::Comma => {
                while let Some(top) = ops.last() {
                    if top.kind != StackOpKind::OpenParen {
                        let top = ops.pop().unwrap();
                        out.push(top.into_output());
                    } else {
                        break;
                    }
                }
                expect_operand = true;
            }

            TokKind::OpenParen => {
                ops.push(StackOp {
                    kind: StackOpKind::OpenParen,
                    loc: tok.loc,
                });
                expect_operand = true;
            }

            TokKind::CloseParen => {
                while let Some(top) = ops.last() {
                    if top.kind != StackOpKind::OpenParen {
                        let top = ops.pop().unwrap();
                        out.push(top.into_output());
                    } else {
                        break;
                    }
                }

                match ops.pop() {
                    Some(open) if open.kind == StackOpKind::OpenParen => {}
                    Some(op) => {
                        return Err(ParseErr {
                            kind: ParseErrKind::ParenMismatch,
                            loc: op.loc,
                        });
                    }
                    None => {
                        return Err(ParseErr {
                            kind: ParseErrKind::ParenMismatch,
                            loc: tok.loc,
                        });
                    }
                }

                // the parenthesis group was a function's argument list
                if let Some(top) = ops.last() {
                    if top.kind == StackOpKind::Fun {
                        let top = ops.pop().unwrap();
                        out.push(top.into_output());
                    }
                }
                expect_operand = false;
            }

            TokKind::XEqual | TokKind::XPipe | TokKind::XLess | TokKind::XGreater => {
                unreachable!("unsupported token survived lexing")
            }
        }
    }

    while let Some(op) = ops.pop() {
        if op.kind == StackOpKind::OpenParen {
            return Err(ParseErr {
                kind: ParseErrKind::ParenMismatch,
                loc: op.loc,
            });
        }
        out.push(op.into_output());
    }

    Ok(Program::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{eval, EvalErr, EvalErrKind};
    use crate::stdlib;
    use std::sync::Arc;

    fn compile(src: &str) -> Result<Program, ParseErr> {
        let src = Arc::new(String::from(src));
        parse(Lexer::new(&src), &stdlib::standard_idents())
    }

    fn eval_str(src: &str, x: Number) -> Result<Number, EvalErr> {
        let prog = compile(src).unwrap();
        let mut stack = Vec::new();
        eval(&prog, &stdlib::standard_idents(), x, &mut stack)
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(eval_str("1 + 2*3", 0.0).unwrap(), 7.0);
        assert_eq!(eval_str("(1 + 2)*3", 0.0).unwrap(), 9.0);
        assert_eq!(eval_str("7 - 4 - 1", 0.0).unwrap(), 2.0);
        assert_eq!(eval_str("8/4/2", 0.0).unwrap(), 1.0);
    }

    #[test]
    fn pow_is_right_associative() {
        assert_eq!(eval_str("2^3^2", 0.0).unwrap(), 512.0);
    }

    #[test]
    fn unary_minus() {
        assert_eq!(eval_str("-x", 3.0).unwrap(), -3.0);
        assert_eq!(eval_str("3 - -2", 0.0).unwrap(), 5.0);
        assert_eq!(eval_str("-(1 + 2)", 0.0).unwrap(), -3.0);
        // negation binds looser than the exponent
        assert_eq!(eval_str("-x^2", 3.0).unwrap(), -9.0);
        assert_eq!(eval_str("2^-3", 0.0).unwrap(), 0.125);
    }

    #[test]
    fn functions_and_constants() {
        assert!((eval_str("sin(pi/2)", 0.0).unwrap() - 1.0).abs() < 1e-12);
        assert!((eval_str("log(8, 2)", 0.0).unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(eval_str("max(1, x)", 5.0).unwrap(), 5.0);
        assert_eq!(eval_str("sqrt(x^2)", -4.0).unwrap(), 4.0);
    }

    #[test]
    fn parabola_value_at_half() {
        assert_eq!(eval_str("x^2", 0.5).unwrap(), 0.25);
    }

    #[test]
    fn implicit_multiplication_is_rejected_at_eval() {
        let err = eval_str("5x", 1.0).unwrap_err();
        assert!(matches!(err.kind, EvalErrKind::StackMismatch { .. }));
    }

    #[test]
    fn function_without_arguments_is_rejected_at_eval() {
        let err = eval_str("sin()", 0.0).unwrap_err();
        assert!(matches!(
            err.kind,
            EvalErrKind::MissingArgs { arity: 1, found: 0, .. }
        ));
    }

    #[test]
    fn empty_input_compiles_to_an_empty_program() {
        let prog = compile("").unwrap();
        assert_eq!(prog.instrs().len(), 0);
    }

    #[test]
    fn mismatched_parentheses() {
        assert!(matches!(
            compile("(1 + 2").unwrap_err().kind,
            ParseErrKind::ParenMismatch
        ));
        assert!(matches!(
            compile("1 + 2)").unwrap_err().kind,
            ParseErrKind::ParenMismatch
        ));
    }

    #[test]
    fn malformed_number() {
        let err = compile("1.2.3").unwrap_err();
        assert!(matches!(err.kind, ParseErrKind::Num(_)));
        assert_eq!(err.loc.text(), "1.2.3");
    }

    #[test]
    fn lex_errors_carry_through() {
        let err = compile("x + $").unwrap_err();
        assert!(matches!(err.kind, ParseErrKind::Lex(LexErrKind::InvalidChar)));
        assert_eq!(err.loc.start(), 4);
    }
}
