// SPDX: CC0-1.0

use crate::eval::Operator;
use core::{fmt, iter::Peekable, str::CharIndices};
use std::sync::Arc;

/// Byte range into a shared source string, carried on every token so
/// diagnostics can point back at the input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    src: Arc<String>,
    start: usize,
    len: usize,
}

impl Span {
    #[inline]
    pub const fn new(src: Arc<String>, start: usize, len: usize) -> Self {
        Self { src, start, len }
    }

    #[inline]
    pub fn all(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, 0, len)
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text(&self) -> &str {
        &self.src[self.start..self.start + self.len]
    }

    fn grow(&mut self, by: usize) {
        self.len += by;
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokKind {
    Ident,
    Number,
    Op(Operator),
    Comma,
    OpenParen,
    CloseParen,

    // recognized but unsupported, kept distinct so the shell can explain them
    XEqual,
    XPipe,
    XLess,
    XGreater,
}

impl TokKind {
    pub const fn is_supported(&self) -> bool {
        !matches!(
            self,
            Self::XEqual | Self::XPipe | Self::XLess | Self::XGreater
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub kind: TokKind,
    pub loc: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrKind {
    InvalidChar,
    Unsupported(TokKind),
}

impl fmt::Display for LexErrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar => write!(f, "invalid character"),
            Self::Unsupported(_) => write!(f, "unsupported character"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub kind: LexErrKind,
    pub loc: Span,
}

#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src Arc<String>, // assumed ascii; spans index bytes
    cur: Peekable<CharIndices<'src>>,
    done: bool, // fuse after the first error
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            cur: src.char_indices().peekable(),
            done: false,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some((_, chr)) = self.cur.peek() {
            if chr.is_ascii_whitespace() {
                self.cur.next();
            } else {
                break;
            }
        }
    }

    fn take_while<P>(&mut self, start: usize, kind: TokKind, predicate: P) -> Tok
    where
        P: Fn(char) -> bool,
    {
        let mut loc = Span::new(Arc::clone(self.src), start, 0);
        while let Some(&(_, chr)) = self.cur.peek() {
            if predicate(chr) {
                loc.grow(1);
                self.cur.next();
            } else {
                break;
            }
        }
        Tok { kind, loc }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.skip_whitespace();
        let &(start, chr) = self.cur.peek()?;

        let kind = match chr {
            '+' => TokKind::Op(Operator::Add),
            // the parser decides whether this is subtraction or negation
            '-' => TokKind::Op(Operator::Sub),
            '*' => TokKind::Op(Operator::Mul),
            '/' => TokKind::Op(Operator::Div),
            '^' => TokKind::Op(Operator::Pow),
            ',' => TokKind::Comma,
            '(' => TokKind::OpenParen,
            ')' => TokKind::CloseParen,

            '=' => TokKind::XEqual,
            '|' => TokKind::XPipe,
            '<' => TokKind::XLess,
            '>' => TokKind::XGreater,

            c if c.is_ascii_alphabetic() => {
                return Some(Ok(self.take_while(start, TokKind::Ident, |c| {
                    c.is_ascii_alphabetic()
                })));
            }
            c if c.is_ascii_digit() || c == '.' => {
                return Some(Ok(self.take_while(start, TokKind::Number, |c| {
                    c.is_ascii_digit() || c == '.'
                })));
            }

            _ => {
                self.done = true;
                return Some(Err(LexErr {
                    kind: LexErrKind::InvalidChar,
                    loc: Span::new(Arc::clone(self.src), start, 1),
                }));
            }
        };

        self.cur.next();
        let loc = Span::new(Arc::clone(self.src), start, 1);
        if kind.is_supported() {
            Some(Ok(Tok { kind, loc }))
        } else {
            self.done = true;
            Some(Err(LexErr {
                kind: LexErrKind::Unsupported(kind),
                loc,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Result<Vec<TokKind>, LexErr> {
        let src = Arc::new(String::from(src));
        Lexer::new(&src)
            .map(|tok| tok.map(|tok| tok.kind))
            .collect()
    }

    #[test]
    fn tokenizes_an_expression() {
        assert_eq!(
            kinds("2 * sin(x) + 1.5").unwrap(),
            vec![
                TokKind::Number,
                TokKind::Op(Operator::Mul),
                TokKind::Ident,
                TokKind::OpenParen,
                TokKind::Ident,
                TokKind::CloseParen,
                TokKind::Op(Operator::Add),
                TokKind::Number,
            ]
        );
    }

    #[test]
    fn minus_always_lexes_as_sub() {
        assert_eq!(
            kinds("-x - 1").unwrap(),
            vec![
                TokKind::Op(Operator::Sub),
                TokKind::Ident,
                TokKind::Op(Operator::Sub),
                TokKind::Number,
            ]
        );
    }

    #[test]
    fn spans_cover_their_tokens() {
        let src = Arc::new(String::from("abc + 12.5"));
        let toks: Vec<Tok> = Lexer::new(&src).collect::<Result<_, _>>().unwrap();
        assert_eq!(toks[0].loc.text(), "abc");
        assert_eq!(toks[2].loc.text(), "12.5");
    }

    #[test]
    fn invalid_character_errors_and_fuses() {
        let src = Arc::new(String::from("1 # 2"));
        let mut lexer = Lexer::new(&src);
        assert!(matches!(lexer.next(), Some(Ok(_))));
        let err = lexer.next().unwrap().unwrap_err();
        assert_eq!(err.kind, LexErrKind::InvalidChar);
        assert_eq!(err.loc.start(), 2);
        assert!(lexer.next().is_none());
    }

    #[test]
    fn equality_is_recognized_but_unsupported() {
        let err = kinds("x = 2").unwrap_err();
        assert_eq!(err.kind, LexErrKind::Unsupported(TokKind::XEqual));
    }
}
