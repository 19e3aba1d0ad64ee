// SPDX: CC0-1.0

use crate::{
    eval::{Fun, Ident, Idents},
    Number,
};
use core::f64::consts;
use std::collections::HashMap; // assumes Number = f64

/// name of the plot variable
pub const X: &str = "x";

pub fn standard_idents() -> Idents {
    let mut ret = HashMap::new();

    ret.insert(X.into(), Ident::Var);

    ret.insert("pi".into(), Ident::Const(consts::PI));
    ret.insert("tau".into(), Ident::Const(consts::TAU));
    ret.insert("e".into(), Ident::Const(consts::E));

    ret.insert("abs".into(), Ident::Fun(Fun::new(1, abs)));
    ret.insert("sqrt".into(), Ident::Fun(Fun::new(1, sqrt)));
    ret.insert("cbrt".into(), Ident::Fun(Fun::new(1, cbrt)));
    ret.insert("exp".into(), Ident::Fun(Fun::new(1, exp)));
    ret.insert("ln".into(), Ident::Fun(Fun::new(1, ln)));
    ret.insert("log".into(), Ident::Fun(Fun::new(2, log)));
    ret.insert("floor".into(), Ident::Fun(Fun::new(1, floor)));
    ret.insert("ceil".into(), Ident::Fun(Fun::new(1, ceil)));
    ret.insert("round".into(), Ident::Fun(Fun::new(1, round)));
    ret.insert("min".into(), Ident::Fun(Fun::new(2, min)));
    ret.insert("max".into(), Ident::Fun(Fun::new(2, max)));

    // trig
    ret.insert("sin".into(), Ident::Fun(Fun::new(1, sin)));
    ret.insert("cos".into(), Ident::Fun(Fun::new(1, cos)));
    ret.insert("tan".into(), Ident::Fun(Fun::new(1, tan)));
    ret.insert("asin".into(), Ident::Fun(Fun::new(1, arcsin)));
    ret.insert("acos".into(), Ident::Fun(Fun::new(1, arccos)));
    ret.insert("atan".into(), Ident::Fun(Fun::new(1, arctan)));
    ret.insert("arcsin".into(), Ident::Fun(Fun::new(1, arcsin)));
    ret.insert("arccos".into(), Ident::Fun(Fun::new(1, arccos)));
    ret.insert("arctan".into(), Ident::Fun(Fun::new(1, arctan)));
    ret.insert("sinh".into(), Ident::Fun(Fun::new(1, sinh)));
    ret.insert("cosh".into(), Ident::Fun(Fun::new(1, cosh)));
    ret.insert("tanh".into(), Ident::Fun(Fun::new(1, tanh)));

    ret
}

#[track_caller]
fn expect_n<const N: usize>(args: &[Number]) -> [Number; N] {
    args.try_into().expect("arity is checked before the call")
}

pub fn abs(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.abs()
}

pub fn sqrt(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sqrt()
}

pub fn cbrt(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cbrt()
}

pub fn exp(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.exp()
}

pub fn ln(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.ln()
}

pub fn log(args: &[Number]) -> Number {
    let [x, base] = expect_n::<2>(args);
    x.log(base)
}

pub fn floor(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.floor()
}

pub fn ceil(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.ceil()
}

pub fn round(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.round()
}

pub fn min(args: &[Number]) -> Number {
    let [a, b] = expect_n::<2>(args);
    a.min(b)
}

pub fn max(args: &[Number]) -> Number {
    let [a, b] = expect_n::<2>(args);
    a.max(b)
}

pub fn sin(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sin()
}

pub fn cos(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cos()
}

pub fn tan(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.tan()
}

pub fn arcsin(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.asin()
}

pub fn arccos(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.acos()
}

pub fn arctan(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.atan()
}

pub fn sinh(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sinh()
}

pub fn cosh(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cosh()
}

pub fn tanh(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.tanh()
}
