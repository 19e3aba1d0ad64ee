// SPDX: CC0-1.0

pub mod canvas;
pub mod eval;
pub mod lex;
pub mod parse;
pub mod shell;
pub mod stdlib;

use crate::canvas::{Stroke, Surface};
use core::{fmt, num::NonZeroU16};

pub type Number = f64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

/// stroke for the coordinate axes
pub const AXIS_STROKE: Stroke = Stroke {
    color: "#000000",
    width: 2.0,
};

/// stroke for the unit grid
pub const GRID_STROKE: Stroke = Stroke {
    color: "#e0e0e0",
    width: 1.0,
};

/// stroke for the traced curve
pub const CURVE_STROKE: Stroke = Stroke {
    color: "#ff0000",
    width: 2.0,
};

/// Fixed mapping between graph space (y grows upward, origin at the surface
/// midpoint) and surface space (y grows downward, origin at the top left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: NonZeroU16,
    height: NonZeroU16,
    scale: Number,
}

impl Viewport {
    /// Returns `None` unless `scale` (pixels per graph unit) is finite and
    /// positive.
    pub fn new(width: NonZeroU16, height: NonZeroU16, scale: Number) -> Option<Self> {
        (scale.is_finite() && scale > 0.0).then_some(Self {
            width,
            height,
            scale,
        })
    }

    pub const fn width(&self) -> u16 {
        self.width.get()
    }

    pub const fn height(&self) -> u16 {
        self.height.get()
    }

    pub const fn scale(&self) -> Number {
        self.scale
    }

    /// pixel location of graph coordinate (0, 0)
    pub fn origin(&self) -> Point<Number> {
        Point {
            x: Number::from(self.width()) / 2.0,
            y: Number::from(self.height()) / 2.0,
        }
    }

    /// graph x sampled at pixel column `px`
    pub fn x_at(&self, px: Number) -> Number {
        (px - self.origin().x) / self.scale
    }

    /// graph point to surface point
    pub fn to_pixel(&self, p: Point<Number>) -> Point<Number> {
        let origin = self.origin();
        Point {
            x: origin.x + p.x * self.scale,
            y: origin.y - p.y * self.scale,
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scale", &self.scale)
            .finish()
    }
}

/// Positions of grid lines along one dimension: every `origin + k*scale` for
/// integer `k` (both signs) that lands inside `[0, extent]`, each exactly
/// once, boundaries included.
pub fn grid_lines(origin: Number, extent: Number, scale: Number) -> impl Iterator<Item = Number> {
    let k_min = (-origin / scale).ceil() as i32;
    let k_max = ((extent - origin) / scale).floor() as i32;
    (k_min..=k_max).map(move |k| origin + Number::from(k) * scale)
}

/// Paints the coordinate axes through the origin, then the unit grid over the
/// whole surface. Assumes the surface was cleared by the caller.
pub fn draw_axes<S: Surface>(surface: &mut S, view: &Viewport) {
    let width = Number::from(view.width());
    let height = Number::from(view.height());
    let origin = view.origin();

    surface.begin_path();
    surface.move_to(Point { x: 0.0, y: origin.y });
    surface.line_to(Point {
        x: width,
        y: origin.y,
    });
    surface.move_to(Point { x: origin.x, y: 0.0 });
    surface.line_to(Point {
        x: origin.x,
        y: height,
    });
    surface.stroke(AXIS_STROKE);

    surface.begin_path();
    for px in grid_lines(origin.x, width, view.scale()) {
        surface.move_to(Point { x: px, y: 0.0 });
        surface.line_to(Point { x: px, y: height });
    }
    for py in grid_lines(origin.y, height, view.scale()) {
        surface.move_to(Point { x: 0.0, y: py });
        surface.line_to(Point { x: width, y: py });
    }
    surface.stroke(GRID_STROKE);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceSummary {
    /// columns that contributed a point to the curve
    pub drawn: usize,
    /// columns skipped because the sample failed or was not a finite real
    pub skipped: usize,
    /// maximal runs of connected points
    pub segments: usize,
}

/// Traces the curve of `f` across every pixel column in `0..=width` and
/// strokes it in `stroke`.
///
/// A column where `f` fails or yields a non-finite value is skipped, and the
/// next valid column starts a fresh sub-path instead of connecting to the
/// previous one, so poles and undefined regions never turn into spurious
/// vertical lines. The loop always visits all `width + 1` columns.
pub fn trace<S, F, E>(surface: &mut S, view: &Viewport, stroke: Stroke, mut f: F) -> TraceSummary
where
    S: Surface,
    F: FnMut(Number) -> Result<Number, E>,
{
    let mut summary = TraceSummary::default();
    let mut broken = true;

    surface.begin_path();
    for px in 0..=view.width() {
        let x = view.x_at(Number::from(px));
        let y = match f(x) {
            Ok(y) if y.is_finite() => y,
            Ok(_) | Err(_) => {
                broken = true;
                summary.skipped += 1;
                continue;
            }
        };

        let p = view.to_pixel(Point { x, y });
        if broken {
            surface.move_to(p);
            broken = false;
            summary.segments += 1;
        } else {
            surface.line_to(p);
        }
        summary.drawn += 1;
    }
    surface.stroke(stroke);

    summary
}
