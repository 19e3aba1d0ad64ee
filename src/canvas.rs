// SPDX: CC0-1.0

use crate::{Number, Point};
use core::fmt::Write as _;

/// stroke style applied to a whole path at once
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: &'static str,
    pub width: Number,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(Point<Number>),
    LineTo(Point<Number>),
}

/// Immediate-mode 2D drawing surface over a fixed-size pixel canvas.
///
/// Commands issued between `begin_path` and `stroke` accumulate into one
/// path; `stroke` paints it in a single operation. Coordinates are surface
/// space (origin top left, y growing downward).
pub trait Surface {
    /// erase everything painted so far
    fn clear(&mut self);
    /// discard any unstroked commands and start a fresh path
    fn begin_path(&mut self);
    fn move_to(&mut self, p: Point<Number>);
    fn line_to(&mut self, p: Point<Number>);
    /// paint the accumulated path; a path with no commands paints nothing
    fn stroke(&mut self, stroke: Stroke);
}

/// one stroked path, kept in paint order
#[derive(Clone, Debug, PartialEq)]
pub struct StrokedPath {
    pub cmds: Vec<PathCmd>,
    pub stroke: Stroke,
}

/// A [`Surface`] that records stroked paths and renders them as a standalone
/// SVG document.
#[derive(Clone, Debug)]
pub struct SvgSurface {
    width: u16,
    height: u16,
    pending: Vec<PathCmd>,
    paths: Vec<StrokedPath>,
}

impl SvgSurface {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pending: Vec::new(),
            paths: Vec::new(),
        }
    }

    /// everything stroked since the last `clear`, in paint order
    pub fn paths(&self) -> &[StrokedPath] {
        &self.paths
    }

    /// the finished SVG document
    pub fn render(&self) -> String {
        let mut out = String::new();
        let (w, h) = (self.width, self.height);
        // infallible: fmt::Write to a String cannot error
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(out, r##"  <rect width="{w}" height="{h}" fill="#ffffff"/>"##);
        for path in &self.paths {
            let mut d = String::new();
            for cmd in &path.cmds {
                if !d.is_empty() {
                    d.push(' ');
                }
                let _ = match cmd {
                    PathCmd::MoveTo(p) => write!(d, "M {} {}", p.x, p.y),
                    PathCmd::LineTo(p) => write!(d, "L {} {}", p.x, p.y),
                };
            }
            let _ = writeln!(
                out,
                r#"  <path d="{d}" fill="none" stroke="{color}" stroke-width="{width}" stroke-linejoin="round"/>"#,
                color = path.stroke.color,
                width = path.stroke.width,
            );
        }
        out.push_str("</svg>\n");
        out
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self) {
        self.pending.clear();
        self.paths.clear();
    }

    fn begin_path(&mut self) {
        self.pending.clear();
    }

    fn move_to(&mut self, p: Point<Number>) {
        self.pending.push(PathCmd::MoveTo(p));
    }

    fn line_to(&mut self, p: Point<Number>) {
        self.pending.push(PathCmd::LineTo(p));
    }

    fn stroke(&mut self, stroke: Stroke) {
        if self.pending.is_empty() {
            return;
        }
        self.paths.push(StrokedPath {
            cmds: core::mem::take(&mut self.pending),
            stroke,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Stroke = Stroke {
        color: "#123456",
        width: 2.0,
    };

    fn line(surface: &mut SvgSurface, from: Point<Number>, to: Point<Number>) {
        surface.begin_path();
        surface.move_to(from);
        surface.line_to(to);
        surface.stroke(INK);
    }

    #[test]
    fn strokes_record_in_paint_order() {
        let mut surface = SvgSurface::new(10, 10);
        line(&mut surface, Point { x: 0.0, y: 0.0 }, Point { x: 10.0, y: 0.0 });
        line(&mut surface, Point { x: 0.0, y: 5.0 }, Point { x: 10.0, y: 5.0 });

        let paths = surface.paths();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].cmds[0], PathCmd::MoveTo(Point { x: 0.0, y: 0.0 }));
        assert_eq!(paths[1].cmds[0], PathCmd::MoveTo(Point { x: 0.0, y: 5.0 }));
    }

    #[test]
    fn stroking_an_empty_path_paints_nothing() {
        let mut surface = SvgSurface::new(10, 10);
        surface.begin_path();
        surface.stroke(INK);
        assert!(surface.paths().is_empty());
    }

    #[test]
    fn begin_path_discards_unstroked_commands() {
        let mut surface = SvgSurface::new(10, 10);
        surface.begin_path();
        surface.move_to(Point { x: 1.0, y: 1.0 });
        surface.begin_path();
        surface.move_to(Point { x: 2.0, y: 2.0 });
        surface.stroke(INK);

        assert_eq!(surface.paths().len(), 1);
        assert_eq!(
            surface.paths()[0].cmds,
            vec![PathCmd::MoveTo(Point { x: 2.0, y: 2.0 })]
        );
    }

    #[test]
    fn clear_erases_recorded_paths() {
        let mut surface = SvgSurface::new(10, 10);
        line(&mut surface, Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 1.0 });
        surface.clear();
        assert!(surface.paths().is_empty());
        assert!(!surface.render().contains("<path"));
    }

    #[test]
    fn render_emits_one_path_element_per_stroke() {
        let mut surface = SvgSurface::new(10, 10);
        line(&mut surface, Point { x: 0.0, y: 0.0 }, Point { x: 10.0, y: 10.0 });

        let svg = surface.render();
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<path ").count(), 1);
        assert!(svg.contains(r#"d="M 0 0 L 10 10""#));
        assert!(svg.contains(r##"stroke="#123456""##));
        assert!(svg.contains(r#"stroke-width="2""#));
    }
}
