//! Things the turtle can draw on.

use std::{fmt, io};

use kurbo::{BezPath, PathEl, Point};
use svg::{
    node::element::{path::Data, Path},
    Document,
};

/// A drawing surface.
///
/// Drawing never fails; anything that can go wrong (running out of disk, say) happens when the
/// image is persisted.
pub trait Canvas {
    fn draw_line(&mut self, from: Point, to: Point);

    /// The finished image, encoded.
    fn persist(&self) -> io::Result<Vec<u8>>;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn length(&self) -> f64 {
        self.from.distance(self.to)
    }
}

// Rounds to three decimals, and gets rid of negative zero so that tiny float errors in the
// trigonometry don't show up.
fn tidy(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0 + 0.0
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} {:.3} {:.3} {:.3}",
            tidy(self.from.x),
            tidy(self.from.y),
            tidy(self.to.x),
            tidy(self.to.y)
        )
    }
}

/// Remembers every line it was asked to draw.
///
/// Persisting it gives one line of text per segment, `x0 y0 x1 y1`.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    pub segments: Vec<Segment>,
}

impl Canvas for Recorder {
    fn draw_line(&mut self, from: Point, to: Point) {
        self.segments.push(Segment { from, to });
    }

    fn persist(&self) -> io::Result<Vec<u8>> {
        let mut out = String::new();
        for seg in &self.segments {
            out += &format!("{seg}\n");
        }
        Ok(out.into_bytes())
    }
}

/// Draws into a single SVG path, black on transparent.
#[derive(Clone, Debug)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    stroke_width: f64,
    path: BezPath,
    // Where the last line ended, so that connected lines don't need a new `M`.
    pen: Option<Point>,
    segments: usize,
}

impl SvgCanvas {
    pub fn new(width: f64, height: f64, stroke_width: f64) -> SvgCanvas {
        SvgCanvas {
            width,
            height,
            stroke_width,
            path: BezPath::new(),
            pen: None,
            segments: 0,
        }
    }

    /// The number of lines drawn so far.
    pub fn len(&self) -> usize {
        self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments == 0
    }

    pub fn document(&self) -> Document {
        let (w, h) = (self.width, self.height);
        let doc = Document::new()
            .set("width", w)
            .set("height", h)
            .set("viewBox", (0.0, 0.0, w, h));
        if self.is_empty() {
            return doc;
        }

        let data = self
            .path
            .elements()
            .iter()
            .fold(Data::new(), |data, el| match *el {
                PathEl::MoveTo(p) => data.move_to((p.x, p.y)),
                PathEl::LineTo(p) => data.line_to((p.x, p.y)),
                _ => data,
            });
        let path = Path::new()
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", self.stroke_width)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round")
            .set("d", data);
        doc.add(path)
    }
}

impl Canvas for SvgCanvas {
    fn draw_line(&mut self, from: Point, to: Point) {
        if self.pen != Some(from) {
            self.path.move_to(from);
        }
        self.path.line_to(to);
        self.pen = Some(to);
        self.segments += 1;
    }

    fn persist(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        svg::write(&mut out, &self.document())?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder() {
        let mut rec = Recorder::default();
        rec.draw_line(Point::new(0.0, 0.0), Point::new(3.0, -4.0));
        rec.draw_line(Point::new(3.0, -4.0), Point::new(-0.0000001, 1.0 / 3.0));
        assert_eq!(rec.segments[0].length(), 5.0);

        let text = String::from_utf8(rec.persist().unwrap()).unwrap();
        assert_eq!(
            text,
            "0.000 0.000 3.000 -4.000\n3.000 -4.000 0.000 0.333\n"
        );
    }

    #[test]
    fn empty_svg() {
        let svg = SvgCanvas::new(100.0, 50.0, 2.0);
        assert!(svg.is_empty());

        let text = String::from_utf8(svg.persist().unwrap()).unwrap();
        assert!(text.contains("<svg"));
        assert!(text.contains("viewBox=\"0 0 100 50\""));
        assert!(!text.contains("<path"));
    }

    #[test]
    fn connected_lines_share_a_subpath() {
        let mut svg = SvgCanvas::new(100.0, 100.0, 2.0);
        svg.draw_line(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        svg.draw_line(Point::new(10.0, 0.0), Point::new(10.0, 10.0));
        svg.draw_line(Point::new(50.0, 50.0), Point::new(60.0, 60.0));
        assert_eq!(svg.len(), 3);

        let moves = svg
            .path
            .elements()
            .iter()
            .filter(|el| matches!(el, kurbo::PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);

        let text = String::from_utf8(svg.persist().unwrap()).unwrap();
        assert!(text.contains("<path"));
        assert!(text.contains("d=\"M0,0"));
        assert!(text.contains("stroke-width=\"2\""));
    }
}
