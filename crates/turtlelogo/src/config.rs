use kurbo::Point;

use crate::{canvas::SvgCanvas, typ::State};

/// How much work a single evaluation is allowed to do.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Limits {
    /// Statements evaluated, counting every node of the program once per visit.
    pub max_steps: Option<u64>,
    /// Procedure calls in progress at once.
    pub max_depth: Option<usize>,
    /// Stack size, in bytes, of the thread that [`Program::run`](crate::Program::run) evaluates
    /// on. Each nested call uses a few kilobytes of it in debug builds.
    pub stack_size: usize,
}

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            max_steps: Some(1_000_000),
            max_depth: Some(2_000),
            stack_size: 64 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// No step or depth limit. Deep enough recursion will still overflow the stack.
    pub fn unlimited() -> Limits {
        Limits {
            max_steps: None,
            max_depth: None,
            ..Limits::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub width: f64,
    pub height: f64,
    pub stroke_width: f64,
    /// The turtle's starting heading, in degrees.
    pub heading: f64,
    pub limits: Limits,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            width: 940.0,
            height: 1060.0,
            stroke_width: 10.0,
            heading: 0.0,
            limits: Limits::default(),
        }
    }
}

impl Config {
    /// The turtle starts in the middle of the canvas, with nothing defined.
    pub fn start_state(&self) -> State {
        State::new(Point::new(self.width / 2.0, self.height / 2.0), self.heading)
    }

    pub fn canvas(&self) -> SvgCanvas {
        SvgCanvas::new(self.width, self.height, self.stroke_width)
    }
}
