use std::{fs, path::PathBuf, process::exit};

use anyhow::Context;
use clap::Parser;
use turtlelogo::{Canvas, Config, Limits, Program};

/// Run a LOGO program and save the drawing as SVG.
#[derive(Parser)]
struct Args {
    input: PathBuf,

    #[clap(short, long, default_value = "out.svg")]
    output: PathBuf,

    #[clap(long)]
    width: Option<f64>,

    #[clap(long)]
    height: Option<f64>,

    #[clap(long)]
    stroke_width: Option<f64>,

    /// Starting heading, in degrees clockwise from up.
    #[clap(long)]
    heading: Option<f64>,

    /// Give up after this many statements (0 means never).
    #[clap(long)]
    max_steps: Option<u64>,
}

impl Args {
    fn config(&self) -> Config {
        let default = Config::default();
        let max_steps = match self.max_steps {
            Some(0) => None,
            Some(n) => Some(n),
            None => default.limits.max_steps,
        };
        Config {
            width: self.width.unwrap_or(default.width),
            height: self.height.unwrap_or(default.height),
            stroke_width: self.stroke_width.unwrap_or(default.stroke_width),
            heading: self.heading.unwrap_or(default.heading),
            limits: Limits {
                max_steps,
                ..default.limits
            },
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let input = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to open input file {}", args.input.display()))?;
    let prog = Program::parse(&input)?;

    let config = args.config();
    let mut canvas = config.canvas();
    let state = prog.run(&mut canvas, config.start_state(), config.limits)?;
    log::info!(
        "drew {} lines, ending at ({}, {}) heading {}",
        canvas.len(),
        state.position.x,
        state.position.y,
        state.heading
    );

    let image = canvas.persist()?;
    fs::write(&args.output, image)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}

pub fn main() {
    pretty_env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{e:#}");
        exit(1);
    }
}
