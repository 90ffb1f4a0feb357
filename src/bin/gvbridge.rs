use std::{
    fs::File,
    io::{BufRead as _, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gvbridge::host::CameraIntrinsics;
use gvbridge::translate::camera::frustum_projection;

#[derive(Parser, Debug)]
#[command(name = "gvbridge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a viewer and forward stdin lines to it, printing each reply.
    Run(RunArgs),
    /// Benchmark a viewer's frame timing and print the samples as JSON.
    Sample(SampleArgs),
    /// Print the engine projection matrix for a camera description.
    Frustum(FrustumArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Viewer options JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Viewer options JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Total loop duration in seconds.
    #[arg(long, default_value_t = 5.0)]
    duration: f64,

    /// Seconds to wait before recording samples.
    #[arg(long, default_value_t = 1.0)]
    record_from: f64,
}

#[derive(Parser, Debug)]
struct FrustumArgs {
    /// Camera intrinsics JSON. Missing fields take their defaults.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Horizontal pixel aspect.
    #[arg(long, default_value_t = 1.0)]
    aspect_x: f32,

    /// Vertical pixel aspect.
    #[arg(long, default_value_t = 1.0)]
    aspect_y: f32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Sample(args) => cmd_sample(args),
        Command::Frustum(args) => cmd_frustum(args),
    }
}

fn read_options(path: &Path) -> anyhow::Result<gvbridge::ViewerOptions> {
    let opts = gvbridge::ViewerOptions::from_path(path)
        .with_context(|| format!("load viewer options '{}'", path.display()))?;
    opts.validate()?;
    Ok(opts)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let opts = read_options(&args.in_path)?;
    let mut channel = gvbridge::ControlChannel::from_options(&opts)?;
    if !channel.start()? {
        anyhow::bail!("viewer already running");
    }
    eprintln!("started {}", channel.command_line());

    for line in std::io::stdin().lock().lines() {
        let line = line.context("read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match channel.write(line) {
            gvbridge::Reply::Text(t) => println!("{t}"),
            gvbridge::Reply::Empty => {}
            gvbridge::Reply::Closed => {
                eprintln!("viewer closed");
                break;
            }
        }
    }

    channel.stop();
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    if !(args.duration.is_finite() && args.record_from.is_finite())
        || args.duration < 0.0
        || args.record_from < 0.0
    {
        anyhow::bail!("durations must be finite and non-negative");
    }

    let opts = read_options(&args.in_path)?;
    let mut channel = gvbridge::ControlChannel::from_options(&opts)?;
    let samples = channel.sample_loop(
        Duration::from_secs_f64(args.duration),
        Duration::from_secs_f64(args.record_from),
    )?;
    channel.stop();

    println!("{}", serde_json::to_string_pretty(&samples)?);
    Ok(())
}

fn cmd_frustum(args: FrustumArgs) -> anyhow::Result<()> {
    let intr: CameraIntrinsics = match &args.in_path {
        Some(path) => {
            let f = File::open(path)
                .with_context(|| format!("open camera '{}'", path.display()))?;
            serde_json::from_reader(BufReader::new(f)).with_context(|| "parse camera JSON")?
        }
        None => CameraIntrinsics::default(),
    };

    let m = frustum_projection(&intr, args.width, args.height, args.aspect_x, args.aspect_y);
    for col in m.chunks(4) {
        let cells: Vec<String> = col.iter().map(|v| format!("{v:.6}")).collect();
        println!("{}", cells.join(" "));
    }
    Ok(())
}
