use clap::{Parser, Subcommand};
use peacock::geometry::{ArcSpan, compute_child_frame, compute_radius};
use peacock::style::{DEFAULT_CHILD_PADDING, DEFAULT_END_ANGLE, DEFAULT_START_ANGLE};
use peacock::{Point, Size};
use peacock_sim::config::{self, DEFAULT_ITEM_SIZE};
use peacock_sim::runtime;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "peacock-sim", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read the configuration from this file instead of the user config dir
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print where `count` items land around a button.
    Layout {
        count: usize,
        #[arg(long, default_value_t = DEFAULT_START_ANGLE, allow_hyphen_values = true)]
        start: f64,
        #[arg(long, default_value_t = DEFAULT_END_ANGLE, allow_hyphen_values = true)]
        end: f64,
        /// Fixed radius; sized from the items when omitted
        #[arg(short, long)]
        radius: Option<i32>,
        #[arg(long, default_value_t = DEFAULT_ITEM_SIZE)]
        size: i32,
        #[arg(long, default_value_t = 80)]
        button: i32,
    },
    /// Build the configured menu and drive it with commands from a script or stdin.
    Simulate { script: Option<PathBuf> },
    /// Write the default configuration file.
    Init,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Layout {
            count,
            start,
            end,
            radius,
            size,
            button,
        } => print_layout(count, ArcSpan::new(start, end), radius, size, button),
        Commands::Simulate { script } => {
            let config = config::load_config(cli.config)?;
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(runtime::run(config, script))
        }
        Commands::Init => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn print_layout(
    count: usize,
    arc: ArcSpan,
    radius: Option<i32>,
    size: i32,
    button: i32,
) -> anyhow::Result<()> {
    if size <= 0 || button <= 0 {
        anyhow::bail!("Item and button sizes must be positive.");
    }

    let arc = arc.normalized();
    let radius = radius.unwrap_or_else(|| {
        compute_radius(
            arc.sweep().abs(),
            count,
            size,
            DEFAULT_CHILD_PADDING,
            button / 2 + size,
        )
    });
    let center = Point::new(button / 2, button / 2);
    println!("radius {radius}, center {},{}", center.x, center.y);

    for (i, angle) in arc.angles(count).into_iter().enumerate() {
        let frame = compute_child_frame(center, radius, angle, Size::square(size));
        println!(
            "item {i}: {angle:>7.2}° at {},{} {}x{}",
            frame.origin.x, frame.origin.y, frame.size.width, frame.size.height
        );
    }
    Ok(())
}
