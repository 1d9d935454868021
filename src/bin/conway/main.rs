//! Conway CLI - build polyhedra and tilings from the command line.
//!
//! Usage: conway <COMMAND> [OPTIONS]
//!
//! Run `conway --help` for available commands.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use conway::algo::canonicalize::{canonicalize_with_progress, CanonicalizeOptions};
use conway::algo::chain::{apply_chain, OpKind, OpStep};
use conway::algo::{Progress, Selector};
use conway::mesh::{parse_tags, ConwayPoly};
use conway::shapes;
use conway::tiling::{unitile, UnitileOptions};

#[derive(Parser)]
#[command(name = "conway")]
#[command(author, version, about = "Conway polyhedra CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display polyhedron information
    Info {
        #[command(flatten)]
        source: Source,
    },

    /// Apply a chain of operators and summarise the result
    Apply {
        #[command(flatten)]
        source: Source,

        /// Operator step as kind[:amount[:amount2]]; repeat for a chain
        #[arg(short, long = "op", value_name = "STEP")]
        ops: Vec<OpStep>,

        /// Selector applied to every step
        #[arg(short, long)]
        selector: Option<Selector>,

        /// Comma-separated face tags applied to every step
        #[arg(long)]
        tags: Option<String>,

        /// Randomize every step from this seed
        #[arg(long)]
        seed: Option<u64>,

        /// Canonicalize the result
        #[arg(short, long)]
        canonicalize: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Generate a tiling
    Tile {
        /// Pattern id, 1 to 11
        #[arg(short, long)]
        pattern: u8,

        #[command(flatten)]
        grid: GridArgs,
    },

    /// List operator names
    Ops,
}

/// Where the starting polyhedron comes from.
#[derive(Args)]
struct Source {
    /// Platonic solid: tetrahedron, cube, octahedron, dodecahedron, icosahedron
    #[arg(default_value = "cube", conflicts_with = "tile")]
    solid: String,

    /// Start from this tiling pattern instead, 1 to 11
    #[arg(long)]
    tile: Option<u8>,

    #[command(flatten)]
    grid: GridArgs,
}

#[derive(Args)]
struct GridArgs {
    /// Surface id, 0 (plane) to 12
    #[arg(long, default_value = "0")]
    shape: u8,

    /// Domain rows
    #[arg(long, default_value = "5")]
    rows: usize,

    /// Domain columns
    #[arg(long, default_value = "5")]
    cols: usize,

    /// Weld seams on wrapped shapes
    #[arg(long)]
    weld: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { source } => {
            let poly = load(&source)?;
            print_summary(&poly);
        }

        Commands::Apply {
            source,
            ops,
            selector,
            tags,
            seed,
            canonicalize,
            sequential,
        } => {
            let poly = load(&source)?;
            cmd_apply(&poly, ops, selector, tags, seed, canonicalize, sequential)?;
        }

        Commands::Tile { pattern, grid } => {
            let poly = tile(pattern, &grid)?;
            print_summary(&poly);
        }

        Commands::Ops => {
            for kind in OpKind::all() {
                let marker = if kind.is_randomizable() { " (randomizable)" } else { "" };
                println!("{}{}", kind, marker);
            }
        }
    }

    Ok(())
}

fn load(source: &Source) -> Result<ConwayPoly, Box<dyn std::error::Error>> {
    match source.tile {
        Some(pattern) => Ok(tile(pattern, &source.grid)?),
        None => shapes::by_name(&source.solid).ok_or_else(|| format!("unknown solid '{}'", source.solid).into()),
    }
}

fn tile(pattern: u8, grid: &GridArgs) -> conway::error::Result<ConwayPoly> {
    let options = UnitileOptions::from_ids(pattern, grid.shape)?
        .with_size(grid.rows, grid.cols)
        .with_weld(grid.weld);
    unitile(&options)
}

fn cmd_apply(
    poly: &ConwayPoly,
    mut ops: Vec<OpStep>,
    selector: Option<Selector>,
    tags: Option<String>,
    seed: Option<u64>,
    canonicalize: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Input: {} vertices, {} faces", poly.num_vertices(), poly.num_faces());

    for step in &mut ops {
        if let Some(selector) = selector {
            step.selector = selector;
        }
        if let Some(tags) = &tags {
            step.tags = parse_tags(tags);
        }
        step.randomize = seed.is_some();
    }

    let mut rng = seed.map(ChaCha8Rng::seed_from_u64);
    let progress = create_progress();

    let start = Instant::now();
    let mut result = apply_chain(
        poly,
        &ops,
        rng.as_mut().map(|r| r as &mut dyn rand::RngCore),
        &progress,
    )?;
    info!("chain of {} steps in {:.2?}", ops.len(), start.elapsed());

    if canonicalize {
        let options = if sequential {
            CanonicalizeOptions::default().sequential()
        } else {
            CanonicalizeOptions::default().with_parallel(true)
        };
        let start = Instant::now();
        let (canonical, report) = canonicalize_with_progress(&result, &options, &create_progress())?;
        println!(
            "Canonicalize: adjust {:?}, planarize {:?} in {:.2?}",
            report.adjust,
            report.planarize,
            start.elapsed()
        );
        result = canonical;
    }

    print_summary(&result);
    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Monotonic: only redraw when the percentage rises.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {:<16}", bar, space, raw_percent, message);
        let _ = std::io::stderr().flush();

        if current + 1 >= total {
            eprintln!();
        }
    })
}

fn print_summary(poly: &ConwayPoly) {
    let naked = poly.halfedge_ids().filter(|&h| poly.is_naked(h)).count();

    println!("Vertices: {}", poly.num_vertices());
    println!("Edges: {}", poly.num_edges());
    println!("Faces: {}", poly.num_faces());
    println!("Euler characteristic: {}", poly.euler_characteristic());

    let sides: Vec<String> = poly
        .side_histogram()
        .iter()
        .map(|(sides, count)| format!("{}x{}", count, sides))
        .collect();
    println!("Faces by sides: {}", sides.join(", "));

    let mut roles = BTreeMap::new();
    for (_, face) in poly.faces() {
        *roles.entry(format!("{:?}", face.role)).or_insert(0usize) += 1;
    }
    let roles: Vec<String> = roles.iter().map(|(r, n)| format!("{} {}", n, r)).collect();
    println!("Face roles: {}", roles.join(", "));

    if let Some((min, max)) = poly.bounding_box() {
        let size = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
    }

    if naked == 0 {
        println!("Topology: Closed");
    } else {
        println!("Topology: Open ({} naked half-edges, {} holes)", naked, poly.find_boundaries().len());
    }
}
