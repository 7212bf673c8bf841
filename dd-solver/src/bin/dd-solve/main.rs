//! dd-solve - command-line double-dummy solver
//!
//! Solves one deal for a declarer and strain, or scores a played line
//! card by card.
//!
//! Usage:
//!   dd-solve -w AQJ/432/32/AT876 -n K32/KQJ/AKQ/Q432 \
//!            -e T98/T987/J98765/- -s 7654/A65/T4/KJ95 \
//!            --strain N --declarer N [--history HJH2]

use bridge_cards::{Deal, Direction, Strain};
use clap::Parser;
use dd_solver::Solver;

#[derive(Parser)]
#[command(name = "dd-solve")]
#[command(about = "Double-dummy solver for a single deal")]
#[command(version)]
struct Args {
    /// West's hand, suits S/H/D/C separated by '/'
    #[arg(short = 'w', long)]
    west: String,

    /// North's hand
    #[arg(short = 'n', long)]
    north: String,

    /// East's hand
    #[arg(short = 'e', long)]
    east: String,

    /// South's hand
    #[arg(short = 's', long)]
    south: String,

    /// Trump strain: C, D, H, S or N
    #[arg(short = 't', long, default_value = "N")]
    strain: String,

    /// Declarer seat: W, N, E or S
    #[arg(short = 'd', long, default_value = "S")]
    declarer: String,

    /// Played cards as concatenated 2-character codes; when given,
    /// every position along the line is scored
    #[arg(long)]
    history: Option<String>,

    /// Worker threads (0 = one per logical CPU)
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let deal = match Deal::parse(&args.west, &args.north, &args.east, &args.south) {
        Ok(deal) => deal,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let strain = match args.strain.chars().next().and_then(Strain::from_char) {
        Some(strain) => strain,
        None => {
            eprintln!("Error: bad strain '{}'", args.strain);
            std::process::exit(1);
        }
    };
    let declarer = match args.declarer.chars().next().and_then(Direction::from_char) {
        Some(dir) => dir,
        None => {
            eprintln!("Error: bad declarer '{}'", args.declarer);
            std::process::exit(1);
        }
    };

    let solver = Solver::with_threads(args.threads);

    match args.history {
        None => match solver.solve_deal(&deal, strain, declarer) {
            Ok(tricks) => {
                println!(
                    "{} declares {}: {} tricks",
                    declarer.name(),
                    strain,
                    tricks
                );
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Some(history) => match solver.analyze_play(&deal, strain, declarer, &history) {
            Ok(scores) => {
                for score in scores {
                    println!(
                        "{:3}. {}  {} tricks available to the side on play",
                        score.index + 1,
                        score.card,
                        score.tricks
                    );
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }
}
