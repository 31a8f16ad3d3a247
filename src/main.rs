/// The interactive quad-edge tour: single-letter commands navigating and
/// editing a subdivision read from an OFF file.
mod tour;

/// Locator benchmark: builds a random Delaunay triangulation and compares
/// the point-location engines on timing and agreement.
mod bench;

use std::fs::File;
use std::io::{BufReader, Write};

use anyhow::{Context, Result};
use tessella_engine::subdivision::Subdivision;

const USAGE: &str = "\
usage:
  tessella tour [file.off]    interactive tour (OFF from the file, or stdin)
  tessella bench [n] [q]      locator benchmark, n points and q queries
";

fn main() -> Result<()> {
    // Setup logging
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("tour") => {
            let mut sub = Subdivision::new();
            match args.get(1) {
                Some(path) => {
                    let file = File::open(path).with_context(|| format!("opening {path}"))?;
                    sub.read_off(BufReader::new(file))?;
                }
                None => {
                    let stdin = std::io::stdin();
                    sub.read_off(stdin.lock())?;
                }
            }
            let stdin = std::io::stdin();
            tour::run(&mut sub, stdin.lock(), &mut std::io::stdout())
        }
        Some("bench") => {
            let num_points = match args.get(1) {
                Some(n) => n.parse().context("point count must be an integer")?,
                None => 10_000,
            };
            let num_queries = match args.get(2) {
                Some(q) => q.parse().context("query count must be an integer")?,
                None => 1_000,
            };
            bench::run(num_points, num_queries)
        }
        _ => {
            std::io::stderr().write_all(USAGE.as_bytes())?;
            std::process::exit(2);
        }
    }
}
