use std::time::Instant;

use anyhow::Result;
use tessella_engine::geom::Rect;
use tessella_engine::locate::quadtree::QuadtreeLocator;
use tessella_engine::locate::selector::{SelectorMode, StartingEdgeSelector};
use tessella_engine::locate::slab::SlabDecomposition;
use tessella_engine::locate::walk::{LawsonWalk, WalkOption};
use tessella_engine::locate::walking::WalkingLocator;
use tessella_engine::locate::PointLocator;
use tessella_engine::sampling::UniformPointRng;
use tessella_engine::triangulation::{ceil_nth_root, Triangulation, TriangulationKind};

fn timed<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    println!("Time taken for {name}: {:.6} s", start.elapsed().as_secs_f64());
    result
}

/// Builds a random Delaunay triangulation, then runs the same queries
/// through the walking, slab and quadtree locators, reporting build times,
/// query times and cross-locator agreement.
pub fn run(num_points: usize, num_queries: usize) -> Result<()> {
    let rect = Rect::new(-1_000_000.0, 1_000_000.0, 1_000_000.0, -1_000_000.0);

    let mut tri = Triangulation::new();
    timed("delaunay build", || {
        tri.generate_random_triangulation(num_points, TriangulationKind::Delaunay, rect)
    })?;
    println!("Delaunay flips: {}", tri.delaunay_flips);

    let sub = tri.subdivision();
    let mut walking = WalkingLocator::new(
        LawsonWalk::new(
            &[WalkOption::FastRemembering],
            ceil_nth_root(num_points.max(2), 4),
        )?,
        StartingEdgeSelector::new(SelectorMode::Sample, ceil_nth_root(num_points.max(2), 3)),
    );
    timed("walking locator init", || walking.init(sub));
    let mut slab = SlabDecomposition::new();
    timed("slab decomposition init", || slab.init(sub));
    let mut quadtree = QuadtreeLocator::default();
    timed("quadtree init", || quadtree.init(sub));
    let (entries, depth) = quadtree.dimensions();
    println!("Quadtree dimensions: {entries} bucket entries, depth {depth}");

    let queries = UniformPointRng::new(rect).random_points(num_queries);

    let by_walk = timed("walking queries", || {
        queries.iter().map(|&p| walking.locate(sub, p)).collect::<Vec<_>>()
    });
    let by_slab = timed("slab queries", || {
        queries.iter().map(|&p| slab.locate(sub, p)).collect::<Vec<_>>()
    });
    let by_quadtree = timed("quadtree queries", || {
        queries.iter().map(|&p| quadtree.locate(sub, p)).collect::<Vec<_>>()
    });

    let conn = sub.conn();
    let label = |e: &Option<_>| e.map(|e| conn.left_label(e));
    let agreeing = by_walk
        .iter()
        .zip(&by_slab)
        .zip(&by_quadtree)
        .filter(|&((w, s), q)| label(w) == label(s) && label(s) == label(q))
        .count();
    let percentage = agreeing as f64 * 100.0 / num_queries.max(1) as f64;
    println!("Locator agreement: {agreeing} / {num_queries} ({percentage}%)");

    let walk = walking.walk();
    println!(
        "Walk instrumentation: {} orientation tests, {} face steps",
        walk.num_tests, walk.num_faces
    );
    Ok(())
}
