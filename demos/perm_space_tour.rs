//! Tour of permutation spaces: constraints, relabeling, slicing and neighbors.
//!
//! Run with `RUST_LOG=combi=debug` to see the resolver and codec logs.

use combi::{cayley_graph, ChainSpace, CombiError, DegreeMetric, PermSpace, Sequence};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}

fn main() -> Result<(), CombiError> {
    init_logging();

    let pure = PermSpace::of_len(4);
    println!("{pure} has {} members", pure.len());
    println!("  first: {}", pure.get(0)?);
    println!("  last:  {}", pure.get(-1)?);
    println!();

    let words = PermSpace::builder("meow")
        .domain("abcd")
        .fixed_map([('a', 'w')])
        .build()?;
    println!("{words} has {} members", words.len());
    for perm in &words {
        println!("  #{} {}", perm.rank(), perm);
    }
    println!();

    let combinations = PermSpace::builder(Sequence::range(6))
        .n_elements(3)
        .combination()
        .build()?;
    println!("{combinations} has {} members", combinations.len());
    let middle = combinations.slice(8..12)?;
    for comb in &middle {
        println!("  {comb}");
    }
    println!();

    let huge = PermSpace::builder(Sequence::range(150))
        .fixed_map([(1, 5), (70, 3)])
        .degrees([3, 5])
        .build()?;
    let sample = huge.get(10u64.pow(10))?;
    println!("|space| = {}", huge.len());
    println!("rank {} has degree {:?}", huge.index(&sample)?, sample.degree());
    println!();

    let derangements = PermSpace::builder(Sequence::range(5))
        .degrees([5])
        .degree_metric(DegreeMetric::Displacements)
        .build()?;
    println!("derangements of 5: {}", derangements.len());

    let ends = ChainSpace::new([pure.slice(..2)?, pure.slice(-2..)?]);
    println!("{ends} has {} members", ends.len());

    let perm = PermSpace::new("meow").perm_from(&['w', 'o', 'm', 'e'])?;
    for neighbor in perm.neighbors([1])? {
        println!("  neighbor of {perm}: {neighbor}");
    }

    let graph = cayley_graph(&PermSpace::of_len(3), [1])?;
    println!(
        "Cayley graph of S3: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}
