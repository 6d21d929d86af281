//! socgraph CLI - social graph queries from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Load and summarize
//! socgraph -l locations.txt -c connections.txt stats
//!
//! # Shortest path of at most 4 hops between two users
//! socgraph -l locations.txt -c connections.txt path 17 4242 --max-depth 4
//!
//! # Users within 0.05 degrees of a point
//! socgraph -l locations.txt -c connections.txt near 40.4168 -3.7038 --distance 0.05
//!
//! # Louvain communities with a config file
//! socgraph -l locations.txt -c connections.txt --config analysis.json communities
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use socgraph::{AnalysisConfig, SocialNetwork};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "socgraph")]
#[command(about = "Social graph analysis CLI", long_about = None)]
struct Cli {
    /// Location file (`lat,long` per line)
    #[arg(short, long, global = true, default_value = "10_million_location.txt")]
    locations: PathBuf,

    /// Connection file (comma-separated user ids per line)
    #[arg(short, long, global = true, default_value = "10_million_user.txt")]
    connections: PathBuf,

    /// JSON analysis config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of users; defaults to the location file's line count
    #[arg(long, global = true)]
    max_nodes: Option<usize>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Graph size, degree statistics, and ingestion counters
    Stats,

    /// Location and connections of one user
    User {
        /// User id
        id: u64,
    },

    /// Users near a point
    Near {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        long: f64,

        /// Maximum planar distance in degrees
        #[arg(short, long)]
        distance: Option<f64>,

        /// Maximum results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Connections shared by two users
    Common { a: u64, b: u64 },

    /// Best-connected users
    Top {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Shortest path between two users
    Path {
        from: u64,
        to: u64,

        /// Hop limit (1-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        max_depth: Option<u8>,
    },

    /// Average shortest path length over sampled sources
    AvgPath {
        /// Sources to sample
        #[arg(long)]
        sample: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Louvain community detection
    Communities {
        /// Communities to list
        #[arg(long, default_value = "15")]
        top: usize,

        /// Only list communities with more members than this
        #[arg(long, default_value = "10")]
        min_size: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_path(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if cli.max_nodes.is_some() {
        config.load.max_nodes = cli.max_nodes;
    }

    let net = load(&cli.locations, &cli.connections, &config)?;
    let out = Output { json: cli.json };

    match cli.command {
        Commands::Stats => cmd_stats(&net, &config, out),
        Commands::User { id } => cmd_user(&net, id, out),
        Commands::Near {
            lat,
            long,
            distance,
            limit,
        } => {
            let distance = distance.unwrap_or(config.geo.max_distance);
            let limit = limit.unwrap_or(config.geo.limit);
            cmd_near(&net, lat, long, distance, limit, out)
        }
        Commands::Common { a, b } => cmd_common(&net, a, b, out),
        Commands::Top { limit } => cmd_top(&net, limit.unwrap_or(config.top.limit), out),
        Commands::Path {
            from,
            to,
            max_depth,
        } => {
            let max_depth = max_depth.map_or(config.path.max_depth, usize::from);
            cmd_path(&net, from, to, max_depth, out)
        }
        Commands::AvgPath { sample, seed } => {
            let sample = sample.unwrap_or(config.path.sample);
            let seed = seed.unwrap_or(config.path.seed);
            cmd_avg_path(&net, sample, seed, out)
        }
        Commands::Communities { top, min_size } => {
            cmd_communities(&net, &config, top, min_size, out)
        }
    }
}

#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    /// Print `value` as JSON, or run `text` for the plain rendering.
    fn emit<T: Serialize>(self, value: &T, text: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }
}

fn load(locations: &Path, connections: &Path, config: &AnalysisConfig) -> Result<SocialNetwork> {
    SocialNetwork::from_paths(locations, connections, &config.load).with_context(|| {
        format!(
            "Failed to load {} and {}",
            locations.display(),
            connections.display()
        )
    })
}

fn cmd_stats(net: &SocialNetwork, config: &AnalysisConfig, out: Output) -> Result<()> {
    let summary = net.summary(config.stats.degree_policy);
    out.emit(&summary, || {
        let d = &summary.degrees;
        println!("Social Graph Statistics");
        println!("=======================");
        println!("Users:           {}", summary.nodes);
        println!("Connections:     {}", summary.edges);
        println!("Located users:   {}", summary.located);
        if let Some((id, degree)) = summary.most_connected {
            println!("Most connected:  user {id} ({degree} connections)");
        }
        println!();
        println!("Degree ({:?}, {} users)", config.stats.degree_policy, d.count);
        println!("  mean:   {:.2}", d.mean);
        println!("  median: {:.2}", d.median);
        println!("  p90:    {:.2}", d.p90);
        println!("  min:    {}", d.min);
        println!("  max:    {}", d.max);
        println!(
            "  IQR outliers: {} (fences {:.2} .. {:.2})",
            d.outliers, d.fences.0, d.fences.1
        );
        println!();
        let i = &summary.ingest;
        println!("Ingestion");
        println!("  locations:           {}", i.locations);
        println!("  invalid locations:   {}", i.invalid_locations);
        println!("  invalid connections: {}", i.invalid_connections);
        println!("  out-of-range ids:    {}", i.out_of_range);
        println!("  self-loops:          {}", i.self_loops);
    })
}

fn cmd_user(net: &SocialNetwork, id: u64, out: Output) -> Result<()> {
    let user = net.query_user(id)?;
    out.emit(&user, || {
        println!("User {}", user.id);
        match user.location {
            Some(loc) => println!("  location: {:.6}, {:.6}", loc.lat, loc.long),
            None => println!("  location: unknown"),
        }
        println!("  connections ({}):", user.connections.len());
        for c in &user.connections {
            println!("    {c}");
        }
    })
}

fn cmd_near(
    net: &SocialNetwork,
    lat: f64,
    long: f64,
    distance: f64,
    limit: usize,
    out: Output,
) -> Result<()> {
    let near = net.find_users_near(lat, long, distance, limit)?;
    out.emit(&near, || {
        println!("Users within {distance} of ({lat}, {long}): {}", near.len());
        for (id, d) in &near {
            println!("  {id:>10}  {d:.6}");
        }
    })
}

fn cmd_common(net: &SocialNetwork, a: u64, b: u64, out: Output) -> Result<()> {
    let common = net.find_common_connections(a, b)?;
    out.emit(&common, || {
        println!("Common connections of {a} and {b}: {}", common.len());
        for id in &common {
            println!("  {id}");
        }
    })
}

fn cmd_top(net: &SocialNetwork, limit: usize, out: Output) -> Result<()> {
    let top = net.find_users_with_most_connections(limit);
    out.emit(&top, || {
        println!("Top {} users by connections", top.len());
        for (rank, (id, degree)) in top.iter().enumerate() {
            println!("  {:>3}. user {id:<10} {degree}", rank + 1);
        }
    })
}

fn cmd_path(net: &SocialNetwork, from: u64, to: u64, max_depth: usize, out: Output) -> Result<()> {
    let start = Instant::now();
    let path = net.find_path_between_users(from, to, max_depth)?;
    let elapsed = start.elapsed();
    out.emit(&path, || {
        if path.is_empty() {
            println!("No path from {from} to {to} within {max_depth} hops");
        } else {
            let hops = path.len() - 1;
            let ids: Vec<String> = path.iter().map(u64::to_string).collect();
            println!("{} ({hops} hops)", ids.join(" -> "));
        }
        println!("Search time: {:.3}s", elapsed.as_secs_f64());
    })
}

fn cmd_avg_path(net: &SocialNetwork, sample: usize, seed: u64, out: Output) -> Result<()> {
    let avg = net.average_shortest_path(sample, seed);
    out.emit(&avg, || {
        println!("Average shortest path ({sample} sampled sources): {avg:.4}");
    })
}

fn cmd_communities(
    net: &SocialNetwork,
    config: &AnalysisConfig,
    top: usize,
    min_size: usize,
    out: Output,
) -> Result<()> {
    let communities = net
        .detect_communities(&config.louvain.to_louvain())
        .context("Community detection failed")?;
    let largest = communities.largest(top, min_size);

    #[derive(Serialize)]
    struct Report<'a> {
        count: usize,
        modularity: f64,
        levels: &'a [socgraph::LevelSummary],
        largest: &'a [(usize, usize)],
    }
    let report = Report {
        count: communities.count(),
        modularity: communities.modularity(),
        levels: communities.partition().levels(),
        largest: &largest,
    };

    out.emit(&report, || {
        println!("Communities: {}", report.count);
        println!("Modularity:  {:.4}", report.modularity);
        for (i, level) in report.levels.iter().enumerate() {
            println!(
                "  level {i}: {} nodes -> {} communities, {} moves, Q = {:.4}",
                level.nodes, level.communities, level.moves, level.modularity
            );
        }
        println!("Largest communities (more than {min_size} members):");
        for (c, size) in report.largest {
            println!("  community {c:>6}: {size} users");
        }
    })
}
