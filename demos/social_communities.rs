use socgraph::{
    CommunityDetection, DegreePolicy, DegreeStats, GraphBuilder, Louvain, NeighborQuery, PathFinder,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Minimal end-to-end: records -> builder -> queries -> Louvain communities.
    //
    // A ring of four 5-cliques, each joined to the next by a single edge, so
    // the communities are unambiguous.
    let cliques = 4u64;
    let size = 5u64;
    let n = (cliques * size) as usize;

    let mut builder = GraphBuilder::new(n)?;
    for c in 0..cliques {
        let first = c * size + 1;
        for a in first..first + size {
            let _ = builder.add_edges(a, a + 1..first + size);
        }
        // bridge to the next clique
        let next = ((c + 1) % cliques) * size + 1;
        let _ = builder.add_edge(first + size - 1, next);
    }
    let (graph, stats) = builder.finish();

    println!(
        "n_nodes={} n_edges={} rejected={}",
        graph.node_count(),
        graph.edge_count(),
        stats.invalid_records()
    );

    let path = PathFinder::new(&graph).find_path(0, 12, 6)?;
    println!("path 0 -> 12: {:?}", path);

    let top = NeighborQuery::new(&graph).top_by_degree(4);
    println!("top degrees: {:?}", top);

    let degrees = DegreeStats::compute(&graph, DegreePolicy::ActiveOnly);
    println!("mean degree={:.2} max={}", degrees.mean, degrees.max);

    let partition = Louvain::new().detect(&graph)?;
    println!(
        "communities={} modularity={:.4}",
        partition.community_count(),
        partition.modularity()
    );
    for (c, size) in partition.largest(cliques as usize, 0) {
        println!("  community {}: {} nodes {:?}", c, size, partition.members(c));
    }

    Ok(())
}
