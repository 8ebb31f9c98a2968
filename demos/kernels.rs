//! Runs every kernel on a Kronecker graph and checks it with its verifier
//!
//! Run with: cargo run --release --example kernels -- [scale]

use std::time::Instant;
use trueno_gap::storage::generator::kronecker;
use trueno_gap::{
    afforest, betweenness_centrality, delta_stepping, direction_optimizing_bfs, pagerank,
    triangle_count, verify_betweenness, verify_bfs_tree, verify_components, verify_pagerank,
    verify_sssp, verify_triangle_count, BcConfig, BfsConfig, CcConfig, CsrGraph, PageRankConfig,
    SourcePicker, SsspConfig,
};

fn report(kernel: &str, started: Instant, verified: bool) {
    let status = if verified { "PASS" } else { "FAIL" };
    println!("  {kernel:<6} {:>9.3} ms  {status}", started.elapsed().as_secs_f64() * 1e3);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let scale = std::env::args().nth(1).map_or(Ok(14), |s| s.parse())?;
    println!("Generating Kronecker graph (scale {scale}, degree 16)...");
    let edges = kronecker(scale, 16, 1)?;
    let directed = CsrGraph::from_edge_list(&edges)?;
    let undirected = CsrGraph::from_edge_list_undirected(&edges)?;
    println!(
        "  {} vertices, {} directed arcs, {} undirected edges\n",
        directed.num_nodes(),
        directed.num_edges(),
        undirected.num_edges()
    );

    let source = SourcePicker::new(&undirected, None, 27_491_095)
        .pick_next()
        .ok_or_else(|| anyhow::anyhow!("graph has no edges"))?;
    println!("Kernels (source {}):", source.0);

    let started = Instant::now();
    let parent = direction_optimizing_bfs(&undirected, source, &BfsConfig::default())?;
    report("bfs", started, verify_bfs_tree(&undirected, source, &parent));

    let started = Instant::now();
    let dist = delta_stepping(&directed, source, &SsspConfig { delta: 16 })?;
    report("sssp", started, verify_sssp(&directed, source, &dist));

    let started = Instant::now();
    let comp = afforest(&undirected, &CcConfig::default())?;
    report("cc", started, verify_components(&undirected, &comp));

    let bc_config = BcConfig::default();
    let started = Instant::now();
    let scores = betweenness_centrality(&undirected, &bc_config)?;
    let sources = trueno_gap::bc_sources(&undirected, &bc_config)?;
    report("bc", started, verify_betweenness(&undirected, &sources, &scores));

    let pr_config = PageRankConfig::default();
    let started = Instant::now();
    let ranks = pagerank(&directed, &pr_config)?;
    report("pr", started, verify_pagerank(&directed, &pr_config, &ranks, 1e-3));

    let started = Instant::now();
    let triangles = triangle_count(&undirected)?;
    report("tc", started, verify_triangle_count(&undirected, triangles));
    println!("\n  {triangles} triangles");

    // Persist and reload
    let path = std::env::temp_dir().join(format!("trueno_gap_kron_{scale}"));
    undirected.write_parquet(&path).await?;
    let loaded = CsrGraph::read_parquet(&path).await?;
    println!("  reloaded {} vertices from {}", loaded.num_nodes(), path.display());

    Ok(())
}
