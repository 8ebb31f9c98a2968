//! Integration tests for trueno-gap
//!
//! Every kernel on generated graphs, checked by its serial verifier

use trueno_gap::storage::generator::{kronecker, uniform_random};
use trueno_gap::{
    afforest, betweenness_centrality, delta_stepping, direction_optimizing_bfs, pagerank,
    triangle_count, verify_betweenness, verify_bfs_tree, verify_components, verify_pagerank,
    verify_sssp, verify_triangle_count, BcConfig, BcSources, BfsConfig, CcConfig, CsrGraph,
    NodeId, PageRankConfig, SourcePicker, SsspConfig,
};

fn kron_directed() -> CsrGraph {
    CsrGraph::from_edge_list(&kronecker(11, 8, 42).unwrap()).unwrap()
}

fn kron_undirected() -> CsrGraph {
    CsrGraph::from_edge_list_undirected(&kronecker(11, 8, 42).unwrap()).unwrap()
}

fn urand_undirected() -> CsrGraph {
    CsrGraph::from_edge_list_undirected(&uniform_random(11, 8, 7).unwrap()).unwrap()
}

fn sources(graph: &CsrGraph, count: usize) -> Vec<NodeId> {
    let mut picker = SourcePicker::new(graph, None, 27_491_095);
    (0..count).map(|_| picker.pick_next().unwrap()).collect()
}

#[test]
fn test_bfs_trees_verify() {
    for graph in [kron_directed(), kron_undirected(), urand_undirected()] {
        for source in sources(&graph, 4) {
            let parent = direction_optimizing_bfs(&graph, source, &BfsConfig::default()).unwrap();
            assert!(verify_bfs_tree(&graph, source, &parent), "source {}", source.0);
        }
    }
}

#[test]
fn test_sssp_distances_verify() {
    for graph in [kron_directed(), urand_undirected()] {
        for (source, delta) in sources(&graph, 3).into_iter().zip([1, 32, 255]) {
            let dist = delta_stepping(&graph, source, &SsspConfig { delta }).unwrap();
            assert!(verify_sssp(&graph, source, &dist), "source {} delta {delta}", source.0);
        }
    }
}

#[test]
fn test_cc_labels_verify() {
    for graph in [kron_directed(), kron_undirected(), urand_undirected()] {
        let comp = afforest(&graph, &CcConfig::default()).unwrap();
        assert!(verify_components(&graph, &comp));
    }
}

#[test]
fn test_bc_scores_verify() {
    let graph = kron_undirected();
    let picked = sources(&graph, 4);
    let config = BcConfig {
        sources: BcSources::Fixed(picked.clone()),
    };

    let scores = betweenness_centrality(&graph, &config).unwrap();
    assert!(verify_betweenness(&graph, &picked, &scores));
    assert!(scores.iter().all(|&s| (0.0..=1.0).contains(&s)));
}

#[test]
fn test_pagerank_scores_verify() {
    let config = PageRankConfig {
        epsilon: 0.0,
        max_iters: 100,
        ..PageRankConfig::default()
    };
    for graph in [kron_directed(), urand_undirected()] {
        let scores = pagerank(&graph, &config).unwrap();
        assert!(verify_pagerank(&graph, &config, &scores, 1e-4));
    }
}

#[test]
fn test_pagerank_mass_conserved_without_dangling_vertices() {
    let graph = urand_undirected();
    assert!((0..graph.num_nodes()).all(|u| graph.out_degree(u) > 0));

    let config = PageRankConfig {
        epsilon: 1e-7,
        max_iters: 200,
        ..PageRankConfig::default()
    };
    let scores = pagerank(&graph, &config).unwrap();
    let sum: f32 = scores.iter().sum();
    assert!((sum - 1.0).abs() < 1e-3, "Sum = {sum}");
}

#[test]
fn test_triangle_counts_verify() {
    for graph in [kron_undirected(), urand_undirected()] {
        let count = triangle_count(&graph).unwrap();
        assert!(verify_triangle_count(&graph, count));
    }
}

#[test]
fn test_kernels_reject_bad_sources() {
    let graph = urand_undirected();
    let outside = NodeId(u32::try_from(graph.num_nodes()).unwrap());

    assert!(direction_optimizing_bfs(&graph, outside, &BfsConfig::default()).is_err());
    assert!(delta_stepping(&graph, outside, &SsspConfig::default()).is_err());
    let config = BcConfig {
        sources: BcSources::Fixed(vec![outside]),
    };
    assert!(betweenness_centrality(&graph, &config).is_err());
}

#[tokio::test]
async fn test_parquet_persistence() {
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let path = dir.path().join("kron");

    let graph = kron_directed();
    graph.write_parquet(&path).await.unwrap();
    let loaded = CsrGraph::read_parquet(&path).await.unwrap();

    assert_eq!(loaded.num_nodes(), graph.num_nodes());
    assert_eq!(loaded.num_edges(), graph.num_edges());
    assert!(loaded.is_directed());

    // Same answers from the reloaded graph
    let source = sources(&graph, 1)[0];
    let expected = delta_stepping(&graph, source, &SsspConfig::default()).unwrap();
    let dist = delta_stepping(&loaded, source, &SsspConfig::default()).unwrap();
    assert_eq!(dist, expected);
}

#[tokio::test]
async fn test_parquet_undirected_keeps_triangle_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("urand");

    let graph = urand_undirected();
    graph.write_parquet(&path).await.unwrap();
    let loaded = CsrGraph::read_parquet(&path).await.unwrap();

    assert!(!loaded.is_directed());
    assert_eq!(triangle_count(&loaded).unwrap(), triangle_count(&graph).unwrap());
}
