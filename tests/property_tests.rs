//! Property-based tests for trueno-gap
//!
//! CSR invariants hold for arbitrary edge lists, and every parallel kernel
//! agrees with its serial oracle

use proptest::prelude::*;
use trueno_gap::{
    afforest, bfs_depths, brandes, component_labels, delta_stepping, dijkstra,
    direction_optimizing_bfs, triangle_count, verify_betweenness, verify_bfs_tree,
    verify_triangle_count, BfsConfig, CcConfig, CsrGraph, GraphBuilder, NodeId, SsspConfig,
    Weight,
};

// Property: from_edge_list should produce valid CSR structure
proptest! {
    #[test]
    fn prop_from_edge_list_valid_csr(edges in prop_edge_list(0usize..100usize, 0u32..50u32)) {
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let (row_offsets, col_indices, edge_weights) = graph.csr_components();

        // row_offsets is monotonically increasing and ends at the arc count
        prop_assert!(row_offsets.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(*row_offsets.last().unwrap(), col_indices.len());
        prop_assert_eq!(col_indices.len(), edge_weights.len());
        prop_assert_eq!(graph.num_edges(), edges.len());
    }
}

// Property: in-neighbors are exactly the transposed out-neighbors
proptest! {
    #[test]
    fn prop_incoming_neighbors_correct(edges in prop_edge_list(0usize..100usize, 0u32..20u32)) {
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        for node in 0..graph.num_nodes() {
            let callers = graph.in_neigh(node);

            // Including duplicates/multi-edges
            let mut expected: Vec<u32> = edges.iter()
                .filter(|(_, dst, _)| dst.index() == node)
                .map(|(src, _, _)| src.0)
                .collect();
            expected.sort_unstable();

            prop_assert_eq!(callers, expected.as_slice(), "node {}", node);
        }
    }
}

// Property: symmetrized, squished graphs are simple and sorted
proptest! {
    #[test]
    fn prop_undirected_is_simple_sorted(edges in prop_edge_list(0usize..100usize, 0u32..30u32)) {
        let graph = CsrGraph::from_edge_list_undirected(&edges).unwrap();

        prop_assert!(graph.is_simple_sorted());
        for u in 0..graph.num_nodes() {
            for &v in graph.out_neigh(u) {
                prop_assert!(graph.out_neigh(v as usize).binary_search(&(u as u32)).is_ok());
            }
        }
    }
}

// Property: BFS trees verify and give oracle depths
proptest! {
    #[test]
    fn prop_bfs_matches_oracle(
        edges in prop_edge_list(1usize..200usize, 2u32..60u32),
        alpha in 1u32..40,
        beta in 1u32..40,
    ) {
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let source = edges[0].0;
        let parent = direction_optimizing_bfs(&graph, source, &BfsConfig { alpha, beta }).unwrap();

        prop_assert!(verify_bfs_tree(&graph, source, &parent));

        let depths = bfs_depths(&graph, source).unwrap();
        for (p, d) in parent.iter().zip(&depths) {
            prop_assert_eq!(p.is_some(), d.is_some());
        }
    }
}

// Property: delta-stepping equals Dijkstra for every delta
proptest! {
    #[test]
    fn prop_sssp_matches_dijkstra(
        edges in prop_edge_list(1usize..200usize, 2u32..60u32),
        delta in 1u32..300,
    ) {
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let source = edges[0].0;

        let dist = delta_stepping(&graph, source, &SsspConfig { delta }).unwrap();
        prop_assert_eq!(dist, dijkstra(&graph, source).unwrap());
    }
}

// Property: Afforest labels equal the serial minimum-id labels
proptest! {
    #[test]
    fn prop_afforest_matches_oracle(
        edges in prop_edge_list(0usize..150usize, 1u32..80u32),
        neighbor_rounds in 0usize..4,
        seed in any::<u64>(),
    ) {
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let config = CcConfig { neighbor_rounds, seed, ..CcConfig::default() };

        let comp: Vec<u32> = afforest(&graph, &config).unwrap().into_iter().map(|c| c.0).collect();
        prop_assert_eq!(comp, component_labels(&graph));
    }
}

// Property: exact Brandes agrees with the serial recomputation
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn prop_brandes_matches_oracle(edges in prop_edge_list(1usize..80usize, 2u32..25u32)) {
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let sources: Vec<NodeId> = (0..graph.num_nodes())
            .map(|u| NodeId(u32::try_from(u).unwrap()))
            .collect();

        let scores = brandes(&graph, &sources).unwrap();
        prop_assert!(verify_betweenness(&graph, &sources, &scores));
    }
}

// Property: triangle count agrees with the set-intersection oracle
proptest! {
    #[test]
    fn prop_triangle_count_matches_oracle(edges in prop_edge_list(0usize..300usize, 1u32..40u32)) {
        let graph = GraphBuilder::new().undirected().squish(true).build(&edges).unwrap();

        let count = triangle_count(&graph).unwrap();
        prop_assert!(verify_triangle_count(&graph, count));
    }
}

// Property: Parquet roundtrip preserves graph structure
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]
    #[test]
    fn prop_parquet_roundtrip(
        edges in prop_edge_list(0usize..100usize, 0u32..20u32),
        directed in any::<bool>(),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();

        runtime.block_on(async {
            let graph = if directed {
                CsrGraph::from_edge_list(&edges).unwrap()
            } else {
                CsrGraph::from_edge_list_undirected(&edges).unwrap()
            };

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("prop_test_graph");
            graph.write_parquet(&path).await.unwrap();
            let loaded = CsrGraph::read_parquet(&path).await.unwrap();

            prop_assert_eq!(loaded.num_nodes(), graph.num_nodes());
            prop_assert_eq!(loaded.is_directed(), graph.is_directed());
            prop_assert_eq!(loaded.csr_components(), graph.csr_components());
            for u in 0..graph.num_nodes() {
                prop_assert_eq!(loaded.in_neigh(u), graph.in_neigh(u));
            }

            Ok(())
        })?;
    }
}

// Helper: Generate arbitrary edge list
fn prop_edge_list(
    num_edges: impl Strategy<Value = usize>,
    max_node: impl Strategy<Value = u32>,
) -> impl Strategy<Value = Vec<(NodeId, NodeId, Weight)>> {
    (num_edges, max_node).prop_flat_map(|(n, max_node)| {
        // Ensure max_node is at least 1 to avoid empty range
        let max_node = max_node.max(1);
        let min_len = n.min(1);
        prop::collection::vec(
            (0..max_node, 0..max_node, 0..=255u32)
                .prop_map(|(src, dst, weight)| (NodeId(src), NodeId(dst), weight)),
            min_len..=n,
        )
    })
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_empty_graph_invariants() {
        let graph = CsrGraph::new();
        let (row_offsets, col_indices, edge_weights) = graph.csr_components();

        assert_eq!(row_offsets, &[0]); // Single offset for empty graph
        assert_eq!(col_indices.len(), 0);
        assert_eq!(edge_weights.len(), 0);
        assert_eq!(graph.num_nodes(), 0);
    }

    #[test]
    fn test_single_edge_invariants() {
        let graph = CsrGraph::from_edge_list(&[(NodeId(0), NodeId(1), 9)]).unwrap();
        let (row_offsets, col_indices, edge_weights) = graph.csr_components();

        // Node 0 has 1 edge, node 1 has 0 edges
        assert_eq!(row_offsets, &[0, 1, 1]);
        assert_eq!(col_indices, &[1]);
        assert_eq!(edge_weights, &[9]);
    }
}
