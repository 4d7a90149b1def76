//! Duplicate-cluster formation within candidate blocks.
//!
//! For every block with two or more members, each unordered pair of records
//! is scored; pairs at or above the configured threshold become edges in an
//! undirected graph, and connected components of size >= 2 are emitted as
//! duplicate clusters. Clusters never span blocks.
//!
//! Component formation means chaining is intentional: if A matches B and B
//! matches C, all three land in one cluster even when A and C score below
//! threshold. That transitive-closure semantics is a documented design
//! choice of this engine, not an accident.

use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;
use tracing::debug;

use crate::domain::{DuplicateCluster, ProviderRecord};
use crate::pipeline::processing::blocking::BlockingIndex;
use crate::pipeline::processing::similarity::Similarity;

/// An above-threshold similarity link between two records in one block.
///
/// The pair is unordered and the score symmetric; `a` < `b` by record id
/// purely for stable output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarityEdge {
    pub a: String,
    pub b: String,
    pub score: u8,
}

/// Builds duplicate clusters from a blocking index.
pub struct ClusterBuilder {
    scorer: Box<dyn Similarity + Send + Sync>,
    threshold: u8,
}

impl ClusterBuilder {
    pub fn new(scorer: Box<dyn Similarity + Send + Sync>, threshold: u8) -> Self {
        Self { scorer, threshold }
    }

    /// Score every within-block pair and extract connected components.
    ///
    /// A block of size 1 produces no clusters; so does a multi-member block
    /// where no pair meets the threshold.
    pub fn build_clusters(
        &self,
        index: &BlockingIndex,
        roster: &[ProviderRecord],
    ) -> Vec<DuplicateCluster> {
        let by_id: HashMap<&str, &ProviderRecord> = roster
            .iter()
            .map(|r| (r.record_id.as_str(), r))
            .collect();

        let mut clusters = Vec::new();
        let mut pairs_scored: usize = 0;

        for (key, members) in index.comparable_blocks() {
            let edges = self.score_block(members, &by_id, &mut pairs_scored);
            if edges.is_empty() {
                continue;
            }

            let block_clusters = connected_components(members, &edges);
            debug!(
                ?key,
                members = members.len(),
                edges = edges.len(),
                clusters = block_clusters.len(),
                "clustered block"
            );
            clusters.extend(block_clusters);
        }

        // Stable report order; cluster identity is still the member set
        clusters.sort_by(|a, b| a.members.cmp(&b.members));

        crate::observability::metrics::clustering::pairs_scored(pairs_scored);
        crate::observability::metrics::clustering::clusters_found(clusters.len());

        clusters
    }

    /// Score every unordered pair in one block, keeping edges at or above
    /// the threshold.
    fn score_block(
        &self,
        members: &[String],
        by_id: &HashMap<&str, &ProviderRecord>,
        pairs_scored: &mut usize,
    ) -> Vec<SimilarityEdge> {
        let mut edges = Vec::new();

        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let (Some(rec_a), Some(rec_b)) =
                    (by_id.get(members[i].as_str()), by_id.get(members[j].as_str()))
                else {
                    continue;
                };

                *pairs_scored += 1;
                let score = self
                    .scorer
                    .score(&rec_a.normalized_name, &rec_b.normalized_name);

                if score >= self.threshold {
                    let (a, b) = if members[i] <= members[j] {
                        (members[i].clone(), members[j].clone())
                    } else {
                        (members[j].clone(), members[i].clone())
                    };
                    edges.push(SimilarityEdge { a, b, score });
                }
            }
        }

        edges
    }
}

/// Extract connected components of size >= 2 from a block's edge set.
fn connected_components(members: &[String], edges: &[SimilarityEdge]) -> Vec<DuplicateCluster> {
    let mut graph: UnGraph<&str, u8> = UnGraph::new_undirected();
    let mut node_of: HashMap<&str, NodeIndex> = HashMap::new();

    for member in members {
        let idx = graph.add_node(member.as_str());
        node_of.insert(member.as_str(), idx);
    }
    for edge in edges {
        graph.add_edge(node_of[edge.a.as_str()], node_of[edge.b.as_str()], edge.score);
    }

    let mut visited = vec![false; graph.node_count()];
    let mut clusters = Vec::new();

    for start in graph.node_indices() {
        if visited[start.index()] {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(graph[current].to_string());

            for neighbor in graph.neighbors(current) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }

        if component.len() >= 2 {
            clusters.push(DuplicateCluster::new(component));
        }
    }

    clusters
}
