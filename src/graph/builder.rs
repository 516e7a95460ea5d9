use crate::graph::metrics;
use crate::model::{Edge, Node, NodeMetrics};
use crate::url::{canonicalize, CanonicalUrl, UrlPolicy};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap};

/// Counts reported after a graph build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphSummary {
    pub crawled_nodes: usize,
    pub stub_nodes: usize,
    pub edges: usize,
    /// Distinct (source, target) pairs after collapsing parallel links
    pub unique_links: usize,
    /// Edges discarded because their target host is not allowed
    pub off_domain_edges_dropped: usize,
    pub root_found: bool,
}

/// The built graph: every node carries metrics and every edge endpoint has a node
#[derive(Debug, Clone)]
pub struct LinkGraph {
    /// Nodes sorted by URL
    pub nodes: Vec<Node>,
    /// Edges in input order
    pub edges: Vec<Edge>,
    pub summary: GraphSummary,
}

/// Assembles nodes and edges into a link graph and computes node metrics
///
/// # Example
///
/// ```
/// use sitegraph::graph::GraphBuilder;
/// use sitegraph::url::{canonicalize, UrlPolicy};
/// use sitegraph::{Edge, Node};
///
/// let root = canonicalize("https://example.edu", None).unwrap();
/// let about = canonicalize("https://example.edu/about", None).unwrap();
/// let builder = GraphBuilder::new(UrlPolicy::new(["example.edu"], [".html"]), Some(root.clone()));
///
/// let graph = builder.build(
///     vec![Node::stub(root.clone())],
///     vec![Edge { source: root, target: about, anchor_text: "About".into() }],
/// );
/// assert_eq!(graph.nodes.len(), 2);
/// assert_eq!(graph.nodes[1].metrics.as_ref().unwrap().depth_from_root, Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    policy: UrlPolicy,
    root: Option<CanonicalUrl>,
}

impl GraphBuilder {
    pub fn new(policy: UrlPolicy, root: Option<CanonicalUrl>) -> Self {
        Self { policy, root }
    }

    /// Creates a builder whose root is `root_url` canonicalized (`None` if invalid)
    pub fn with_root_url(policy: UrlPolicy, root_url: &str) -> Self {
        let root = match canonicalize(root_url, None) {
            Ok(root) => Some(root),
            Err(e) => {
                tracing::warn!("Invalid root URL {}: {}; depths will be null", root_url, e);
                None
            }
        };
        Self::new(policy, root)
    }

    pub fn build(&self, crawled: Vec<Node>, edges: Vec<Edge>) -> LinkGraph {
        let mut summary = GraphSummary::default();

        let mut nodes: BTreeMap<CanonicalUrl, Node> = BTreeMap::new();
        for mut node in crawled {
            node.metrics = None;
            nodes.insert(node.url.clone(), node);
        }
        summary.crawled_nodes = nodes.len();

        let edges: Vec<Edge> = edges
            .into_iter()
            .filter(|edge| {
                let allowed = edge
                    .target
                    .host()
                    .is_some_and(|host| self.policy.is_allowed_host(&host));
                if !allowed {
                    summary.off_domain_edges_dropped += 1;
                }
                allowed
            })
            .collect();

        for edge in &edges {
            for endpoint in [&edge.source, &edge.target] {
                if !nodes.contains_key(endpoint) {
                    nodes.insert(endpoint.clone(), Node::stub(endpoint.clone()));
                    summary.stub_nodes += 1;
                }
            }
        }

        // Collapse parallel links into one weighted edge; insertion in URL order
        // keeps node indices (and so float summation order) deterministic.
        let mut graph: DiGraph<CanonicalUrl, u32> = DiGraph::new();
        let mut index: HashMap<CanonicalUrl, NodeIndex> = HashMap::new();
        for url in nodes.keys() {
            index.insert(url.clone(), graph.add_node(url.clone()));
        }
        for edge in &edges {
            let (a, b) = (index[&edge.source], index[&edge.target]);
            match graph.find_edge(a, b) {
                Some(e) => graph[e] += 1,
                None => {
                    graph.add_edge(a, b, 1);
                }
            }
        }

        let in_degrees = metrics::in_degrees(&graph);
        let out_degrees = metrics::out_degrees(&graph);
        let pagerank = metrics::pagerank(&graph);
        let betweenness = metrics::betweenness(&graph);
        let root_index = self.root.as_ref().and_then(|root| index.get(root).copied());
        let depths = root_index
            .map(|root| metrics::depths_from(&graph, root))
            .unwrap_or_default();

        match (&self.root, root_index) {
            (Some(root), None) => {
                tracing::warn!("Root {} is not in the graph; depths will be null", root)
            }
            (None, _) => tracing::warn!("No root URL; depths will be null"),
            _ => {}
        }

        let nodes: Vec<Node> = nodes
            .into_values()
            .map(|mut node| {
                let v = index[&node.url];
                node.metrics = Some(NodeMetrics {
                    in_degree: in_degrees[v.index()],
                    out_degree: out_degrees[v.index()],
                    pagerank: pagerank[v.index()],
                    betweenness: betweenness[v.index()],
                    depth_from_root: depths.get(&v).copied(),
                });
                node
            })
            .collect();

        summary.edges = edges.len();
        summary.unique_links = graph.edge_count();
        summary.root_found = root_index.is_some();

        LinkGraph {
            nodes,
            edges,
            summary,
        }
    }
}
