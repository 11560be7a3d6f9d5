//! Reference validation.
//!
//! Walks every component's declared inputs and outputs and reports each id
//! that resolves to neither a registered component nor an accepted sentinel.
//! Findings are reported, never thrown: a dangling reference degrades the
//! graph, it does not abort the simulation.

use tracing::warn;

use crate::component::{HasMeta, DRAIN_SENTINEL, SOURCE_SENTINEL};
use crate::graph::ComponentGraph;

/// Direction of the edge a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSide {
    Input,
    Output,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// A declared input/output id resolves to nothing.
    DanglingReference {
        component: String,
        side: EdgeSide,
        reference: String,
    },
    /// A non-boundary component declares no inputs or no outputs at all.
    MissingConnections {
        component: String,
        side: EdgeSide,
    },
}

fn sentinel_accepted(side: EdgeSide, reference: &str) -> bool {
    match side {
        EdgeSide::Input => reference == SOURCE_SENTINEL,
        EdgeSide::Output => reference == DRAIN_SENTINEL,
    }
}

/// Validate every declared reference in the graph.
pub fn validate_references<T: HasMeta>(graph: &ComponentGraph<T>) -> Vec<Finding> {
    let mut findings = Vec::new();

    for component in graph.iter() {
        let meta = component.meta();
        let boundary = meta.category.is_boundary();

        for (side, refs) in [
            (EdgeSide::Input, &meta.inputs),
            (EdgeSide::Output, &meta.outputs),
        ] {
            if refs.is_empty() && !boundary {
                // A dead-ended conductor is suspicious but tolerated.
                findings.push(Finding::MissingConnections {
                    component: meta.id.clone(),
                    side,
                });
                continue;
            }
            for reference in refs {
                if graph.contains(reference) || sentinel_accepted(side, reference) {
                    continue;
                }
                warn!(
                    component = %meta.id,
                    reference = %reference,
                    "dangling reference"
                );
                findings.push(Finding::DanglingReference {
                    component: meta.id.clone(),
                    side,
                    reference: reference.clone(),
                });
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Category, Meta};

    fn graph_with(metas: Vec<Meta>) -> ComponentGraph<Meta> {
        let mut graph = ComponentGraph::new();
        for meta in metas {
            graph.insert(meta).unwrap();
        }
        graph
    }

    #[test]
    fn valid_chain_has_no_findings() {
        let graph = graph_with(vec![
            Meta::new(
                "feed1",
                Category::Feed,
                vec![],
                vec!["valve1".into()],
            ),
            Meta::new(
                "valve1",
                Category::Valve,
                vec!["feed1".into()],
                vec!["tank1".into()],
            ),
            Meta::new(
                "tank1",
                Category::Tank,
                vec!["valve1".into()],
                vec![DRAIN_SENTINEL.into()],
            ),
        ]);
        assert!(validate_references(&graph).is_empty());
    }

    #[test]
    fn dangling_reference_is_reported_not_fatal() {
        let graph = graph_with(vec![Meta::new(
            "valve1",
            Category::Valve,
            vec![SOURCE_SENTINEL.into()],
            vec!["ghost".into()],
        )]);
        let findings = validate_references(&graph);
        assert_eq!(
            findings,
            vec![Finding::DanglingReference {
                component: "valve1".into(),
                side: EdgeSide::Output,
                reference: "ghost".into(),
            }]
        );
    }

    #[test]
    fn sentinels_only_accepted_on_their_side() {
        // "drain" as an input is dangling, as is "source" as an output.
        let graph = graph_with(vec![Meta::new(
            "pipe1",
            Category::Pipe,
            vec![DRAIN_SENTINEL.into()],
            vec![SOURCE_SENTINEL.into()],
        )]);
        let findings = validate_references(&graph);
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn boundary_components_exempt_from_symmetry() {
        let graph = graph_with(vec![
            Meta::new("feed1", Category::Feed, vec![], vec!["tank1".into()]),
            Meta::new("drain1", Category::Drain, vec!["tank1".into()], vec![]),
            Meta::new(
                "tank1",
                Category::Tank,
                vec!["feed1".into()],
                vec!["drain1".into()],
            ),
        ]);
        assert!(validate_references(&graph).is_empty());
    }

    #[test]
    fn non_boundary_without_connections_is_flagged() {
        let graph = graph_with(vec![Meta::new("tank1", Category::Tank, vec![], vec![])]);
        let findings = validate_references(&graph);
        assert_eq!(findings.len(), 2);
        assert!(matches!(
            findings[0],
            Finding::MissingConnections {
                side: EdgeSide::Input,
                ..
            }
        ));
    }
}
