//! Data-driven family: logical attack graph reduction.
//!
//! Pipeline: topology document → [`GraphBuilder`] → [`LogicGraph`] →
//! [`propagate`] → derived scores and summary metrics. Leaves seed the
//! reduction; every other node fires the instant its last predecessor
//! contributes.

pub mod builder;
pub mod graph;
pub mod metrics;
pub mod propagator;

pub use builder::{BuildError, GraphBuilder, EXEC_CODE_MARKER, RULE_PREFIX};
pub use graph::LogicGraph;
pub use metrics::{
    conditions_per_derived_node, conditions_per_exec_code_node, derived_nodes, exec_code_nodes,
    rules_per_derived_node, rules_per_exec_code_node, score_entropy, summarize, LagSummary,
    NodeTally,
};
pub use propagator::{propagate, PropagationError, PropagationReport};
