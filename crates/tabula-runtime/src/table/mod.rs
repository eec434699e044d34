//! Decision table evaluation
//!
//! The evaluation of one table runs in fixed stages:
//! - input expressions are evaluated once ([`matcher`])
//! - every rule row is matched and the outputs of matching rows composed
//!   ([`matcher`], [`composer`])
//! - the hit policy selects and orders the matches ([`hit_policy`])
//! - COLLECT tables with an aggregation reduce one output column ([`aggregator`])
//! - the assembled result is handed to the listener chain ([`evaluator`])

mod aggregator;
mod composer;
mod evaluator;
mod hit_policy;
mod matcher;

pub use aggregator::aggregate;
pub use evaluator::DecisionTableEvaluator;
