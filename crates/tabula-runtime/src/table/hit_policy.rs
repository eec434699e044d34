//! Hit policy resolution
//!
//! Selects and orders the matching rules according to the table's hit policy.
//! Matches arrive in declaration order.

use super::composer::MatchedRule;
use crate::error::{EvaluationError, Result};
use tabula_core::{DecisionTable, HitPolicy, Value};

/// Apply the table's hit policy to the matching rules
pub(crate) fn resolve(table: &DecisionTable, matches: Vec<MatchedRule>) -> Result<Vec<MatchedRule>> {
    match table.hit_policy {
        HitPolicy::Unique => {
            if matches.len() > 1 {
                return Err(ambiguous(
                    table,
                    &matches,
                    "more than one rule matched".to_string(),
                ));
            }
            Ok(matches)
        }

        HitPolicy::First => Ok(matches.into_iter().take(1).collect()),

        HitPolicy::Any => {
            let Some(first) = matches.first() else {
                return Ok(matches);
            };
            if let Some(conflict) = matches
                .iter()
                .find(|candidate| !same_outputs(candidate, first))
            {
                let reason = format!(
                    "rules '{}' and '{}' produce different outputs",
                    first.key(),
                    conflict.key()
                );
                return Err(ambiguous(table, &matches, reason));
            }
            Ok(matches.into_iter().take(1).collect())
        }

        HitPolicy::Priority => {
            let mut sorted = sort_by_priority(table, matches);
            sorted.truncate(1);
            Ok(sorted)
        }

        HitPolicy::OutputOrder => Ok(sort_by_priority(table, matches)),

        HitPolicy::RuleOrder | HitPolicy::Collect => Ok(matches),
    }
}

/// Stable sort by the outputs' declared priority lists, column by column
///
/// A value that is missing, or not part of its column's list, ranks after
/// every listed value. Rules of equal rank keep declaration order.
fn sort_by_priority(table: &DecisionTable, matches: Vec<MatchedRule>) -> Vec<MatchedRule> {
    let mut ranked: Vec<(Vec<usize>, MatchedRule)> = matches
        .into_iter()
        .map(|matched| {
            let ranks = table
                .outputs
                .iter()
                .enumerate()
                .map(|(column, output)| {
                    output.priority_rank(matched.output_value(column).unwrap_or(&Value::Null))
                })
                .collect();
            (ranks, matched)
        })
        .collect();

    ranked.sort_by(|(left, _), (right, _)| left.cmp(right));
    ranked.into_iter().map(|(_, matched)| matched).collect()
}

/// Slot-wise output agreement; numbers compare by value across integer and double
fn same_outputs(left: &MatchedRule, right: &MatchedRule) -> bool {
    left.output_values.len() == right.output_values.len()
        && left
            .output_values
            .iter()
            .zip(&right.output_values)
            .all(|pair| match pair {
                (Some(l), Some(r)) => l.loose_eq(r),
                (None, None) => true,
                _ => false,
            })
}

fn ambiguous(table: &DecisionTable, matches: &[MatchedRule], reason: String) -> EvaluationError {
    EvaluationError::AmbiguousResult {
        hit_policy: table.hit_policy,
        rules: matches.iter().map(|m| m.key().to_string()).collect(),
        reason,
    }
}
