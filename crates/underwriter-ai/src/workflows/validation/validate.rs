use std::collections::HashSet;

use super::domain::RuleNode;

/// Structural problems in an incoming rule tree. Raised before traversal so a
/// malformed tree never fails silently mid-walk.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("rule tree exceeds the maximum depth of {limit}")]
    DepthExceeded { limit: usize },
    #[error("duplicate rule id: {id}")]
    DuplicateId { id: String },
    #[error("rule '{name}' has a blank id")]
    BlankId { name: String },
}

/// Check a forest of root rules before evaluation.
///
/// Depth is bounded explicitly: the producer contract keeps trees under three
/// levels, but a malformed (or cyclic-by-construction-elsewhere) payload must
/// fail fast instead of recursing without limit.
pub fn check_forest(rules: &[RuleNode], max_depth: usize) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    let mut stack: Vec<(&RuleNode, usize)> = rules.iter().map(|rule| (rule, 1)).collect();

    while let Some((rule, depth)) = stack.pop() {
        if depth > max_depth {
            return Err(ValidationError::DepthExceeded { limit: max_depth });
        }
        if rule.id.trim().is_empty() {
            return Err(ValidationError::BlankId {
                name: rule.name.clone(),
            });
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: rule.id.clone(),
            });
        }
        for child in &rule.children {
            stack.push((child, depth + 1));
        }
    }

    Ok(())
}
