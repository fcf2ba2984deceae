//! Operator authorization

use crate::oplist::OperatorEntry;

/// Check whether `identity` is permitted to start a bridge session.
///
/// Scans the operator list in order and returns `true` on the first entry
/// whose name equals `identity` exactly. An empty list authorizes nobody.
pub fn is_authorized(identity: &str, operators: &[OperatorEntry]) -> bool {
    operators.iter().any(|entry| entry.name == identity)
}
