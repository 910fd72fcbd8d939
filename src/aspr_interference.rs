use serde::{Deserialize, Serialize};

use crate::aspr_error::{Result, SimError};
use crate::aspr_interface::InterferenceModel;
use crate::aspr_node::Node;

/// Unit cost for every pair of distinct, assigned nodes sharing a color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryInterference;

impl InterferenceModel for BinaryInterference {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn cost(&self, u: &Node, v: &Node) -> f64 {
        match (u.color(), v.color()) {
            (Some(a), Some(b)) if u.id() != v.id() && a == b => 1.0,
            _ => 0.0,
        }
    }

    fn box_clone(&self) -> Box<dyn InterferenceModel> {
        Box::new(*self)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Closed set of interference models, resolved once at configuration time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterferenceModelKind {
    #[default]
    Binary,
}

impl InterferenceModelKind {
    pub fn options() -> &'static [&'static str] {
        &["binary"]
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "binary" => Ok(Self::Binary),
            other => Err(SimError::UnknownInterferenceModel(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
        }
    }

    pub fn build(&self) -> Box<dyn InterferenceModel> {
        match self {
            Self::Binary => Box::new(BinaryInterference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colored(id: usize, color: Option<usize>) -> Node {
        let mut node = Node::new(id, 10);
        if let Some(c) = color {
            node.assign(c);
        }
        node
    }

    #[test]
    fn test_same_color_interferes() {
        let model = BinaryInterference;
        let u = colored(0, Some(2));
        let v = colored(1, Some(2));
        assert_eq!(model.cost(&u, &v), 1.0);
        assert_eq!(model.cost(&v, &u), 1.0);
    }

    #[test]
    fn test_no_interference() {
        let model = BinaryInterference;

        // different colors
        assert_eq!(model.cost(&colored(0, Some(1)), &colored(1, Some(2))), 0.0);
        // one side unassigned
        assert_eq!(model.cost(&colored(0, Some(1)), &colored(1, None)), 0.0);
        // both unassigned
        assert_eq!(model.cost(&colored(0, None), &colored(1, None)), 0.0);
        // same node
        let u = colored(3, Some(1));
        assert_eq!(model.cost(&u, &u), 0.0);
    }

    #[test]
    fn test_registry() {
        assert_eq!(
            InterferenceModelKind::from_name("binary").unwrap(),
            InterferenceModelKind::Binary
        );
        assert!(matches!(
            InterferenceModelKind::from_name("distance"),
            Err(SimError::UnknownInterferenceModel(_))
        ));
        assert_eq!(InterferenceModelKind::Binary.build().name(), "binary");

        let parsed: InterferenceModelKind = serde_yaml::from_str("binary").unwrap();
        assert_eq!(parsed, InterferenceModelKind::Binary);
    }
}
