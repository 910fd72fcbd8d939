use indexmap::IndexMap;

use crate::aspr_interface::{Color, NodeId, UNASSIGNED_COLOR};

/// A single schedulable unit: a color (once assigned) and a remaining lifetime.
///
/// Lifetime only counts down while the node is assigned. Once it reaches zero
/// the following tick clears the color; lifetime stays at zero afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    color: Option<Color>,
    ttl: u32,
}

impl Node {
    pub fn new(id: NodeId, ttl: u32) -> Self {
        Self {
            id,
            color: None,
            ttl,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn is_assigned(&self) -> bool {
        self.color.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.ttl == 0
    }

    /// Assignment is driven by `State::activate`, never by the node itself.
    pub(crate) fn assign(&mut self, color: Color) {
        self.color = Some(color);
    }

    pub fn tick(&mut self) {
        if self.ttl == 0 && self.color.is_some() {
            self.color = None;
        } else if self.color.is_some() {
            self.ttl -= 1;
        }
    }

    /// Color and lifetime keyed by node identity, e.g. `n3-color`, `n3-ttl`.
    pub fn to_summary(&self) -> IndexMap<String, i64> {
        let mut summary = IndexMap::with_capacity(2);
        summary.insert(format!("n{}-color", self.id), self.color_code());
        summary.insert(format!("n{}-ttl", self.id), self.ttl as i64);
        summary
    }

    /// Exported color value: the color index, or -1 when unassigned.
    pub fn color_code(&self) -> i64 {
        self.color.map_or(UNASSIGNED_COLOR, |c| c as i64)
    }
}
