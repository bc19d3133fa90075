use nalgebra::Vector3;

use crate::error::RouteError;

// ---------------------------------------------------------------------------
// Patrol route: ordered waypoints behind a wrapping cursor
// ---------------------------------------------------------------------------

/// Waypoints visited in order, wrapping back to the first after the last.
/// Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PatrolRoute {
    nodes: Vec<Vector3<f64>>,
    /// Index `next_node` will return.
    cursor: usize,
}

impl PatrolRoute {
    pub fn new(nodes: Vec<Vector3<f64>>) -> Result<Self, RouteError> {
        if nodes.is_empty() {
            return Err(RouteError::Empty);
        }
        Ok(Self { nodes, cursor: 0 })
    }

    /// Return the waypoint under the cursor and advance it.
    pub fn next_node(&mut self) -> Vector3<f64> {
        let node = self.nodes[self.cursor];
        self.cursor = (self.cursor + 1) % self.nodes.len();
        node
    }

    pub fn node(&self, index: usize) -> Result<Vector3<f64>, RouteError> {
        self.nodes
            .get(index)
            .copied()
            .ok_or(RouteError::IndexOutOfRange { index, len: self.nodes.len() })
    }

    /// Index of the waypoint handed out most recently.
    pub fn current_index(&self) -> usize {
        (self.cursor + self.nodes.len() - 1) % self.nodes.len()
    }

    /// Make `index` the next waypoint returned by `next_node`.
    pub fn seek(&mut self, index: usize) -> Result<(), RouteError> {
        if index >= self.nodes.len() {
            return Err(RouteError::IndexOutOfRange { index, len: self.nodes.len() });
        }
        self.cursor = index;
        Ok(())
    }

    pub fn add_node(&mut self, node: Vector3<f64>) {
        self.nodes.push(node);
    }

    /// Remove a waypoint. The last remaining waypoint cannot be removed.
    pub fn remove_node(&mut self, index: usize) -> Result<Vector3<f64>, RouteError> {
        if index >= self.nodes.len() {
            return Err(RouteError::IndexOutOfRange { index, len: self.nodes.len() });
        }
        if self.nodes.len() == 1 {
            return Err(RouteError::Empty);
        }
        let removed = self.nodes.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        self.cursor %= self.nodes.len();
        Ok(removed)
    }

    /// Swap in a new set of waypoints and rewind the cursor.
    pub fn replace(&mut self, nodes: Vec<Vector3<f64>>) -> Result<(), RouteError> {
        if nodes.is_empty() {
            return Err(RouteError::Empty);
        }
        self.nodes = nodes;
        self.cursor = 0;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Vector3<f64>] {
        &self.nodes
    }
}
