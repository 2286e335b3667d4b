use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

/// Frontier entry of the best-first searches
#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    /// Ordering key: `cost` for Dijkstra, `cost + h(node)` for A*
    pub(super) priority: f64,
    pub(super) cost: f64,
    pub(super) node: NodeIndex,
}

// Min-heap by priority; equal priorities pop the lower node index first
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.node.index().cmp(&self.node.index()))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

#[cfg(test)]
mod tests {
    use std::collections::BinaryHeap;

    use super::*;

    fn state(priority: f64, node: usize) -> State {
        State {
            priority,
            cost: priority,
            node: NodeIndex::new(node),
        }
    }

    #[test]
    fn pops_cheapest_then_lowest_index() {
        let mut heap = BinaryHeap::new();
        heap.push(state(2.0, 0));
        heap.push(state(1.0, 7));
        heap.push(state(1.0, 3));

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop())
            .map(|s| s.node.index())
            .collect();
        assert_eq!(order, vec![3, 7, 0]);
    }
}
