//! Set of edges intersected by the current scanline
use crate::{Scalar, ScanEdge};

/// Horizontal nudge used to order crossings of the same x by winding direction
pub const NON_ZERO_EPSILON: Scalar = 1e-4;

/// Life cycle of an edge inside of the active set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeState {
    /// Scanline has just reached the upper endpoint of the edge
    Entering,
    /// Scanline has just reached the lower endpoint of the edge
    Leaving,
    /// Scanline crosses the interior of the edge
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveEdgeSlot {
    /// Index into the edge table
    pub index: u32,
    pub state: EdgeState,
}

/// Marker attached to a crossing while resolving the non-zero rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossingType {
    /// Edge going down, decreases winding
    Down,
    /// Edge going up, increases winding
    Up,
    /// Vertex emitted twice, treated as a down crossing followed by an up crossing
    Corner,
    /// Placeholder preceding `Corner`, never emitted
    CornerDummy,
}

/// Edges straddling the sweep position
///
/// Slot order is the order of entering, scanning keeps it stable.
#[derive(Debug, Clone, Default)]
pub struct ActiveEdgeList {
    slots: Vec<ActiveEdgeSlot>,
}

impl ActiveEdgeList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn slots(&self) -> &[ActiveEdgeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear()
    }

    /// Add edge that has just been reached by the scanline
    pub fn enter_edge(&mut self, index: u32) {
        self.slots.push(ActiveEdgeSlot {
            index,
            state: EdgeState::Entering,
        });
    }

    /// Mark edge as leaving, it is going to be removed by the next scan or compaction
    ///
    /// # Panics
    /// If edge is not present in the active set.
    pub fn leave_edge(&mut self, index: u32) {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.index == index && slot.state != EdgeState::Leaving);
        match slot {
            Some(slot) => slot.state = EdgeState::Leaving,
            None => panic!("edge {} is not in the active set", index),
        }
    }

    /// Drop leaving edges and mark the rest as active, order is preserved
    pub fn remove_leaving_edges(&mut self) {
        self.slots.retain_mut(|slot| {
            if slot.state == EdgeState::Leaving {
                false
            } else {
                slot.state = EdgeState::Active;
                true
            }
        });
    }

    /// Find crossings at `y` resolved with even-odd rule
    ///
    /// Result is stored sorted in `crossings`, leaving edges are removed.
    pub fn scan_even_odd(&mut self, y: Scalar, edges: &[ScanEdge], crossings: &mut Vec<Scalar>) {
        crossings.clear();
        self.slots.retain_mut(|slot| {
            let edge = &edges[slot.index as usize];
            let x = edge.x_at(y);
            match slot.state {
                EdgeState::Entering => emit(x, edge.emit_v0(), crossings),
                EdgeState::Leaving => {
                    emit(x, edge.emit_v1(), crossings);
                    return false;
                }
                EdgeState::Active => crossings.push(x),
            }
            slot.state = EdgeState::Active;
            true
        });
        crossings.sort_by(Scalar::total_cmp);
    }

    /// Find crossings at `y` resolved with non-zero rule
    ///
    /// `markers` is a scratch buffer, result is stored sorted in `crossings`,
    /// leaving edges are removed.
    pub fn scan_non_zero(
        &mut self,
        y: Scalar,
        edges: &[ScanEdge],
        crossings: &mut Vec<Scalar>,
        markers: &mut Vec<(Scalar, CrossingType)>,
    ) {
        markers.clear();
        self.slots.retain_mut(|slot| {
            let edge = &edges[slot.index as usize];
            let x = edge.x_at(y);
            match slot.state {
                EdgeState::Entering => emit_non_zero(x, edge.emit_v0(), edge.edge_up(), markers),
                EdgeState::Leaving => {
                    emit_non_zero(x, edge.emit_v1(), edge.edge_up(), markers);
                    return false;
                }
                EdgeState::Active => emit_non_zero(x, 1, edge.edge_up(), markers),
            }
            slot.state = EdgeState::Active;
            true
        });
        markers.sort_by(|a, b| a.0.total_cmp(&b.0));
        apply_non_zero_rule(markers, crossings);
    }
}

#[inline]
fn emit(x: Scalar, times: u8, crossings: &mut Vec<Scalar>) {
    for _ in 0..times.min(2) {
        crossings.push(x);
    }
}

#[inline]
fn emit_non_zero(x: Scalar, times: u8, edge_up: bool, markers: &mut Vec<(Scalar, CrossingType)>) {
    match times {
        0 => {}
        1 if edge_up => markers.push((x + NON_ZERO_EPSILON, CrossingType::Up)),
        1 => markers.push((x - NON_ZERO_EPSILON, CrossingType::Down)),
        _ => {
            // dummy must sort before the corner itself
            markers.push((x - NON_ZERO_EPSILON, CrossingType::CornerDummy));
            markers.push((x, CrossingType::Corner));
        }
    }
}

/// Keep only crossings where the winding number changes between zero and non-zero
///
/// `markers` must be sorted by position. Nudged positions are restored.
pub fn apply_non_zero_rule(markers: &[(Scalar, CrossingType)], crossings: &mut Vec<Scalar>) {
    crossings.clear();
    let mut tracker: i32 = 0;
    let mut emit_if_needed = |diff: i32, value: Scalar, crossings: &mut Vec<Scalar>| {
        let emit = (tracker == 0 && diff != 0) || tracker * diff == -1;
        tracker += diff;
        if emit {
            crossings.push(value);
        }
    };
    for (x, crossing_type) in markers.iter().copied() {
        match crossing_type {
            CrossingType::CornerDummy => {}
            CrossingType::Corner => {
                emit_if_needed(-1, x, crossings);
                emit_if_needed(1, x, crossings);
            }
            CrossingType::Up => emit_if_needed(1, x - NON_ZERO_EPSILON, crossings),
            CrossingType::Down => emit_if_needed(-1, x + NON_ZERO_EPSILON, crossings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, utils::tests::assert_slice_approx_eq};

    fn vertical(x: Scalar, up: bool, emit_v0: u8, emit_v1: u8) -> ScanEdge {
        ScanEdge::new(Point::new(x, 0.0), Point::new(x, 4.0), up, emit_v0, emit_v1)
    }

    #[test]
    fn test_enter_leave_compact() {
        let mut list = ActiveEdgeList::with_capacity(4);
        list.enter_edge(3);
        list.enter_edge(1);
        list.enter_edge(2);
        list.leave_edge(1);
        assert_eq!(list.slots()[1].state, EdgeState::Leaving);
        list.remove_leaving_edges();
        let indices: Vec<_> = list.slots().iter().map(|s| s.index).collect();
        assert_eq!(indices, [3, 2]);
        assert!(list.slots().iter().all(|s| s.state == EdgeState::Active));
    }

    #[test]
    #[should_panic]
    fn test_leave_missing_edge() {
        let mut list = ActiveEdgeList::default();
        list.enter_edge(0);
        list.leave_edge(5);
    }

    #[test]
    fn test_scan_even_odd() {
        let edges = [
            vertical(5.0, false, 2, 1),
            vertical(1.0, true, 1, 0),
            vertical(3.0, false, 0, 2),
        ];
        let mut list = ActiveEdgeList::default();
        let mut crossings = Vec::new();
        for index in 0..3 {
            list.enter_edge(index);
        }
        list.scan_even_odd(0.0, &edges, &mut crossings);
        assert_eq!(crossings, [1.0, 5.0, 5.0]);
        assert_eq!(list.len(), 3);

        list.scan_even_odd(1.0, &edges, &mut crossings);
        assert_eq!(crossings, [1.0, 3.0, 5.0]);

        list.leave_edge(0);
        list.leave_edge(2);
        list.scan_even_odd(4.0, &edges, &mut crossings);
        assert_eq!(crossings, [1.0, 3.0, 3.0, 5.0]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.slots()[0].index, 1);
    }

    #[test]
    fn test_non_zero_rule_nested() {
        // two nested boxes with the same orientation, inner crossings are hidden
        let markers = [
            (1.0 - NON_ZERO_EPSILON, CrossingType::Down),
            (2.0 - NON_ZERO_EPSILON, CrossingType::Down),
            (3.0 + NON_ZERO_EPSILON, CrossingType::Up),
            (4.0 + NON_ZERO_EPSILON, CrossingType::Up),
        ];
        let mut crossings = Vec::new();
        apply_non_zero_rule(&markers, &mut crossings);
        assert_slice_approx_eq(&crossings, &[1.0, 4.0], 1e-9);

        // opposite orientation keeps everything
        let markers = [
            (1.0 - NON_ZERO_EPSILON, CrossingType::Down),
            (2.0 + NON_ZERO_EPSILON, CrossingType::Up),
            (3.0 - NON_ZERO_EPSILON, CrossingType::Down),
            (4.0 + NON_ZERO_EPSILON, CrossingType::Up),
        ];
        apply_non_zero_rule(&markers, &mut crossings);
        assert_slice_approx_eq(&crossings, &[1.0, 2.0, 3.0, 4.0], 1e-9);
    }

    #[test]
    fn test_non_zero_rule_corner() {
        let markers = [
            (2.0 - NON_ZERO_EPSILON, CrossingType::CornerDummy),
            (2.0, CrossingType::Corner),
        ];
        let mut crossings = Vec::new();
        apply_non_zero_rule(&markers, &mut crossings);
        assert_eq!(crossings, [2.0, 2.0]);

        // corner inside of the filled region disappears
        let markers = [
            (1.0 - NON_ZERO_EPSILON, CrossingType::Down),
            (2.0 - NON_ZERO_EPSILON, CrossingType::CornerDummy),
            (2.0, CrossingType::Corner),
            (3.0 + NON_ZERO_EPSILON, CrossingType::Up),
        ];
        apply_non_zero_rule(&markers, &mut crossings);
        assert_slice_approx_eq(&crossings, &[1.0, 3.0], 1e-9);
    }

    #[test]
    fn test_scan_non_zero() {
        let edges = [
            vertical(1.0, false, 1, 1),
            vertical(2.0, false, 1, 1),
            vertical(3.0, true, 1, 1),
            vertical(4.0, true, 1, 1),
        ];
        let mut list = ActiveEdgeList::default();
        let mut crossings = Vec::new();
        let mut markers = Vec::new();
        for index in [3, 1, 0, 2] {
            list.enter_edge(index);
        }
        list.scan_non_zero(2.0, &edges, &mut crossings, &mut markers);
        assert_slice_approx_eq(&crossings, &[1.0, 4.0], 1e-9);
        assert!(list.slots().iter().all(|s| s.state == EdgeState::Active));
    }
}
