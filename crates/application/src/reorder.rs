use std::time::Duration;

use livi_media_domain::{
    array_move, check_activation, closest_center, Activation, Point, PointerKind, Rect,
};
use tracing::debug;

use crate::{ApplicationError, SlotStore};

#[derive(Debug, Clone, Copy)]
struct Drag {
    kind: PointerKind,
    source: usize,
    origin: Point,
    current: Point,
    activation: Activation,
}

/// Turns pointer gestures over the slot grid into slot permutations.
///
/// A drag only starts on a filled slot; the "add photo" control of an empty
/// slot never begins one. Mouse drags activate after a short travel, touch
/// drags after a hold without moving.
#[derive(Debug, Clone)]
pub struct ReorderEngine {
    cells: Vec<Rect>,
    drag: Option<Drag>,
}

impl ReorderEngine {
    pub fn new(cells: Vec<Rect>) -> Self {
        Self { cells, drag: None }
    }

    pub fn cells(&self) -> &[Rect] {
        &self.cells
    }

    pub fn is_dragging(&self) -> bool {
        self.drag
            .is_some_and(|drag| drag.activation == Activation::Active)
    }

    pub fn active_slot(&self) -> Option<usize> {
        self.drag
            .filter(|drag| drag.activation == Activation::Active)
            .map(|drag| drag.source)
    }

    /// Returns whether the press may turn into a drag.
    pub fn pointer_down(&mut self, slot: usize, filled: bool, kind: PointerKind, at: Point) -> bool {
        if !filled || slot >= self.cells.len() {
            self.drag = None;
            return false;
        }
        self.drag = Some(Drag {
            kind,
            source: slot,
            origin: at,
            current: at,
            activation: Activation::Pending,
        });
        true
    }

    /// Tracks the pointer. Once a drag is active it stays active until it is
    /// dropped or cancelled; an aborted touch press is forgotten.
    pub fn pointer_move(&mut self, at: Point, held_for: Duration) -> Activation {
        let Some(drag) = self.drag.as_mut() else {
            return Activation::Aborted;
        };
        drag.current = at;
        if drag.activation == Activation::Pending {
            drag.activation = check_activation(drag.kind, drag.origin, at, held_for);
            if drag.activation == Activation::Active {
                debug!(slot = drag.source, "drag started");
            }
        }
        let activation = drag.activation;
        if activation == Activation::Aborted {
            self.drag = None;
        }
        activation
    }

    /// Ends the gesture. Yields the new slot order when an active drag lands
    /// on a different slot than it started from.
    pub fn drop_here(&mut self) -> Option<Vec<usize>> {
        let drag = self.drag.take()?;
        if drag.activation != Activation::Active {
            return None;
        }
        let source = self.cells.get(drag.source)?;
        let dragged = source.translated(
            drag.current.x - drag.origin.x,
            drag.current.y - drag.origin.y,
        );
        let target = closest_center(&dragged, &self.cells)?;
        if target == drag.source {
            return None;
        }
        debug!(from = drag.source, to = target, "drag dropped");
        Some(move_order(self.cells.len(), drag.source, target))
    }

    /// Escape or a lost pointer: nothing is reordered.
    pub fn cancel(&mut self) {
        self.drag = None;
    }

    /// Drops and applies the resulting order to `store`. Returns whether the
    /// slots changed.
    pub fn drop_onto(&mut self, store: &mut SlotStore) -> Result<bool, ApplicationError> {
        match self.drop_here() {
            Some(order) => {
                store.reorder_slots(&order)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Identity order over `len` slots with `from` moved to `to`.
pub fn move_order(len: usize, from: usize, to: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    array_move(&mut order, from, to);
    order
}
