// ---------------------------------------------------------------------------
// Actuator arena with deferred additions and removals
// ---------------------------------------------------------------------------
//
// Attach/detach notifications may arrive at any time, but the live set only
// changes inside `apply_pending`, which the owning component calls once per
// tick before it iterates. A distribution pass therefore never sees the set
// change underneath it.

/// Stable handle to an actuator record. Slots are recycled but a handle
/// never matches a later occupant of its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActuatorId {
    index: u32,
    generation: u32,
}

impl std::fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    pending_add: Vec<(ActuatorId, T)>,
    pending_remove: Vec<ActuatorId>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            pending_add: Vec::new(),
            pending_remove: Vec::new(),
            live: 0,
        }
    }
}

/// What `apply_pending` changed.
#[derive(Debug)]
pub struct Applied<T> {
    pub added: Vec<ActuatorId>,
    pub removed: Vec<(ActuatorId, T)>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an addition. The returned handle is valid for `remove` right
    /// away and resolves once `apply_pending` has run.
    pub fn add(&mut self, value: T) -> ActuatorId {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(Slot { generation: 0, value: None });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        let id = ActuatorId { index, generation: slot.generation };
        self.pending_add.push((id, value));
        id
    }

    /// Stage a removal. Unknown or stale handles are ignored when applied.
    pub fn remove(&mut self, id: ActuatorId) {
        if !self.pending_remove.contains(&id) {
            self.pending_remove.push(id);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_add.is_empty() || !self.pending_remove.is_empty()
    }

    /// Apply staged additions, then staged removals.
    pub fn apply_pending(&mut self) -> Applied<T> {
        let mut applied = Applied { added: Vec::new(), removed: Vec::new() };

        for (id, value) in self.pending_add.drain(..) {
            let slot = &mut self.slots[id.index as usize];
            slot.value = Some(value);
            self.live += 1;
            applied.added.push(id);
        }

        for id in self.pending_remove.drain(..) {
            let Some(slot) = self.slots.get_mut(id.index as usize) else {
                continue;
            };
            if slot.generation != id.generation {
                continue;
            }
            if let Some(value) = slot.value.take() {
                self.live -= 1;
                self.free.push(id.index);
                applied.removed.push((id, value));
            }
        }

        applied
    }

    pub fn get(&self, id: ActuatorId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, id: ActuatorId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.value.as_mut())
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActuatorId, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value
                .as_ref()
                .map(|v| (ActuatorId { index: i as u32, generation: s.generation }, v))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ActuatorId, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.value
                .as_mut()
                .map(move |v| (ActuatorId { index: i as u32, generation }, v))
        })
    }

    /// Drop every live and staged record, returning the live ones.
    pub fn drain(&mut self) -> Vec<(ActuatorId, T)> {
        self.pending_add.clear();
        self.pending_remove.clear();
        let mut out = Vec::with_capacity(self.live);
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if let Some(v) = slot.value.take() {
                out.push((ActuatorId { index: i as u32, generation: slot.generation }, v));
            }
        }
        self.free = (0..self.slots.len() as u32).collect();
        self.live = 0;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additions_are_deferred() {
        let mut arena = Arena::new();
        let id = arena.add("a");
        assert!(arena.get(id).is_none());
        assert_eq!(arena.len(), 0);
        let applied = arena.apply_pending();
        assert_eq!(applied.added, vec![id]);
        assert_eq!(arena.get(id), Some(&"a"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn removals_are_deferred() {
        let mut arena = Arena::new();
        let a = arena.add(1);
        let b = arena.add(2);
        arena.apply_pending();
        arena.remove(a);
        assert_eq!(arena.iter().count(), 2);
        let applied = arena.apply_pending();
        assert_eq!(applied.removed.len(), 1);
        assert_eq!(arena.iter().map(|(_, v)| *v).collect::<Vec<_>>(), vec![2]);
        assert!(arena.get(b).is_some());
    }

    #[test]
    fn stale_handles_do_not_alias_reused_slots() {
        let mut arena = Arena::new();
        let a = arena.add(1);
        arena.apply_pending();
        arena.remove(a);
        arena.apply_pending();
        let c = arena.add(3);
        arena.apply_pending();
        assert_ne!(a, c);
        assert!(arena.get(a).is_none());
        arena.remove(a);
        let applied = arena.apply_pending();
        assert!(applied.removed.is_empty());
        assert_eq!(arena.get(c), Some(&3));
    }

    #[test]
    fn add_then_remove_in_same_tick() {
        let mut arena = Arena::new();
        let a = arena.add(1);
        arena.remove(a);
        let applied = arena.apply_pending();
        assert_eq!(applied.added, vec![a]);
        assert_eq!(applied.removed.len(), 1);
        assert!(arena.is_empty());
    }

    #[test]
    fn drain_empties_everything() {
        let mut arena = Arena::new();
        arena.add(1);
        arena.apply_pending();
        arena.add(2);
        let drained = arena.drain();
        assert_eq!(drained.len(), 1);
        assert!(arena.is_empty());
        assert!(!arena.has_pending());
    }
}
