//! Deferred callbacks
//!
//! Actions queued with a delay and released once the frame clock has
//! advanced past it. Actions are plain data: the owner decides what to do
//! with them when they come due, after checking the handles they carry are
//! still alive.

/// Identifier of a scheduled action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TimerId,
    remaining: f32,
    action: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    pending: Vec<Pending<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Run `action` once after `delay` seconds of advanced frames
    pub fn after(&mut self, delay: f32, action: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            remaining: delay.max(0.0),
            action,
        });
        id
    }

    /// Drop a scheduled action before it fires. Returns false if it already fired.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Advance by one frame and return the actions that came due.
    ///
    /// Due actions are ordered by how overdue they are, then by schedule order,
    /// so a frame that releases several actions replays them deterministically.
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        for p in &mut self.pending {
            p.remaining -= dt;
        }

        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.remaining <= 0.0);
        self.pending = waiting;

        due.sort_by(|a, b| {
            a.remaining
                .partial_cmp(&b.remaining)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        due.into_iter().map(|p| p.action).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &T> {
        self.pending.iter().map(|p| &p.action)
    }
}
