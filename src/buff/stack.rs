//! Per-target buff accumulation.

use super::{Buff, BuffKind};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timed<T> {
    value: T,
    remaining: f32,
}

/// Buffs currently held by one damageable target.
///
/// Each kind is held at most once. Re-applying a timed buff replaces its
/// magnitude and resets its countdown; it never stacks duration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuffStack {
    mark_layers: u32,
    speed_up: Option<Timed<f32>>,
    soul_status: Option<Timed<u32>>,
}

impl BuffStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one ElectricMark layer and returns the new count.
    pub const fn add_mark_layer(&mut self) -> u32 {
        self.mark_layers = self.mark_layers.saturating_add(1);
        self.mark_layers
    }

    /// Current ElectricMark layer count.
    #[must_use]
    pub const fn mark_layers(&self) -> u32 {
        self.mark_layers
    }

    /// Takes all ElectricMark layers, leaving zero.
    pub const fn consume_marks(&mut self) -> u32 {
        std::mem::replace(&mut self.mark_layers, 0)
    }

    /// Applies or refreshes a SpeedUp.
    ///
    /// A duration that is not a positive finite number applies nothing and
    /// leaves any held SpeedUp as it was. Returns whether the buff was set.
    pub fn apply_speed_up(&mut self, multiplier: f32, duration: f32) -> bool {
        let Some(remaining) = positive(duration) else {
            return false;
        };
        self.speed_up = Some(Timed {
            value: multiplier.max(0.0),
            remaining,
        });
        true
    }

    /// Applies or refreshes a SoulStatus. Same duration rules as
    /// [`BuffStack::apply_speed_up`].
    pub fn apply_soul_status(&mut self, soul_bonus: u32, duration: f32) -> bool {
        let Some(remaining) = positive(duration) else {
            return false;
        };
        self.soul_status = Some(Timed {
            value: soul_bonus,
            remaining,
        });
        true
    }

    /// Movement multiplier from the active SpeedUp, or `1.0`.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_up.map_or(1.0, |t| t.value)
    }

    /// Soul bonus from the active SoulStatus, or `0`.
    #[must_use]
    pub fn soul_bonus(&self) -> u32 {
        self.soul_status.map_or(0, |t| t.value)
    }

    /// Returns the buff of the given kind, if held.
    #[must_use]
    pub fn get(&self, kind: BuffKind) -> Option<Buff> {
        match kind {
            BuffKind::ElectricMark => (self.mark_layers > 0).then_some(Buff::ElectricMark {
                layers: self.mark_layers,
            }),
            BuffKind::SpeedUp => self.speed_up.map(|t| Buff::SpeedUp {
                multiplier: t.value,
                remaining: t.remaining,
            }),
            BuffKind::SoulStatus => self.soul_status.map(|t| Buff::SoulStatus {
                soul_bonus: t.value,
                remaining: t.remaining,
            }),
        }
    }

    /// Whether a buff of the given kind is held.
    #[must_use]
    pub fn contains(&self, kind: BuffKind) -> bool {
        self.get(kind).is_some()
    }

    /// All held buffs in kind order.
    #[must_use]
    pub fn active(&self) -> Vec<Buff> {
        [BuffKind::ElectricMark, BuffKind::SpeedUp, BuffKind::SoulStatus]
            .into_iter()
            .filter_map(|kind| self.get(kind))
            .collect()
    }

    /// Removes the buff of the given kind.
    ///
    /// Returns the removed buff, or `None` when nothing was held. Removing
    /// an absent buff leaves every other buff untouched.
    pub fn remove(&mut self, kind: BuffKind) -> Option<Buff> {
        let removed = self.get(kind)?;
        match kind {
            BuffKind::ElectricMark => self.mark_layers = 0,
            BuffKind::SpeedUp => self.speed_up = None,
            BuffKind::SoulStatus => self.soul_status = None,
        }
        Some(removed)
    }

    /// Counts timed buffs down by `dt` and drops those that reach zero.
    ///
    /// Returns the kinds that expired during this call.
    pub fn tick(&mut self, dt: f32) -> Vec<BuffKind> {
        let mut expired = Vec::new();
        if countdown(&mut self.speed_up, dt) {
            expired.push(BuffKind::SpeedUp);
        }
        if countdown(&mut self.soul_status, dt) {
            expired.push(BuffKind::SoulStatus);
        }
        expired
    }
}

fn positive(duration: f32) -> Option<f32> {
    (duration.is_finite() && duration > 0.0).then_some(duration)
}

fn countdown<T>(slot: &mut Option<Timed<T>>, dt: f32) -> bool {
    let Some(timed) = slot else {
        return false;
    };
    timed.remaining -= dt.max(0.0);
    if timed.remaining <= 0.0 {
        *slot = None;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_layers_accumulate_and_consume() {
        let mut stack = BuffStack::new();
        assert_eq!(stack.add_mark_layer(), 1);
        assert_eq!(stack.add_mark_layer(), 2);
        assert_eq!(stack.add_mark_layer(), 3);
        assert_eq!(stack.mark_layers(), 3);
        assert_eq!(stack.consume_marks(), 3);
        assert_eq!(stack.mark_layers(), 0);
        assert!(!stack.contains(BuffKind::ElectricMark));
    }

    #[test]
    fn test_speed_up_expires_and_reverts() {
        let mut stack = BuffStack::new();
        stack.apply_speed_up(1.5, 1.0);
        assert!((stack.speed_multiplier() - 1.5).abs() < f32::EPSILON);

        assert!(stack.tick(0.6).is_empty());
        assert_eq!(stack.tick(0.6), vec![BuffKind::SpeedUp]);
        assert!((stack.speed_multiplier() - 1.0).abs() < f32::EPSILON);
        assert!(!stack.contains(BuffKind::SpeedUp));
    }

    #[test]
    fn test_speed_up_refresh_resets_countdown() {
        let mut stack = BuffStack::new();
        stack.apply_speed_up(1.5, 2.0);
        stack.tick(1.5);
        stack.apply_speed_up(2.0, 2.0);
        let Some(Buff::SpeedUp {
            multiplier,
            remaining,
        }) = stack.get(BuffKind::SpeedUp)
        else {
            panic!("speed up missing");
        };
        assert!((multiplier - 2.0).abs() < f32::EPSILON);
        assert!((remaining - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_duration_applies_nothing() {
        let mut stack = BuffStack::new();
        assert!(!stack.apply_soul_status(3, 0.0));
        assert!(!stack.contains(BuffKind::SoulStatus));
    }

    #[test]
    fn test_invalid_duration_keeps_held_buff() {
        let mut stack = BuffStack::new();
        assert!(stack.apply_speed_up(1.5, 5.0));
        assert!(stack.apply_soul_status(2, 5.0));

        assert!(!stack.apply_speed_up(2.0, 0.0));
        assert!(!stack.apply_speed_up(2.0, -1.0));
        assert!(!stack.apply_soul_status(9, f32::NAN));

        assert!((stack.speed_multiplier() - 1.5).abs() < f32::EPSILON);
        assert_eq!(stack.soul_bonus(), 2);
        assert_eq!(stack.active().len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut stack = BuffStack::new();
        stack.add_mark_layer();
        stack.apply_speed_up(1.5, 5.0);
        stack.apply_soul_status(2, 5.0);

        assert!(stack.remove(BuffKind::SpeedUp).is_some());
        assert!(stack.remove(BuffKind::SpeedUp).is_none());

        assert_eq!(stack.mark_layers(), 1);
        assert_eq!(stack.soul_bonus(), 2);
        assert_eq!(stack.active().len(), 2);
    }

    #[test]
    fn test_marks_are_not_timed() {
        let mut stack = BuffStack::new();
        stack.add_mark_layer();
        assert!(stack.tick(1000.0).is_empty());
        assert_eq!(stack.mark_layers(), 1);
    }
}
