//=========================================================================
// Alarms
//=========================================================================
//
// Named countdowns owned by the game, rooms and objects.
//
// Flow:
//   set("spawn", 30.0) → tick(delta_mult) each frame → fired names
//
// Values count frames scaled by delta_mult. An alarm is removed before
// its event fires, so a handler may set the same alarm again.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;

//=== Alarms ==============================================================

/// A set of named countdowns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alarms {
    alarms: BTreeMap<String, f64>,
}

impl Alarms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or resets) an alarm to fire after `frames` frames.
    pub fn set(&mut self, name: impl Into<String>, frames: f64) {
        self.alarms.insert(name.into(), frames);
    }

    /// Remaining frames of an alarm, if it is set.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.alarms.get(name).copied()
    }

    /// Cancels an alarm. Returns whether it was set.
    pub fn cancel(&mut self, name: &str) -> bool {
        self.alarms.remove(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn clear(&mut self) {
        self.alarms.clear();
    }

    /// Counts every alarm down by `delta_mult` and removes the expired
    /// ones, returning their names in name order.
    pub(crate) fn tick(&mut self, delta_mult: f64) -> Vec<String> {
        let mut expired = Vec::new();
        for (name, value) in self.alarms.iter_mut() {
            *value -= delta_mult;
            if *value <= 0.0 {
                expired.push(name.clone());
            }
        }
        for name in &expired {
            self.alarms.remove(name);
        }
        expired
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alarm_fires_once_when_reaching_zero() {
        let mut alarms = Alarms::new();
        alarms.set("a", 2.0);

        assert!(alarms.tick(1.0).is_empty());
        assert_eq!(alarms.tick(1.0), vec!["a".to_string()]);
        assert!(alarms.is_empty());
        assert!(alarms.tick(1.0).is_empty());
    }

    #[test]
    fn delta_mult_scales_countdown() {
        let mut alarms = Alarms::new();
        alarms.set("slow", 3.0);
        assert_eq!(alarms.tick(2.5).len(), 0);
        assert_eq!(alarms.get("slow"), Some(0.5));
        assert_eq!(alarms.tick(2.5), vec!["slow".to_string()]);
    }

    #[test]
    fn all_expired_alarms_fire_together() {
        let mut alarms = Alarms::new();
        alarms.set("b", 1.0);
        alarms.set("a", 0.5);
        alarms.set("c", 9.0);
        assert_eq!(alarms.tick(1.0), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(alarms.len(), 1);
    }

    #[test]
    fn cancel_removes_alarm() {
        let mut alarms = Alarms::new();
        alarms.set("x", 5.0);
        assert!(alarms.cancel("x"));
        assert!(!alarms.cancel("x"));
    }
}
