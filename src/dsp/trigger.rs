//! Edge trigger: rising-edge detector over a continuous control signal.

/// Latches one trigger per upward crossing of `threshold`.
///
/// Starts armed, so a signal that is already at or above the threshold on
/// the very first tick counts as a fresh edge.
#[derive(Debug, Clone)]
pub struct EdgeTrigger {
    threshold: f32,
    last_value: f32,
    armed: bool,
}

impl EdgeTrigger {
    pub fn new(threshold: f32) -> Self {
        EdgeTrigger {
            threshold,
            last_value: 0.0,
            armed: true,
        }
    }

    /// Record the latest sample. Dropping below the threshold re-arms.
    #[inline]
    pub fn update(&mut self, value: f32) {
        self.last_value = value;
        if value < self.threshold {
            self.armed = true;
        }
    }

    /// True exactly once per crossing; false until the signal falls and rises again.
    #[inline]
    pub fn new_trigger(&mut self) -> bool {
        if self.armed && self.last_value >= self.threshold {
            self.armed = false;
            true
        } else {
            false
        }
    }

    /// Is the last recorded sample at or above the threshold?
    pub fn is_high(&self) -> bool {
        self.last_value >= self.threshold
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.last_value = 0.0;
        self.armed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_count(trigger: &mut EdgeTrigger, values: &[f32]) -> usize {
        values
            .iter()
            .filter(|&&v| {
                trigger.update(v);
                trigger.new_trigger()
            })
            .count()
    }

    #[test]
    fn fires_once_per_crossing() {
        let mut t = EdgeTrigger::new(1.7);
        assert_eq!(fire_count(&mut t, &[0.0, 0.5, 2.0, 5.0, 5.0, 1.8, 10.0]), 1);
    }

    #[test]
    fn fires_on_exact_threshold() {
        let mut t = EdgeTrigger::new(0.5);
        t.update(0.0);
        assert!(!t.new_trigger());
        t.update(0.5);
        assert!(t.new_trigger());
    }

    #[test]
    fn refires_after_dropping_below() {
        let mut t = EdgeTrigger::new(1.7);
        let seq = [0.0, 5.0, 5.0, 0.0, 5.0, 1.69, 1.7];
        assert_eq!(fire_count(&mut t, &seq), 3);
    }

    #[test]
    fn high_initial_value_is_an_edge() {
        let mut t = EdgeTrigger::new(1.7);
        t.update(5.0);
        assert!(t.new_trigger());
        assert!(!t.new_trigger(), "latched until the signal falls");
    }

    #[test]
    fn independent_thresholds_on_same_signal() {
        let mut manual = EdgeTrigger::new(0.5);
        let mut cv = EdgeTrigger::new(1.7);
        let mut manual_fires = 0;
        let mut cv_fires = 0;
        for v in [0.0, 1.0, 0.0, 1.0, 2.0, 0.0] {
            manual.update(v);
            cv.update(v);
            manual_fires += manual.new_trigger() as usize;
            cv_fires += cv.new_trigger() as usize;
        }
        assert_eq!(manual_fires, 2);
        assert_eq!(cv_fires, 1);
    }

    #[test]
    fn reset_rearms() {
        let mut t = EdgeTrigger::new(1.7);
        t.update(5.0);
        assert!(t.new_trigger());
        t.reset();
        assert!(!t.is_high());
        t.update(5.0);
        assert!(t.new_trigger());
    }
}
