//! Toggle state: a persistent on/off flag flipped by edge triggers.
//!
//! A toggle owns an ordered list of trigger sources (a manual button and a
//! CV input for every mute/solo switch). Each fresh edge flips the flag once,
//! in source order, so two edges landing in the same tick cancel out.

use super::trigger::EdgeTrigger;

/// Where a trigger source's samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A front-panel button or fader switch.
    Manual,
    /// A gate/trigger control-voltage input.
    Cv,
}

#[derive(Debug, Clone)]
pub struct TriggerSource {
    pub kind: SourceKind,
    trigger: EdgeTrigger,
}

impl TriggerSource {
    pub fn new(kind: SourceKind, threshold: f32) -> Self {
        TriggerSource {
            kind,
            trigger: EdgeTrigger::new(threshold),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToggleState {
    active: bool,
    sources: Vec<TriggerSource>,
}

impl ToggleState {
    pub fn new(sources: Vec<TriggerSource>) -> Self {
        ToggleState {
            active: false,
            sources,
        }
    }

    /// The usual pairing: manual button first, CV input second.
    pub fn manual_and_cv(manual_threshold: f32, cv_threshold: f32) -> Self {
        Self::new(vec![
            TriggerSource::new(SourceKind::Manual, manual_threshold),
            TriggerSource::new(SourceKind::Cv, cv_threshold),
        ])
    }

    /// Feed one tick of samples, one per source in source order.
    ///
    /// `None` means the source is not connected this tick: its trigger is
    /// neither updated nor polled. Samples beyond the number of sources are
    /// ignored, missing trailing samples count as `None`.
    pub fn update(&mut self, samples: &[Option<f32>]) -> bool {
        for (i, source) in self.sources.iter_mut().enumerate() {
            let Some(value) = samples.get(i).copied().flatten() else {
                continue;
            };
            source.trigger.update(value);
            if source.trigger.new_trigger() {
                self.active = !self.active;
            }
        }
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Indicator value: 1.0 when active, 0.0 otherwise.
    pub fn light(&self) -> f32 {
        if self.active { 1.0 } else { 0.0 }
    }

    pub fn sources(&self) -> impl Iterator<Item = SourceKind> + '_ {
        self.sources.iter().map(|s| s.kind)
    }

    /// Back to inactive with every trigger re-armed.
    pub fn reset(&mut self) {
        self.active = false;
        for source in &mut self.sources {
            source.trigger.reset();
        }
    }
}
