use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BreathPhase {
    #[default]
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    pub fn next(self) -> Self {
        match self {
            BreathPhase::Inhale => BreathPhase::Hold,
            BreathPhase::Hold => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::Inhale,
        }
    }
}

/// Box-breathing rhythm: each phase counts down `phase_secs` one second at a time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BreathingCycle {
    pub phase: BreathPhase,
    pub remaining_secs: u32,
    pub phase_secs: u32,
    pub completed_cycles: u32,
}

impl BreathingCycle {
    pub fn new(phase_secs: u32) -> Self {
        let phase_secs = phase_secs.max(1);
        Self {
            phase: BreathPhase::Inhale,
            remaining_secs: phase_secs,
            phase_secs,
            completed_cycles: 0,
        }
    }

    /// Advances one second. Returns true when the phase changed.
    pub fn tick(&mut self) -> bool {
        if self.remaining_secs > 1 {
            self.remaining_secs -= 1;
            return false;
        }
        if self.phase == BreathPhase::Exhale {
            self.completed_cycles = self.completed_cycles.saturating_add(1);
        }
        self.phase = self.phase.next();
        self.remaining_secs = self.phase_secs;
        true
    }
}

impl Default for BreathingCycle {
    fn default() -> Self {
        Self::new(4)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum BreathingStatus {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreathingState {
    pub status: BreathingStatus,
    pub cycle: BreathingCycle,
    pub started_at: Option<DateTime<Utc>>,
}

impl BreathingState {
    pub fn begin(&mut self, phase_secs: u32, started_at: DateTime<Utc>) {
        *self = Self {
            status: BreathingStatus::Running,
            cycle: BreathingCycle::new(phase_secs),
            started_at: Some(started_at),
        };
    }

    pub fn stop(&mut self) {
        self.status = BreathingStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_then_rotates_phases() {
        let mut cycle = BreathingCycle::new(4);
        assert_eq!((cycle.phase, cycle.remaining_secs), (BreathPhase::Inhale, 4));

        assert!(!cycle.tick());
        assert!(!cycle.tick());
        assert!(!cycle.tick());
        assert_eq!(cycle.remaining_secs, 1);

        assert!(cycle.tick());
        assert_eq!((cycle.phase, cycle.remaining_secs), (BreathPhase::Hold, 4));
    }

    #[test]
    fn full_rotation_counts_a_cycle() {
        let mut cycle = BreathingCycle::new(2);
        let changes = (0..6).filter(|_| cycle.tick()).count();

        assert_eq!(changes, 3);
        assert_eq!(cycle.phase, BreathPhase::Inhale);
        assert_eq!(cycle.completed_cycles, 1);
    }

    #[test]
    fn zero_length_phase_is_treated_as_one_second() {
        let mut cycle = BreathingCycle::new(0);
        assert_eq!(cycle.phase_secs, 1);
        assert!(cycle.tick());
        assert_eq!(cycle.phase, BreathPhase::Hold);
    }
}
