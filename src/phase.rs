//! Phase completion and active-phase detection.
//!
//! Phases are scanned in order starting at 1. A phase only becomes active
//! once every earlier phase fully passes and work for it has been planned.

use crate::models::{CurrentPhase, PhaseStatus};
use crate::store::FeatureSource;

/// Upper bound on the phase scan.
pub const MAX_PHASE: u32 = 100;

/// A phase is complete when it has features and all of them pass.
pub fn is_phase_complete(source: &impl FeatureSource, phase: u32) -> bool {
    let snapshot = source.snapshot(Some(phase));
    snapshot.total > 0 && snapshot.passing == snapshot.total
}

/// The phase work should currently happen in.
///
/// Returns the first incomplete phase. If every started phase is complete,
/// the last of them stays active until the next phase gets features. An empty
/// store is in phase 1.
pub fn current_phase(source: &impl FeatureSource) -> u32 {
    for phase in 1..=MAX_PHASE {
        if !source.has_any_features(phase) {
            return (phase - 1).max(1);
        }
        if !is_phase_complete(source, phase) {
            return phase;
        }
    }

    tracing::warn!(
        "Every phase up to {} is complete, stopping phase scan",
        MAX_PHASE
    );
    MAX_PHASE
}

/// The active phase together with its completion flag.
pub fn current_phase_status(source: &impl FeatureSource) -> CurrentPhase {
    let phase = current_phase(source);
    CurrentPhase {
        phase,
        complete: is_phase_complete(source, phase),
    }
}

/// Status of every started phase, in order, up to the active one.
pub fn phase_overview(source: &impl FeatureSource) -> Vec<PhaseStatus> {
    let mut phases = Vec::new();

    for phase in 1..=MAX_PHASE {
        if !source.has_any_features(phase) {
            break;
        }

        let snapshot = source.snapshot(Some(phase));
        let complete = snapshot.total > 0 && snapshot.passing == snapshot.total;
        phases.push(PhaseStatus {
            phase,
            passing: snapshot.passing,
            total: snapshot.total,
            complete,
        });

        if !complete {
            break;
        }
    }

    phases
}
