// Tally Synthesizer
//
// Builds an overwhelming tally and already-elapsed windows so the next nudge
// approves the referendum. Only the chain evaluates the tally against its
// track curves; a curve the tally cannot pass surfaces as a referendum that
// was not approved.

use log::debug;

use gov_common::{
    block::BlockNumber,
    referenda::{Alarm, ConfirmingWindow, DecidingWindow, Tally},
};

/// Synthesized voting state of a referendum about to be approved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedApproval {
    pub tally: Tally,
    pub deciding: DecidingWindow,
    pub confirming: ConfirmingWindow,
    pub alarm: Alarm,
}

pub fn synthesize_approval(current: BlockNumber, total_issuance: u128) -> SynthesizedApproval {
    let votes = total_issuance.saturating_sub(1);
    let elapsed = current.saturating_sub(1);
    let next = current.saturating_add(1);
    let approval = SynthesizedApproval {
        tally: Tally {
            ayes: votes,
            nays: 0,
            support: votes,
        },
        deciding: DecidingWindow { since: elapsed },
        confirming: ConfirmingWindow { until: elapsed },
        alarm: (next, (next, 0)),
    };

    if log::log_enabled!(log::Level::Debug) {
        debug!("synthesized approval at block {}: {:?}", current, approval);
    }
    approval
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_common::referenda::{Curve, Perbill, Tracks};

    #[test]
    fn test_synthesized_state() {
        let approval = synthesize_approval(50, 1_000_000);

        assert_eq!(approval.tally.ayes, 999_999);
        assert_eq!(approval.tally.support, 999_999);
        assert_eq!(approval.tally.nays, 0);
        assert_eq!(approval.deciding.since, 49);
        assert_eq!(approval.confirming.until, 49);
        assert_eq!(approval.alarm, (51, (51, 0)));
    }

    #[test]
    fn test_every_default_track_passes_at_the_nudge() {
        let approval = synthesize_approval(10, 1_000_000);
        // the nudge runs two blocks after `since`
        for track in Tracks::default().iter() {
            assert!(track.is_passing(&approval.tally, 2, 1_000_000), "{}", track.name);
        }
    }

    #[test]
    fn test_full_support_curve_passes_once_decreasing() {
        let mut track = Tracks::default().get(0).unwrap().clone();
        track.decision_period = 100;
        track.min_support = Curve::LinearDecreasing {
            length: Perbill::one(),
            floor: Perbill::zero(),
            ceil: Perbill::one(),
        };
        let approval = synthesize_approval(10, 1_000_000);
        assert!(!track.is_passing(&approval.tally, 0, 1_000_000));
        assert!(track.is_passing(&approval.tally, 2, 1_000_000));
    }

    #[test]
    fn test_saturating_at_bounds() {
        let approval = synthesize_approval(0, 0);
        assert_eq!(approval.deciding.since, 0);
        assert_eq!(approval.tally.ayes, 0);

        let approval = synthesize_approval(u32::MAX, 1_000);
        assert_eq!(approval.alarm, (u32::MAX, (u32::MAX, 0)));
    }
}
