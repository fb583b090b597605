// Referenda tracks: governance lanes with their own timing and curves

use serde::{Deserialize, Serialize};

use super::{Perbill, Tally};
use crate::{block::BlockNumber, origin::OriginCaller};

pub type TrackId = u16;

/// A monotonically non-increasing threshold over the deciding period.
/// `x` is the fraction of the decision period that has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    /// Falls linearly from `ceil` to `floor` over `length`, then stays at `floor`
    LinearDecreasing {
        length: Perbill,
        floor: Perbill,
        ceil: Perbill,
    },
    /// Starts at `begin` and drops by `step` every `period`, never below `end`
    SteppedDecreasing {
        begin: Perbill,
        end: Perbill,
        step: Perbill,
        period: Perbill,
    },
}

impl Curve {
    pub fn threshold(&self, x: Perbill) -> Perbill {
        match *self {
            Curve::LinearDecreasing {
                length,
                floor,
                ceil,
            } => {
                let progress = x.min(length).saturating_div(length);
                ceil.saturating_sub(progress.saturating_mul(ceil.saturating_sub(floor)))
            }
            Curve::SteppedDecreasing {
                begin,
                end,
                step,
                period,
            } => {
                let steps = x
                    .deconstruct()
                    .checked_div(period.deconstruct())
                    .unwrap_or(0);
                let drop = Perbill::from_parts(step.deconstruct().saturating_mul(steps));
                begin.saturating_sub(drop).max(end)
            }
        }
    }

    pub fn passing(&self, x: Perbill, y: Perbill) -> bool {
        y >= self.threshold(x)
    }
}

/// Static configuration of one referenda track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: TrackId,
    pub name: String,
    /// Proposal origin routed to this track
    pub origin: OriginCaller,
    pub decision_deposit: u128,
    pub prepare_period: BlockNumber,
    pub decision_period: BlockNumber,
    pub confirm_period: BlockNumber,
    pub min_enactment_period: BlockNumber,
    pub min_approval: Curve,
    pub min_support: Curve,
}

impl TrackInfo {
    /// Whether `tally` clears both curves `elapsed` blocks into the decision period
    pub fn is_passing(&self, tally: &Tally, elapsed: BlockNumber, total_issuance: u128) -> bool {
        let x = Perbill::from_rational(elapsed as u128, self.decision_period as u128);
        self.min_approval.passing(x, tally.approval())
            && self.min_support.passing(x, tally.support(total_issuance))
    }
}

/// Track table with origin routing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tracks(Vec<TrackInfo>);

impl Tracks {
    pub fn new(tracks: Vec<TrackInfo>) -> Self {
        Self(tracks)
    }

    pub fn get(&self, id: TrackId) -> Option<&TrackInfo> {
        self.0.iter().find(|track| track.id == id)
    }

    pub fn track_for(&self, origin: &OriginCaller) -> Option<&TrackInfo> {
        self.0.iter().find(|track| &track.origin == origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackInfo> {
        self.0.iter()
    }
}

impl Default for Tracks {
    // Timings in 6 second blocks
    fn default() -> Self {
        let approval = Curve::LinearDecreasing {
            length: Perbill::one(),
            floor: Perbill::from_percent(50),
            ceil: Perbill::from_percent(100),
        };

        Self(vec![
            TrackInfo {
                id: 0,
                name: "root".to_string(),
                origin: OriginCaller::Root,
                decision_deposit: 100_000,
                prepare_period: 1_200,
                decision_period: 403_200,
                confirm_period: 14_400,
                min_enactment_period: 14_400,
                min_approval: approval,
                min_support: Curve::LinearDecreasing {
                    length: Perbill::one(),
                    floor: Perbill::zero(),
                    ceil: Perbill::from_percent(50),
                },
            },
            TrackInfo {
                id: 1,
                name: "whitelisted_caller".to_string(),
                origin: OriginCaller::Origins(1),
                decision_deposit: 10_000,
                prepare_period: 300,
                decision_period: 403_200,
                confirm_period: 100,
                min_enactment_period: 100,
                min_approval: approval,
                min_support: Curve::SteppedDecreasing {
                    begin: Perbill::from_percent(20),
                    end: Perbill::from_percent(1),
                    step: Perbill::from_percent(1),
                    period: Perbill::from_percent(5),
                },
            },
            TrackInfo {
                id: 14,
                name: "general_admin".to_string(),
                origin: OriginCaller::Origins(14),
                decision_deposit: 5_000,
                prepare_period: 1_200,
                decision_period: 403_200,
                confirm_period: 1_800,
                min_enactment_period: 100,
                min_approval: approval,
                min_support: Curve::SteppedDecreasing {
                    begin: Perbill::from_percent(50),
                    end: Perbill::from_percent(5),
                    step: Perbill::from_percent(5),
                    period: Perbill::from_percent(10),
                },
            },
        ])
    }
}
