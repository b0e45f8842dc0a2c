use serde::Serialize;

use crate::profile::Scenario;
use crate::scoring::Projection;

/// Month at which a new client's score bottoms out.
const DIP_MONTH: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineStage {
    Current,
    Dip,
    Stabilization,
    Recovery,
    Projected,
}

impl TimelineStage {
    pub fn label(&self) -> &'static str {
        match self {
            TimelineStage::Current => "Today",
            TimelineStage::Dip => "Dip",
            TimelineStage::Stabilization => "Stabilization",
            TimelineStage::Recovery => "Recovery",
            TimelineStage::Projected => "Projected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub month: u32,
    pub score: i32,
    pub stage: TimelineStage,
}

/// Chart series for a projection: today, the dip, the two milestones and
/// the end of the program. Months never decrease along the series.
pub fn build_timeline(projection: &Projection, scenario: Scenario) -> Vec<TimelinePoint> {
    let horizon = projection.recovery_months;
    let dip_month = match scenario {
        Scenario::NewClient => DIP_MONTH.min(horizon),
        Scenario::ExistingClient => 0,
    };
    let stabilization_month = horizon.div_ceil(3).max(dip_month);
    let recovery_month = (horizon * 2).div_ceil(3).max(stabilization_month);

    let m = &projection.milestones;
    vec![
        TimelinePoint {
            month: 0,
            score: projection.initial_score,
            stage: TimelineStage::Current,
        },
        TimelinePoint {
            month: dip_month,
            score: m.dip,
            stage: TimelineStage::Dip,
        },
        TimelinePoint {
            month: stabilization_month,
            score: m.stabilization,
            stage: TimelineStage::Stabilization,
        },
        TimelinePoint {
            month: recovery_month,
            score: m.recovery,
            stage: TimelineStage::Recovery,
        },
        TimelinePoint {
            month: horizon,
            score: projection.projected_score,
            stage: TimelineStage::Projected,
        },
    ]
}
