use std::collections::BTreeMap;

use serde::Serialize;

use crate::shot_zone::ShotZone;
use crate::shots::ShotAttempt;
use crate::types::BoxScoreStats;

// Free throws that end a possession, relative to one field-goal attempt.
const TS_FREE_THROW_WEIGHT: f64 = 0.44;

pub fn field_goal_pct(fgm: u32, fga: u32) -> Option<f64> {
    ratio(f64::from(fgm), f64::from(fga))
}

/// (FGM + 0.5 * FG3M) / FGA
pub fn effective_fg_pct(fgm: u32, fg3m: u32, fga: u32) -> Option<f64> {
    ratio(f64::from(fgm) + 0.5 * f64::from(fg3m), f64::from(fga))
}

/// PTS / (2 * (FGA + 0.44 * FTA))
pub fn true_shooting_pct(pts: u32, fga: u32, fta: u32) -> Option<f64> {
    ratio(
        f64::from(pts),
        2.0 * (f64::from(fga) + TS_FREE_THROW_WEIGHT * f64::from(fta)),
    )
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    if den <= 0.0 { None } else { Some(num / den) }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ShootingLine {
    pub attempts: u32,
    pub makes: u32,
    pub points: u32,
}

impl ShootingLine {
    pub fn pct(&self) -> Option<f64> {
        field_goal_pct(self.makes, self.attempts)
    }

    fn add(&mut self, made: bool, points: u32) {
        self.attempts += 1;
        if made {
            self.makes += 1;
        }
        self.points += points;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EfficiencySummary {
    pub fgm: u32,
    pub fga: u32,
    pub fg3m: u32,
    pub fta: u32,
    pub pts: u32,
    pub fg_pct: Option<f64>,
    pub efg_pct: Option<f64>,
    pub ts_pct: Option<f64>,
}

impl EfficiencySummary {
    pub fn from_box_score(stats: &BoxScoreStats) -> Self {
        Self::from_counts(stats.fgm, stats.fga, stats.fg3m, stats.fta, stats.pts)
    }

    fn from_counts(fgm: u32, fga: u32, fg3m: u32, fta: u32, pts: u32) -> Self {
        Self {
            fgm,
            fga,
            fg3m,
            fta,
            pts,
            fg_pct: field_goal_pct(fgm, fga),
            efg_pct: effective_fg_pct(fgm, fg3m, fga),
            ts_pct: true_shooting_pct(pts, fga, fta),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShotZoneSplits {
    pub zones: BTreeMap<ShotZone, ShootingLine>,
}

impl ShotZoneSplits {
    pub fn from_shots<'a>(shots: impl IntoIterator<Item = &'a ShotAttempt>) -> Self {
        let mut out = Self::default();
        for shot in shots {
            out.zones
                .entry(shot.shot_zone)
                .or_default()
                .add(!shot.miss, u32::from(shot.point_value));
        }
        out
    }

    pub fn from_box_score(stats: &BoxScoreStats) -> Self {
        let mut zones = BTreeMap::new();
        let two_makes = stats.fgm.saturating_sub(stats.fg3m);
        zones.insert(
            ShotZone::GenericTwoPoint,
            ShootingLine {
                attempts: stats.fga.saturating_sub(stats.fg3a),
                makes: two_makes,
                points: two_makes * 2,
            },
        );
        zones.insert(
            ShotZone::ThreePoint,
            ShootingLine {
                attempts: stats.fg3a,
                makes: stats.fg3m,
                points: stats.fg3m * 3,
            },
        );
        zones.insert(
            ShotZone::FreeThrow,
            ShootingLine {
                attempts: stats.fta,
                makes: stats.ftm,
                points: stats.ftm,
            },
        );
        Self { zones }
    }

    pub fn line(&self, zone: ShotZone) -> ShootingLine {
        self.zones.get(&zone).copied().unwrap_or_default()
    }

    pub fn efficiency(&self) -> EfficiencySummary {
        let mut fgm = 0;
        let mut fga = 0;
        let mut fg3m = 0;
        let mut fta = 0;
        let mut pts = 0;
        for (zone, line) in &self.zones {
            pts += line.points;
            if zone.is_field_goal() {
                fgm += line.makes;
                fga += line.attempts;
            } else {
                fta += line.attempts;
            }
            if *zone == ShotZone::ThreePoint {
                fg3m += line.makes;
            }
        }
        EfficiencySummary::from_counts(fgm, fga, fg3m, fta, pts)
    }
}

pub fn splits_by_player<'a>(
    shots: impl IntoIterator<Item = &'a ShotAttempt>,
) -> BTreeMap<String, ShotZoneSplits> {
    let mut grouped: BTreeMap<String, Vec<&ShotAttempt>> = BTreeMap::new();
    for shot in shots {
        grouped.entry(shot.player_id.clone()).or_default().push(shot);
    }
    grouped
        .into_iter()
        .map(|(player, shots)| (player, ShotZoneSplits::from_shots(shots)))
        .collect()
}
