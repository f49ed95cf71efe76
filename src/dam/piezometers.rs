use bevy::prelude::*;

use crate::dam::profile::DamProfile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PiezometerRow {
    Crest,
    Mid,
    Base,
}

impl PiezometerRow {
    pub const ALL: [PiezometerRow; 3] = [PiezometerRow::Crest, PiezometerRow::Mid, PiezometerRow::Base];

    fn prefix(self) -> &'static str {
        match self {
            PiezometerRow::Crest => "PZ-C",
            PiezometerRow::Mid => "PZ-M",
            PiezometerRow::Base => "PZ-B",
        }
    }

    fn count(self) -> usize {
        match self {
            PiezometerRow::Crest => 9,
            PiezometerRow::Mid | PiezometerRow::Base => 7,
        }
    }

    fn end_margin(self) -> f32 {
        match self {
            PiezometerRow::Crest => 0.35,
            PiezometerRow::Mid | PiezometerRow::Base => 0.5,
        }
    }

    /// Row anchor in the dam's local XY plane.
    fn anchor(self, profile: &DamProfile) -> Vec2 {
        let run_up = profile.run_up();
        match self {
            PiezometerRow::Crest => Vec2::new(run_up + profile.crest_width * 0.5, profile.height + 0.12),
            PiezometerRow::Mid => Vec2::new(run_up * 0.5, profile.height * 0.5),
            PiezometerRow::Base => Vec2::new(run_up * 0.15, 0.25),
        }
    }
}

/// Decorative marker. Carries no readings.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Piezometer {
    pub name: String,
    pub row: PiezometerRow,
    /// Position across all rows; offsets the pulse phase.
    pub index: usize,
}

const PULSE_AMPLITUDE: f32 = 0.12;
const PULSE_RATE: f64 = 3.0;
const PULSE_PHASE_STEP: f64 = 0.5;

/// Uniform marker scale `t` seconds into the session.
pub fn pulse_scale(t: f64, index: usize) -> f32 {
    let phase = t * PULSE_RATE + index as f64 * PULSE_PHASE_STEP;
    1.0 + PULSE_AMPLITUDE * phase.sin() as f32
}

#[derive(Clone, Debug, PartialEq)]
pub struct PiezometerPlacement {
    pub marker: Piezometer,
    /// Relative to the dam's upstream toe.
    pub position: Vec3,
}

/// Three rows of markers spread evenly along the dam axis.
pub fn piezometer_layout(profile: &DamProfile) -> Vec<PiezometerPlacement> {
    let mut layout: Vec<_> = PiezometerRow::ALL
        .iter()
        .flat_map(|&row| row_layout(profile, row))
        .collect();
    for (index, placement) in layout.iter_mut().enumerate() {
        placement.marker.index = index;
    }
    layout
}

fn row_layout(profile: &DamProfile, row: PiezometerRow) -> Vec<PiezometerPlacement> {
    let n = row.count();
    let half = profile.length * 0.5;
    let margin = row.end_margin().min(half);
    let (z_start, z_end) = (-half + margin, half - margin);
    let anchor = row.anchor(profile);

    (0..n)
        .map(|i| {
            let t = if n == 1 { 0.5 } else { i as f32 / (n - 1) as f32 };
            PiezometerPlacement {
                marker: Piezometer {
                    name: format!("{}{:02}", row.prefix(), i + 1),
                    row,
                    index: 0,
                },
                position: Vec3::new(anchor.x, anchor.y, z_start + (z_end - z_start) * t),
            }
        })
        .collect()
}
