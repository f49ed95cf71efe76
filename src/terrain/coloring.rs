use serde::{Deserialize, Serialize};

const MID_STOP: f32 = 0.3;
const HIGH_STOP: f32 = 0.65;

/// Four-stop height gradient, linear RGB.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightPalette {
    pub low: [f32; 3],
    pub mid: [f32; 3],
    pub high: [f32; 3],
    pub peak: [f32; 3],
}

impl Default for HeightPalette {
    fn default() -> Self {
        Self {
            low: [0.16, 0.20, 0.14],  // valley floor
            mid: [0.32, 0.33, 0.24],  // scrub
            high: [0.45, 0.39, 0.31], // bare rock
            peak: [0.86, 0.87, 0.90], // snow
        }
    }
}

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

impl HeightPalette {
    /// Color for normalized height `t`. Values outside [0, 1] take the end colors.
    pub fn color_at(&self, t: f32) -> [f32; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        if t < MID_STOP {
            mix(self.low, self.mid, t / MID_STOP)
        } else if t < HIGH_STOP {
            mix(self.mid, self.high, (t - MID_STOP) / (HIGH_STOP - MID_STOP))
        } else {
            mix(self.high, self.peak, (t - HIGH_STOP) / (1.0 - HIGH_STOP))
        }
    }

    /// Vertex color for a height in world units, normalized by `peak_height`.
    pub fn vertex_color(&self, height: f32, peak_height: f32) -> [f32; 4] {
        let [r, g, b] = self.color_at(height / peak_height);
        [r, g, b, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn band_stops_hit_palette_colors() {
        let p = HeightPalette::default();
        assert!(close(p.color_at(0.0), p.low));
        assert!(close(p.color_at(MID_STOP), p.mid));
        assert!(close(p.color_at(HIGH_STOP), p.high));
        assert!(close(p.color_at(1.0), p.peak));
    }

    #[test]
    fn bands_blend_linearly() {
        let p = HeightPalette {
            low: [0.0, 0.0, 0.0],
            mid: [1.0, 0.0, 0.0],
            high: [1.0, 1.0, 0.0],
            peak: [1.0, 1.0, 1.0],
        };
        assert!(close(p.color_at(0.15), [0.5, 0.0, 0.0]));
        assert!(close(p.color_at(0.475), [1.0, 0.5, 0.0]));
        assert!(close(p.color_at(0.825), [1.0, 1.0, 0.5]));
    }

    #[test]
    fn out_of_range_heights_clamp_instead_of_extrapolating() {
        let p = HeightPalette::default();
        assert!(close(p.color_at(-3.0), p.low));
        assert!(close(p.color_at(7.5), p.peak));
        assert!(close(p.color_at(f32::NAN), p.low));
    }

    #[test]
    fn vertex_color_normalizes_by_peak() {
        let p = HeightPalette::default();
        let [r, g, b, a] = p.vertex_color(12.0, 12.0);
        assert!(close([r, g, b], p.peak));
        assert_eq!(a, 1.0);
    }
}
