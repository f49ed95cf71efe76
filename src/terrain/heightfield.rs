use crate::terrain::noise::smooth_step;

/// Square grid of `(segments + 1)²` heights, row-major (rows run along Z).
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    segments: u32,
    heights: Vec<f32>,
}

impl HeightGrid {
    /// Fills the grid by calling `f(column, row)` for every vertex.
    pub fn from_fn(segments: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let side = segments + 1;
        let mut heights = Vec::with_capacity(side as usize * side as usize);
        for row in 0..side {
            for col in 0..side {
                heights.push(f(col, row));
            }
        }
        Self { segments, heights }
    }

    #[cfg(test)]
    pub fn flat(segments: u32, height: f32) -> Self {
        Self::from_fn(segments, |_, _| height)
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Vertices per side.
    pub fn side(&self) -> usize {
        self.segments as usize + 1
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.heights[row * self.side() + col]
    }

    /// Box blur over the `(2k+1)²` window, averaging only in-bounds cells.
    /// `k = 0` leaves the grid untouched.
    pub fn smooth(&mut self, kernel_radius: u32) {
        if kernel_radius == 0 {
            return;
        }

        let side = self.side();
        let k = kernel_radius as usize;
        let mut smoothed = Vec::with_capacity(self.heights.len());

        for row in 0..side {
            let row_lo = row.saturating_sub(k);
            let row_hi = (row + k).min(side - 1);
            for col in 0..side {
                let col_lo = col.saturating_sub(k);
                let col_hi = (col + k).min(side - 1);

                let mut sum = 0.0;
                for r in row_lo..=row_hi {
                    let start = r * side;
                    sum += self.heights[start + col_lo..=start + col_hi].iter().sum::<f32>();
                }
                let count = (row_hi - row_lo + 1) * (col_hi - col_lo + 1);
                smoothed.push(sum / count as f32);
            }
        }

        self.heights = smoothed;
    }

    /// Scales heights toward zero within `distance` (normalized) of any border.
    pub fn apply_edge_fade(&mut self, distance: f32) {
        let side = self.side();
        let segments = self.segments as f32;

        for row in 0..side {
            let v = row as f32 / segments;
            for col in 0..side {
                let u = col as f32 / segments;
                let factor = edge_fade_factor(u, v, distance);
                self.heights[row * side + col] *= factor;
            }
        }
    }
}

/// 1 in the interior, easing to 0 on the border ring.
pub fn edge_fade_factor(u: f32, v: f32, distance: f32) -> f32 {
    let min_dist = u.min(1.0 - u).min(v).min(1.0 - v);
    if min_dist > distance {
        1.0
    } else {
        smooth_step(0.0, 1.0, min_dist / distance)
    }
}
