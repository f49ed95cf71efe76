use noise::NoiseFn;

pub const DEFAULT_OCTAVES: usize = 4;

/// Fractional part in [0, 1). Tiny negative inputs would otherwise round up to 1.
pub fn fract(x: f64) -> f64 {
    (x - x.floor()).min(1.0 - f64::EPSILON)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Sine-based lattice hash, in [0, 1).
pub fn hash(x: f64, y: f64) -> f64 {
    fract((x * 127.1 + y * 311.7).sin() * 43758.5453123)
}

/// Bilinearly smoothed value noise in [0, 1).
pub fn value_noise(x: f64, y: f64) -> f64 {
    let ix = x.floor();
    let iy = y.floor();
    let fx = x - ix;
    let fy = y - iy;

    let v00 = hash(ix, iy);
    let v10 = hash(ix + 1.0, iy);
    let v01 = hash(ix, iy + 1.0);
    let v11 = hash(ix + 1.0, iy + 1.0);

    let v0 = lerp(v00, v10, fx);
    let v1 = lerp(v01, v11, fx);

    lerp(v0, v1, fy)
}

/// Sums `octaves` layers of [`value_noise`], frequency doubling and
/// amplitude halving each layer (amplitude starts at 0.5).
pub fn fbm(x: f64, y: f64, octaves: usize) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;

    for _ in 0..octaves {
        total += amplitude * value_noise(x * frequency, y * frequency);
        frequency *= 2.0;
        amplitude *= 0.5;
    }

    total
}

/// Cubic ease between `edge0` and `edge1`.
///
/// A zero-width range is a hard step: 0 below the edge, 1 at or above it.
pub fn smooth_step(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// [`fbm`] exposed through the `noise` crate's sampling trait.
#[derive(Clone, Copy, Debug)]
pub struct ValueFbm {
    pub octaves: usize,
}

impl Default for ValueFbm {
    fn default() -> Self {
        Self {
            octaves: DEFAULT_OCTAVES,
        }
    }
}

impl NoiseFn<f64, 2> for ValueFbm {
    fn get(&self, point: [f64; 2]) -> f64 {
        fbm(point[0], point[1], self.octaves)
    }
}
