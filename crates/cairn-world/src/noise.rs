//! Seeded gradient noise and fractal combinators.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

const MAX_OCTAVES: u32 = 8;

/// Classic gradient noise over a seeded 512-entry permutation table.
///
/// Read-only after construction, so one instance can be shared across
/// worker threads.
#[derive(Clone)]
pub struct NoiseField {
    seed: u64,
    perm: [u8; 512],
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        let mut base: Vec<u8> = (0..=255u8).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        base.shuffle(&mut rng);
        let mut perm = [0u8; 512];
        for (i, p) in perm.iter_mut().enumerate() {
            *p = base[i & 255];
        }
        Self { seed, perm }
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    fn p(&self, i: usize) -> usize {
        self.perm[i & 511] as usize
    }

    #[inline]
    pub fn noise2(&self, x: f64, y: f64) -> f64 {
        self.noise3(x, y, 0.0)
    }

    /// Gradient noise in roughly [-1, 1].
    pub fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        let xf = x.floor();
        let yf = y.floor();
        let zf = z.floor();
        let xi = (xf as i64 & 255) as usize;
        let yi = (yf as i64 & 255) as usize;
        let zi = (zf as i64 & 255) as usize;
        let x = x - xf;
        let y = y - yf;
        let z = z - zf;
        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        let a = self.p(xi) + yi;
        let aa = self.p(a) + zi;
        let ab = self.p(a + 1) + zi;
        let b = self.p(xi + 1) + yi;
        let ba = self.p(b) + zi;
        let bb = self.p(b + 1) + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad(self.p(aa), x, y, z), grad(self.p(ba), x - 1.0, y, z)),
                lerp(
                    u,
                    grad(self.p(ab), x, y - 1.0, z),
                    grad(self.p(bb), x - 1.0, y - 1.0, z),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(self.p(aa + 1), x, y, z - 1.0),
                    grad(self.p(ba + 1), x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(self.p(ab + 1), x, y - 1.0, z - 1.0),
                    grad(self.p(bb + 1), x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        )
    }

    /// Fractal sum at doubling frequency, normalised by the amplitude total.
    #[inline]
    pub fn octave(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
        self.fbm(x, y, octaves, persistence, 2.0)
    }

    pub fn fbm(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        self.fractal(x, y, octaves, persistence, lacunarity, |n| n)
    }

    /// `(1 - |n|)^2` per octave; sharp crests in [0, 1].
    pub fn ridged(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
        self.fractal(x, y, octaves, persistence, 2.0, |n| {
            let r = 1.0 - n.abs();
            r * r
        })
    }

    /// `|n|` per octave; rounded bumps in [0, 1].
    pub fn billow(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
        self.fractal(x, y, octaves, persistence, 2.0, f64::abs)
    }

    /// Offsets the input by two decorrelated samples of the field.
    pub fn domain_warp(&self, x: f64, y: f64, strength: f64) -> (f64, f64) {
        let wx = self.noise2(x + 5.2, y + 1.3);
        let wy = self.noise2(x + 9.7, y + 2.8);
        (x + wx * strength, y + wy * strength)
    }

    #[inline]
    fn fractal(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
        shape: impl Fn(f64) -> f64,
    ) -> f64 {
        let octaves = octaves.clamp(1, MAX_OCTAVES);
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;
        for _ in 0..octaves {
            total += shape(self.noise2(x * frequency, y * frequency)) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }
        if max_value > 0.0 { total / max_value } else { 0.0 }
    }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_points_are_zero() {
        let n = NoiseField::new(7);
        for i in -4..4 {
            assert_eq!(n.noise3(i as f64, (i * 3) as f64, 2.0), 0.0);
        }
    }

    #[test]
    fn fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
    }

    #[test]
    fn permutation_is_a_doubled_bijection() {
        let n = NoiseField::new(99);
        let mut seen = [false; 256];
        for i in 0..256 {
            seen[n.perm[i] as usize] = true;
            assert_eq!(n.perm[i], n.perm[i + 256]);
        }
        assert!(seen.iter().all(|s| *s));
    }
}
