use cairn_world::NoiseField;
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    -10_000.0f64..10_000.0
}

#[test]
fn same_seed_same_field() {
    let a = NoiseField::new(12345);
    let b = NoiseField::new(12345);
    for i in 0..200 {
        let x = i as f64 * 0.137 - 7.0;
        let y = i as f64 * -0.291 + 3.0;
        assert_eq!(a.noise2(x, y).to_bits(), b.noise2(x, y).to_bits());
        assert_eq!(a.noise3(x, y, 0.5).to_bits(), b.noise3(x, y, 0.5).to_bits());
    }
}

#[test]
fn different_seeds_differ_somewhere() {
    let a = NoiseField::new(1);
    let b = NoiseField::new(2);
    let differs = (0..100).any(|i| {
        let x = i as f64 * 0.37 + 0.11;
        a.noise2(x, x * 0.5) != b.noise2(x, x * 0.5)
    });
    assert!(differs);
}

#[test]
fn field_is_not_constant() {
    let n = NoiseField::new(42);
    let (mut lo, mut hi) = (f64::MAX, f64::MIN);
    for i in 0..1000 {
        let v = n.noise2(i as f64 * 0.173, i as f64 * 0.071);
        lo = lo.min(v);
        hi = hi.max(v);
    }
    assert!(hi - lo > 0.5);
}

proptest! {
    #[test]
    fn noise2_is_deterministic(seed in any::<u64>(), x in coord(), y in coord()) {
        let a = NoiseField::new(seed);
        prop_assert_eq!(a.noise2(x, y).to_bits(), a.noise2(x, y).to_bits());
        let b = NoiseField::new(seed);
        prop_assert_eq!(a.noise2(x, y).to_bits(), b.noise2(x, y).to_bits());
    }

    #[test]
    fn octave_is_normalised(seed in 0u64..1000, x in coord(), y in coord(), n in 1u32..=8, p in 0.1f64..=1.0) {
        let f = NoiseField::new(seed);
        let v = f.octave(x, y, n, p);
        prop_assert!((-1.05..=1.05).contains(&v), "octave {} out of range", v);
    }

    #[test]
    fn octave_count_is_clamped(seed in 0u64..1000, x in coord(), y in coord()) {
        let f = NoiseField::new(seed);
        prop_assert_eq!(f.octave(x, y, 0, 0.5).to_bits(), f.octave(x, y, 1, 0.5).to_bits());
        prop_assert_eq!(f.octave(x, y, 20, 0.5).to_bits(), f.octave(x, y, 8, 0.5).to_bits());
    }

    #[test]
    fn ridged_and_billow_are_unit_range(seed in 0u64..1000, x in coord(), y in coord(), n in 1u32..=8) {
        let f = NoiseField::new(seed);
        let r = f.ridged(x, y, n, 0.5);
        let b = f.billow(x, y, n, 0.5);
        prop_assert!((0.0..=1.0 + 1e-9).contains(&r));
        prop_assert!((0.0..=1.05).contains(&b));
    }

    #[test]
    fn fbm_with_lacunarity_two_matches_octave(seed in 0u64..1000, x in coord(), y in coord(), n in 1u32..=8) {
        let f = NoiseField::new(seed);
        prop_assert_eq!(f.fbm(x, y, n, 0.5, 2.0).to_bits(), f.octave(x, y, n, 0.5).to_bits());
    }

    #[test]
    fn domain_warp_is_bounded(seed in 0u64..1000, x in coord(), y in coord(), s in 0.0f64..50.0) {
        let f = NoiseField::new(seed);
        let (wx, wy) = f.domain_warp(x, y, s);
        prop_assert!((wx - x).abs() <= s * 1.05 + 1e-9);
        prop_assert!((wy - y).abs() <= s * 1.05 + 1e-9);
    }
}
