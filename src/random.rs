// 🎲 Sampler - seeded RNG with the distributions the generators draw from
//
// Every generator owns exactly one Sampler, so a fixed seed reproduces a
// table byte-for-byte. Bad distribution parameters degrade to a
// deterministic value instead of panicking.

use chrono::{Duration, NaiveDate};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Binomial, Exp, Gamma, LogNormal, Normal, Poisson, Weibull};

pub struct Sampler {
    rng: StdRng,
    seed: u64,
}

impl Sampler {
    pub fn seeded(seed: u64) -> Self {
        Sampler {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    // ========================================================================
    // UNIFORM DRAWS
    // ========================================================================

    /// Uniform float in [lo, hi)
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Uniform integer in [lo, hi], both inclusive
    pub fn int(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform pick. Panics on an empty slice, like slice indexing.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.gen_range(0..items.len())]
    }

    /// Weighted pick over (item, weight) pairs. Invalid weights fall back to the first item.
    pub fn weighted<'a, T>(&mut self, items: &'a [(T, f64)]) -> &'a T {
        match WeightedIndex::new(items.iter().map(|(_, w)| *w)) {
            Ok(dist) => &items[dist.sample(&mut self.rng)].0,
            Err(_) => &items[0].0,
        }
    }

    /// Weighted pick returning the index into `weights`
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        match WeightedIndex::new(weights) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => 0,
        }
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Sample `k` distinct elements, preserving none of the input order
    pub fn sample<T: Clone>(&mut self, items: &[T], k: usize) -> Vec<T> {
        items
            .choose_multiple(&mut self.rng, k.min(items.len()))
            .cloned()
            .collect()
    }

    /// String of `n` random decimal digits
    pub fn digits(&mut self, n: usize) -> String {
        (0..n)
            .map(|_| char::from(b'0' + self.rng.gen_range(0..10u8)))
            .collect()
    }

    /// Random uppercase ASCII letter
    pub fn letter(&mut self) -> char {
        char::from(b'A' + self.rng.gen_range(0..26u8))
    }

    /// Uniform date in [start, end], inclusive
    pub fn date_between(&mut self, start: NaiveDate, end: NaiveDate) -> NaiveDate {
        let span = (end - start).num_days();
        if span <= 0 {
            return start;
        }
        start + Duration::days(self.int(0, span))
    }

    // ========================================================================
    // CONTINUOUS DISTRIBUTIONS
    // ========================================================================

    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        Normal::new(mean, std_dev)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or(mean)
    }

    /// Log-normal with parameters of the underlying normal
    pub fn lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        LogNormal::new(mu, sigma)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or_else(|_| mu.exp())
    }

    pub fn gamma(&mut self, shape: f64, scale: f64) -> f64 {
        Gamma::new(shape, scale)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or(shape * scale)
    }

    pub fn beta(&mut self, alpha: f64, beta: f64) -> f64 {
        Beta::new(alpha, beta)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or_else(|_| alpha / (alpha + beta))
    }

    /// Exponential parameterized by its mean
    pub fn exponential(&mut self, mean: f64) -> f64 {
        if mean <= 0.0 {
            return 0.0;
        }
        Exp::new(1.0 / mean)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or(mean)
    }

    /// Weibull with unit scale
    pub fn weibull(&mut self, shape: f64) -> f64 {
        Weibull::new(1.0, shape)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or(1.0)
    }

    // ========================================================================
    // DISCRETE DISTRIBUTIONS
    // ========================================================================

    pub fn poisson(&mut self, lambda: f64) -> u32 {
        if lambda <= 0.0 {
            return 0;
        }
        Poisson::new(lambda)
            .map(|d| {
                let draw: f64 = d.sample(&mut self.rng);
                draw as u32
            })
            .unwrap_or(lambda as u32)
    }

    pub fn binomial(&mut self, n: u64, p: f64) -> u64 {
        Binomial::new(n, p.clamp(0.0, 1.0))
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or(0)
    }
}

/// Round to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = Sampler::seeded(42);
        let mut b = Sampler::seeded(42);

        let xs: Vec<f64> = (0..20).map(|_| a.normal(0.0, 1.0)).collect();
        let ys: Vec<f64> = (0..20).map(|_| b.normal(0.0, 1.0)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_int_inclusive_and_degenerate() {
        let mut rng = Sampler::seeded(3);
        for _ in 0..200 {
            let v = rng.int(1, 3);
            assert!((1..=3).contains(&v));
        }
        assert_eq!(rng.int(5, 5), 5);
        assert_eq!(rng.int(9, 2), 9);
    }

    #[test]
    fn test_weighted_skips_zero_weights() {
        let mut rng = Sampler::seeded(11);
        let items = [("never", 0.0), ("always", 1.0)];
        for _ in 0..100 {
            assert_eq!(*rng.weighted(&items), "always");
        }

        let broken = [("first", -1.0), ("second", 1.0)];
        assert_eq!(*rng.weighted(&broken), "first");
    }

    #[test]
    fn test_invalid_parameters_do_not_panic() {
        let mut rng = Sampler::seeded(5);
        assert_eq!(rng.normal(10.0, -1.0), 10.0);
        assert_eq!(rng.exponential(0.0), 0.0);
        assert_eq!(rng.poisson(-2.0), 0);
        assert!(rng.beta(0.0, 1.0).is_finite());
    }

    #[test]
    fn test_date_between_bounds() {
        let mut rng = Sampler::seeded(8);
        let start = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        for _ in 0..100 {
            let d = rng.date_between(start, end);
            assert!(d >= start && d <= end);
        }
        assert_eq!(rng.date_between(end, start), end);
    }

    #[test]
    fn test_digits_and_round() {
        let mut rng = Sampler::seeded(1);
        let d = rng.digits(10);
        assert_eq!(d.len(), 10);
        assert!(d.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(round_to(12.3456, 2), 12.35);
    }
}
