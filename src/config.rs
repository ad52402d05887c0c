// ⚙️ Generator Configuration - env (.env via dotenvy) + CLI flags
//
// Precedence: CLI flag > environment > generator default.

use crate::error::GenError;
use crate::random::Sampler;
use anyhow::Result;
use std::path::PathBuf;

pub const DEFAULT_YEAR: i32 = 2020;
pub const DEFAULT_DATA_DIR: &str = "data";

// ============================================================================
// SEED POLICY
// ============================================================================

/// How a generator seeds its RNG when no `--seed` is given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    Fixed(u64),
    /// Drawn from OS entropy, then recorded in the run manifest
    Entropy,
}

impl SeedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedPolicy::Fixed(_) => "fixed",
            SeedPolicy::Entropy => "entropy",
        }
    }
}

// ============================================================================
// VOLUME BOUNDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeBounds {
    pub min: usize,
    pub max: usize,
}

impl VolumeBounds {
    pub const fn new(min: usize, max: usize) -> Self {
        VolumeBounds { min, max }
    }

    pub fn scaled(&self, scale: f64) -> Self {
        let scale = scale.max(0.0);
        let min = (self.min as f64 * scale).round() as usize;
        let max = ((self.max as f64 * scale).round() as usize).max(min);
        VolumeBounds { min, max }
    }

    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && n <= self.max
    }

    pub fn draw(&self, rng: &mut Sampler) -> usize {
        if self.max <= self.min {
            return self.min;
        }
        rng.int(self.min as i64, self.max as i64) as usize
    }
}

// ============================================================================
// GENERATOR CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub data_dir: PathBuf,
    pub year: i32,
    pub seed_override: Option<u64>,
    /// Multiplies every volume bound
    pub scale: f64,
    pub manifest_path: PathBuf,
    /// Also write the corrupted loan-payments copy
    pub with_errors: bool,
}

impl GeneratorConfig {
    pub fn new(data_dir: impl Into<PathBuf>, year: i32) -> Self {
        let data_dir = data_dir.into();
        GeneratorConfig {
            manifest_path: data_dir.join("manifest.db"),
            data_dir,
            year,
            seed_override: None,
            scale: 1.0,
            with_errors: false,
        }
    }

    /// Reads SYNTH_* variables. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("SYNTH_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let year = env_parse("SYNTH_YEAR").unwrap_or(DEFAULT_YEAR);

        let mut config = GeneratorConfig::new(data_dir, year);
        config.seed_override = env_parse("SYNTH_SEED");
        config.scale = env_parse("SYNTH_SCALE").unwrap_or(1.0);
        if let Ok(path) = std::env::var("SYNTH_MANIFEST") {
            config.manifest_path = PathBuf::from(path);
        }
        config
    }

    /// Applies `--year`, `--seed`, `--scale`, `--data-dir` and `--with-errors`.
    /// Returns the remaining positional arguments.
    pub fn apply_args(&mut self, args: &[String]) -> Result<Vec<String>> {
        let mut positional = Vec::new();
        let mut iter = args.iter();
        let mut manifest_set = false;

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--year" => self.year = parse_flag(&mut iter, "--year")?,
                "--seed" => self.seed_override = Some(parse_flag(&mut iter, "--seed")?),
                "--scale" => self.scale = parse_flag(&mut iter, "--scale")?,
                "--data-dir" => {
                    let dir: String = parse_flag(&mut iter, "--data-dir")?;
                    self.data_dir = PathBuf::from(dir);
                }
                "--manifest" => {
                    let path: String = parse_flag(&mut iter, "--manifest")?;
                    self.manifest_path = PathBuf::from(path);
                    manifest_set = true;
                }
                "--with-errors" => self.with_errors = true,
                flag if flag.starts_with("--") => {
                    return Err(GenError::InvalidArgument(format!("unknown flag {}", flag)).into());
                }
                _ => positional.push(arg.clone()),
            }
        }

        // Manifest follows the data dir unless explicitly placed elsewhere
        if !manifest_set && std::env::var("SYNTH_MANIFEST").is_err() {
            self.manifest_path = self.data_dir.join("manifest.db");
        }

        Ok(positional)
    }

    pub fn resolve_seed(&self, default: SeedPolicy) -> u64 {
        match (self.seed_override, default) {
            (Some(seed), _) => seed,
            (None, SeedPolicy::Fixed(seed)) => seed,
            (None, SeedPolicy::Entropy) => rand::random(),
        }
    }

    pub fn bounds(&self, base: VolumeBounds) -> VolumeBounds {
        base.scaled(self.scale)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn parse_flag<'a, T: std::str::FromStr>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<T> {
    let raw = iter
        .next()
        .ok_or_else(|| GenError::InvalidArgument(format!("{} requires a value", flag)))?;
    raw.parse()
        .map_err(|_| GenError::InvalidArgument(format!("{} got invalid value '{}'", flag, raw)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_apply_args_flags_and_positionals() {
        let mut config = GeneratorConfig::new("data", 2020);
        let rest = config
            .apply_args(&args(&["banking", "customers", "--year", "2019", "--seed", "7", "--with-errors"]))
            .unwrap();

        assert_eq!(rest, vec!["banking".to_string(), "customers".to_string()]);
        assert_eq!(config.year, 2019);
        assert_eq!(config.seed_override, Some(7));
        assert!(config.with_errors);
    }

    #[test]
    fn test_apply_args_rejects_unknown_flag() {
        let mut config = GeneratorConfig::new("data", 2020);
        let err = config.apply_args(&args(&["--colour", "red"])).unwrap_err();
        assert_matches!(err.downcast_ref::<GenError>(), Some(GenError::InvalidArgument(_)));
    }

    #[test]
    fn test_apply_args_missing_value() {
        let mut config = GeneratorConfig::new("data", 2020);
        let err = config.apply_args(&args(&["--year"])).unwrap_err();
        assert!(err.to_string().contains("--year"));
    }

    #[test]
    fn test_seed_resolution() {
        let mut config = GeneratorConfig::new("data", 2020);
        assert_eq!(config.resolve_seed(SeedPolicy::Fixed(42)), 42);

        config.seed_override = Some(9);
        assert_eq!(config.resolve_seed(SeedPolicy::Fixed(42)), 9);
        assert_eq!(config.resolve_seed(SeedPolicy::Entropy), 9);
    }

    #[test]
    fn test_volume_bounds_scaling() {
        let bounds = VolumeBounds::new(15_000, 25_000).scaled(0.01);
        assert_eq!(bounds, VolumeBounds::new(150, 250));
        assert!(bounds.contains(200));
        assert!(!bounds.contains(251));

        let mut rng = Sampler::seeded(1);
        for _ in 0..50 {
            assert!(bounds.contains(bounds.draw(&mut rng)));
        }
    }
}
