// ✈️ Fleet - the seven aircraft the schedule rotates

use crate::airline::check_year;
use crate::airline::routes::RouteType;
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::pipeline::RunOutcome;
use crate::random::Sampler;
use crate::table::{write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const GENERATOR: &str = "airline/fleet";
pub const SEED: SeedPolicy = SeedPolicy::Fixed(42);

pub const FLEET_SIZE: usize = 7;

const CAPACITIES: [u32; 7] = [150, 180, 200, 220, 250, 280, 300];

/// Narrow-bodies and turboprops, flown on domestic routes
pub const DOMESTIC_MODELS: [&str; 5] = [
    "Embraer E190",
    "Bombardier Q400",
    "Boeing 737-800",
    "Boeing 737-900",
    "Airbus A321neo",
];

/// Wide-bodies, flown on regional and international routes
pub const INTERNATIONAL_MODELS: [&str; 2] = ["Boeing 777-300ER", "Airbus A330-300"];

/// Whether a model may be scheduled on a route of this type
pub fn suits(model: &str, route_type: RouteType) -> bool {
    match route_type {
        RouteType::Domestic => DOMESTIC_MODELS.contains(&model),
        RouteType::Regional | RouteType::International => INTERNATIONAL_MODELS.contains(&model),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub flight_id: String,
    pub flight_name: String,
    pub date_added: NaiveDate,
    pub capacity: u32,
    /// Domestic | International
    pub flight_type: String,
    pub aircraft_model: String,
    pub aircraft_registration: String,
}

/// Two letters and three digits, e.g. `KQ204`
fn flight_name(rng: &mut Sampler) -> String {
    let (a, b) = (rng.letter(), rng.letter());
    format!("{}{}{}", a, b, rng.digits(3))
}

/// `N` + three digits + two letters
fn registration(rng: &mut Sampler) -> String {
    let digits = rng.digits(3);
    let (a, b) = (rng.letter(), rng.letter());
    format!("N{}{}{}", digits, a, b)
}

/// The fleet in service at the start of `year`. Always carries at least
/// one domestic and one wide-body model so every route type can be flown.
pub fn generate_fleet(rng: &mut Sampler, year: i32) -> Vec<Aircraft> {
    let models: Vec<&str> = DOMESTIC_MODELS.iter().chain(INTERNATIONAL_MODELS.iter()).copied().collect();
    let first_delivery = NaiveDate::from_ymd_opt(2009, 1, 1).unwrap_or_default();
    let year_start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(first_delivery);

    let mut fleet: Vec<Aircraft> = (0..FLEET_SIZE)
        .map(|i| {
            let model = *rng.pick(&models);
            Aircraft {
                flight_id: format!("FLT{:04}", i + 1),
                flight_name: flight_name(rng),
                date_added: rng.date_between(first_delivery, year_start),
                capacity: *rng.pick(&CAPACITIES),
                flight_type: String::new(),
                aircraft_model: model.to_string(),
                aircraft_registration: registration(rng),
            }
        })
        .collect();

    if !fleet.iter().any(|a| DOMESTIC_MODELS.contains(&a.aircraft_model.as_str())) {
        fleet[0].aircraft_model = rng.pick(&DOMESTIC_MODELS).to_string();
    }
    if !fleet.iter().any(|a| INTERNATIONAL_MODELS.contains(&a.aircraft_model.as_str())) {
        fleet[FLEET_SIZE - 1].aircraft_model = rng.pick(&INTERNATIONAL_MODELS).to_string();
    }
    for aircraft in &mut fleet {
        aircraft.flight_type = if DOMESTIC_MODELS.contains(&aircraft.aircraft_model.as_str()) {
            "Domestic"
        } else {
            "International"
        }
        .to_string();
    }

    fleet
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    check_year(GENERATOR, config.year)?;
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("✈️  Generating fleet for {}...", config.year);
    let mut rng = Sampler::seeded(seed);
    let fleet = generate_fleet(&mut rng, config.year);

    let path = layout.path(Domain::Airline, "fleet", Some(config.year));
    let rows = write_table(&path, &fleet)?;
    println!("✓ Saved {} aircraft to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn create_test_fleet(year: i32) -> Vec<Aircraft> {
        generate_fleet(&mut Sampler::seeded(42), year)
    }

    #[test]
    fn test_fleet_shape() {
        let fleet = create_test_fleet(2015);
        assert_eq!(fleet.len(), FLEET_SIZE);
        assert_eq!(fleet[0].flight_id, "FLT0001");
        assert_eq!(fleet[6].flight_id, "FLT0007");

        for aircraft in &fleet {
            assert!(CAPACITIES.contains(&aircraft.capacity));
            assert!(aircraft.date_added <= NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
            assert_eq!(aircraft.aircraft_registration.len(), 6);
            assert!(aircraft.aircraft_registration.starts_with('N'));
        }
        println!("✅ Fleet shape PASSED");
    }

    #[test]
    fn test_fleet_covers_both_route_families() {
        for seed in 0..30 {
            let fleet = generate_fleet(&mut Sampler::seeded(seed), 2016);
            assert!(fleet.iter().any(|a| suits(&a.aircraft_model, RouteType::Domestic)));
            assert!(fleet.iter().any(|a| suits(&a.aircraft_model, RouteType::International)));
        }
    }
}
