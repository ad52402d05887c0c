// 🗺️ Routes - the network of airport pairs flown from a given year
//
// 2013: South Africa only. 2014: SA plus Zimbabwe, Kenya and Nigeria,
// without the SA-SA pairs already opened. 2015 on: every airport.
// A year's file only holds routes that no earlier year already opened.

use crate::airline::{check_year, BASE_YEAR};
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::identity::SOUTH_AFRICA;
use crate::pipeline::RunOutcome;
use crate::random::round_to;
use crate::table::{read_or_empty, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const GENERATOR: &str = "airline/routes";
/// Routes are fully determined by the year
pub const SEED: SeedPolicy = SeedPolicy::Fixed(0);

const EARTH_RADIUS_KM: f64 = 6371.0;
const CRUISE_KMH: f64 = 800.0;
const TAXI_MINUTES: f64 = 30.0;

// ============================================================================
// AIRPORTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Airport {
    pub iata: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl Airport {
    pub fn is_domestic(&self) -> bool {
        self.country == SOUTH_AFRICA
    }

    pub fn is_african(&self) -> bool {
        matches!(self.country, SOUTH_AFRICA | "Zimbabwe" | "Kenya" | "Nigeria")
    }
}

const fn airport(
    iata: &'static str,
    name: &'static str,
    city: &'static str,
    country: &'static str,
    latitude: f64,
    longitude: f64,
) -> Airport {
    Airport { iata, name, city, country, latitude, longitude }
}

pub const AIRPORTS: [Airport; 15] = [
    airport("JNB", "O.R. Tambo International Airport", "Johannesburg", SOUTH_AFRICA, -26.1392, 28.2460),
    airport("CPT", "Cape Town International Airport", "Cape Town", SOUTH_AFRICA, -33.9648, 18.6017),
    airport("DUR", "King Shaka International Airport", "Durban", SOUTH_AFRICA, -29.6145, 31.1198),
    airport("PLZ", "Port Elizabeth International Airport", "Port Elizabeth", SOUTH_AFRICA, -33.9849, 25.6173),
    airport("GRJ", "George Airport", "George", SOUTH_AFRICA, -34.0056, 22.3789),
    airport("HRE", "Robert Gabriel Mugabe International Airport", "Harare", "Zimbabwe", -17.9318, 31.0928),
    airport("NBO", "Jomo Kenyatta International Airport", "Nairobi", "Kenya", -1.3192, 36.9278),
    airport("LOS", "Murtala Muhammed International Airport", "Lagos", "Nigeria", 6.5774, 3.3210),
    airport("LHR", "Heathrow Airport", "London", "United Kingdom", 51.4700, -0.4543),
    airport("DXB", "Dubai International Airport", "Dubai", "United Arab Emirates", 25.2528, 55.3644),
    airport("JFK", "John F. Kennedy International Airport", "New York", "United States", 40.6398, -73.7789),
    airport("SYD", "Sydney Kingsford Smith Airport", "Sydney", "Australia", -33.9461, 151.1772),
    airport("FRA", "Frankfurt Airport", "Frankfurt", "Germany", 50.0333, 8.5706),
    airport("CDG", "Charles de Gaulle Airport", "Paris", "France", 49.0097, 2.5479),
    airport("HKG", "Hong Kong International Airport", "Hong Kong", "China", 22.3080, 113.9185),
];

pub fn find_airport(iata: &str) -> Option<&'static Airport> {
    AIRPORTS.iter().find(|a| a.iata == iata)
}

/// Published distance (km) and block time (min) for the busiest domestic pairs
const KNOWN_ROUTES: [(&str, &str, f64, u32); 3] = [
    ("JNB", "CPT", 1264.4, 105),
    ("JNB", "DUR", 480.0, 45),
    ("CPT", "DUR", 1200.0, 100),
];

fn known_route(a: &str, b: &str) -> Option<(f64, u32)> {
    KNOWN_ROUTES
        .iter()
        .find(|(x, y, _, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, km, min)| (*km, *min))
}

/// Great-circle distance in km
pub fn haversine_km(a: &Airport, b: &Airport) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Taxi/climb allowance plus cruise time
pub fn flight_minutes(distance_km: f64) -> u32 {
    (TAXI_MINUTES + distance_km / CRUISE_KMH * 60.0).round() as u32
}

/// Airports open for a year
pub fn eligible_airports(year: i32) -> Vec<&'static Airport> {
    AIRPORTS
        .iter()
        .filter(|a| {
            if year <= BASE_YEAR {
                a.is_domestic()
            } else if year == BASE_YEAR + 1 {
                a.is_african()
            } else {
                true
            }
        })
        .collect()
}

/// Same id for both directions: `RP_{A}_{B}` with the codes sorted
pub fn route_pair_id(origin: &str, destination: &str) -> String {
    let (a, b) = if origin <= destination { (origin, destination) } else { (destination, origin) };
    format!("RP_{}_{}", a, b)
}

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteType {
    Domestic,
    Regional,
    International,
}

impl RouteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Domestic => "Domestic",
            RouteType::Regional => "Regional",
            RouteType::International => "International",
        }
    }

    pub fn between(a: &Airport, b: &Airport) -> RouteType {
        if a.is_domestic() && b.is_domestic() {
            RouteType::Domestic
        } else if a.is_african() && b.is_african() {
            RouteType::Regional
        } else {
            RouteType::International
        }
    }

    /// Economy base fare in ZAR: a fixed component plus a per-km rate
    pub fn base_fare(&self, distance_km: f64) -> f64 {
        let (fixed, per_km) = match self {
            RouteType::Domestic => (450.0, 1.10),
            RouteType::Regional => (900.0, 1.40),
            RouteType::International => (2500.0, 0.90),
        };
        round_to(fixed + per_km * distance_km, 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub route_pair_id: String,
    pub date_effective: NaiveDate,
    pub origin_airport: String,
    pub origin_airport_name: String,
    pub origin_city: String,
    pub origin_country: String,
    pub destination_airport: String,
    pub destination_airport_name: String,
    pub destination_city: String,
    pub destination_country: String,
    pub distance_km: f64,
    pub estimated_duration_min: u32,
    pub estimated_duration_hrs: String,
    /// Domestic | International (by country)
    pub flight_category: String,
    pub region: String,
    pub route_type: RouteType,
    pub base_price_zar: f64,
}

// ============================================================================
// GENERATION
// ============================================================================

/// New routes for `year`, skipping (origin, destination) pairs in `existing`
pub fn generate_routes(year: i32, existing: &HashSet<(String, String)>) -> Vec<Route> {
    let airports = eligible_airports(year);
    let mut routes = Vec::new();

    for origin in &airports {
        for destination in &airports {
            if origin.iata == destination.iata {
                continue;
            }
            if year == BASE_YEAR + 1 && origin.is_domestic() && destination.is_domestic() {
                continue;
            }
            if existing.contains(&(origin.iata.to_string(), destination.iata.to_string())) {
                continue;
            }

            let (distance_km, minutes) = match known_route(origin.iata, destination.iata) {
                Some(known) => known,
                None => {
                    let km = haversine_km(origin, destination);
                    (km, flight_minutes(km))
                }
            };
            let route_type = RouteType::between(origin, destination);

            routes.push(Route {
                route_id: format!("RTE{}{:04}", year, routes.len() + 1),
                route_pair_id: route_pair_id(origin.iata, destination.iata),
                date_effective: NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default(),
                origin_airport: origin.iata.to_string(),
                origin_airport_name: origin.name.to_string(),
                origin_city: origin.city.to_string(),
                origin_country: origin.country.to_string(),
                destination_airport: destination.iata.to_string(),
                destination_airport_name: destination.name.to_string(),
                destination_city: destination.city.to_string(),
                destination_country: destination.country.to_string(),
                distance_km: round_to(distance_km, 1),
                estimated_duration_min: minutes,
                estimated_duration_hrs: format!("{}h {}m", minutes / 60, minutes % 60),
                flight_category: if origin.country == destination.country { "Domestic" } else { "International" }
                    .to_string(),
                region: if origin.is_african() && destination.is_african() { "Africa" } else { "Intercontinental" }
                    .to_string(),
                route_type,
                base_price_zar: route_type.base_fare(distance_km),
            });
        }
    }

    routes
}

/// Every route opened up to and including `year`
pub fn load_network(layout: &DataLayout, year: i32) -> Result<Vec<Route>> {
    let mut routes = Vec::new();
    for y in BASE_YEAR..=year {
        routes.extend(read_or_empty::<Route>(&layout.path(Domain::Airline, "routes", Some(y)))?);
    }
    Ok(routes)
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    check_year(GENERATOR, config.year)?;
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("🗺️  Generating routes for {}...", config.year);
    let existing: HashSet<(String, String)> = load_network(&layout, config.year - 1)?
        .into_iter()
        .map(|r| (r.origin_airport, r.destination_airport))
        .collect();
    if !existing.is_empty() {
        println!("   📂 {} routes already open from earlier years", existing.len());
    }

    let routes = generate_routes(config.year, &existing);
    if routes.is_empty() {
        tracing::info!(year = config.year, "no new routes this year");
    }

    let path = layout.path(Domain::Airline, "routes", Some(config.year));
    let rows = write_table(&path, &routes)?;
    println!("✓ Saved {} routes to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_pair<'a>(routes: &'a [Route], o: &str, d: &str) -> Option<&'a Route> {
        routes.iter().find(|r| r.origin_airport == o && r.destination_airport == d)
    }

    #[test]
    fn test_base_year_is_domestic_only() {
        let routes = generate_routes(BASE_YEAR, &HashSet::new());
        assert_eq!(routes.len(), 20, "5 SA airports, both directions");
        assert!(routes.iter().all(|r| r.route_type == RouteType::Domestic));
        assert_eq!(routes[0].route_id, "RTE20130001");
        println!("✅ Base year network PASSED");
    }

    #[test]
    fn test_second_year_adds_african_routes_only() {
        let routes = generate_routes(BASE_YEAR + 1, &HashSet::new());
        // 8 airports → 56 directed pairs, minus the 20 SA-SA pairs
        assert_eq!(routes.len(), 36);
        assert!(routes.iter().all(|r| r.route_type == RouteType::Regional));
        assert!(by_pair(&routes, "JNB", "CPT").is_none());
    }

    #[test]
    fn test_existing_routes_are_skipped() {
        let mut existing = HashSet::new();
        existing.insert(("JNB".to_string(), "LHR".to_string()));
        let routes = generate_routes(2016, &existing);
        assert!(by_pair(&routes, "JNB", "LHR").is_none());
        assert!(by_pair(&routes, "LHR", "JNB").is_some());
        assert_eq!(routes.len(), 15 * 14 - 1);
    }

    #[test]
    fn test_distances_and_pair_ids() {
        let routes = generate_routes(BASE_YEAR, &HashSet::new());
        let jnb_cpt = by_pair(&routes, "JNB", "CPT").unwrap();
        let cpt_jnb = by_pair(&routes, "CPT", "JNB").unwrap();
        assert_eq!(jnb_cpt.distance_km, 1264.4);
        assert_eq!(jnb_cpt.estimated_duration_min, 105);
        assert_eq!(jnb_cpt.estimated_duration_hrs, "1h 45m");
        assert_eq!(jnb_cpt.route_pair_id, cpt_jnb.route_pair_id);
        assert_eq!(jnb_cpt.route_pair_id, "RP_CPT_JNB");

        let jnb = find_airport("JNB").unwrap();
        let lhr = find_airport("LHR").unwrap();
        let km = haversine_km(jnb, lhr);
        assert!((8_800.0..9_300.0).contains(&km), "JNB-LHR {} km", km);
        assert_eq!(flight_minutes(800.0), 90);
        assert_eq!(RouteType::between(jnb, lhr), RouteType::International);
    }
}
