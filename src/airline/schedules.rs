// 🕑 Flight Schedules - a daily rotation of the fleet over the route network
//
// Every aircraft starts the year at JNB. Each morning an aircraft sitting at
// an airport can be given one departure from that airport, and flies the
// reverse leg the same day when a slot opens after its layover. Captains
// move with the aircraft they fly and fly at most once a day.

use crate::airline::check_year;
use crate::airline::fleet::{self, Aircraft};
use crate::airline::routes::{find_airport, load_network, Route, RouteType};
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::error::GenError;
use crate::pipeline::RunOutcome;
use crate::random::Sampler;
use crate::table::{read_table, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const GENERATOR: &str = "airline/schedules";
pub const SEED: SeedPolicy = SeedPolicy::Fixed(42);

pub const HOME_BASE: &str = "JNB";
const CANCELLATION_RATE: f64 = 0.03;
const ON_TIME_RATE: f64 = 0.75;
pub const CREW_DELAY: &str = "Crew Delay";

const CANCELLATION_REASONS: [&str; 10] = [
    "Weather",
    "Technical Issue",
    "Air Traffic Control",
    CREW_DELAY,
    "Security Issue",
    "Operational Delay",
    "Aircraft Maintenance",
    "Fueling Delay",
    "Passenger Issue",
    "Ground Handling Delay",
];

/// Starting crew base of each captain
const CAPTAINS: [(&str, &str); 10] = [
    ("John Smith", "JNB"),
    ("Sarah Johnson", "CPT"),
    ("Michael Chen", "JNB"),
    ("Emily Davis", "DUR"),
    ("David Wilson", "JNB"),
    ("Aisha Patel", "CPT"),
    ("Thomas Brown", "HRE"),
    ("Linda Mwangi", "NBO"),
    ("James Taylor", "JNB"),
    ("Sophie Müller", "FRA"),
];

// ============================================================================
// SLOTS AND BAYS
// ============================================================================

const DOMESTIC_SLOTS: [u32; 5] = [6, 10, 13, 18, 20];
const REGIONAL_SLOTS: [u32; 3] = [7, 12, 17];
const INTERNATIONAL_SLOTS: [u32; 3] = [8, 14, 22];

/// Departure hours offered at an airport
pub fn slot_hours(iata: &str) -> &'static [u32] {
    match find_airport(iata) {
        Some(a) if a.is_domestic() => &DOMESTIC_SLOTS,
        Some(a) if a.is_african() => &REGIONAL_SLOTS,
        _ => &INTERNATIONAL_SLOTS,
    }
}

fn bay(rng: &mut Sampler, route_type: RouteType) -> String {
    let apron = match route_type {
        RouteType::Domestic => 'A',
        RouteType::Regional => 'B',
        RouteType::International => 'C',
    };
    format!("{}{}", apron, rng.int(1, 10))
}

fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default())
}

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSchedule {
    pub planning_id: String,
    pub flight_id: String,
    pub route_id: String,
    pub scheduled_departure: NaiveDateTime,
    pub actual_departure: Option<NaiveDateTime>,
    pub scheduled_arrival: NaiveDateTime,
    pub actual_arrival: Option<NaiveDateTime>,
    pub captain: Option<String>,
    pub departure_bay: String,
    pub cancellation_note: Option<String>,
    pub base_price_zar: f64,
    pub is_return: bool,
}

impl FlightSchedule {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_note.is_some()
    }
}

struct Captain {
    name: &'static str,
    location: String,
}

// ============================================================================
// GENERATOR
// ============================================================================

pub struct ScheduleGenerator {
    year: i32,
    rng: Sampler,
    counter: usize,
    captains: Vec<Captain>,
    /// Where each aircraft currently sits
    locations: HashMap<String, String>,
    /// Earliest time each aircraft may depart again
    ready_at: HashMap<String, NaiveDateTime>,
}

impl ScheduleGenerator {
    pub fn new(year: i32, seed: u64) -> Self {
        ScheduleGenerator {
            year,
            rng: Sampler::seeded(seed),
            counter: 0,
            captains: CAPTAINS
                .iter()
                .map(|&(name, base)| Captain { name, location: base.to_string() })
                .collect(),
            locations: HashMap::new(),
            ready_at: HashMap::new(),
        }
    }

    pub fn generate(&mut self, routes: &[Route], fleet: &[Aircraft]) -> Vec<FlightSchedule> {
        for aircraft in fleet {
            self.locations.insert(aircraft.flight_id.clone(), HOME_BASE.to_string());
        }

        let mut origins: Vec<&str> = Vec::new();
        let mut by_origin: HashMap<&str, Vec<&Route>> = HashMap::new();
        for route in routes {
            if !by_origin.contains_key(route.origin_airport.as_str()) {
                origins.push(route.origin_airport.as_str());
            }
            by_origin.entry(route.origin_airport.as_str()).or_default().push(route);
        }

        let mut schedules = Vec::new();
        let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(self.year, 1, 1),
            NaiveDate::from_ymd_opt(self.year, 12, 31),
        ) else {
            return schedules;
        };

        for day in first.iter_days().take_while(|d| *d <= last) {
            let mut crew_used: HashSet<&'static str> = HashSet::new();
            let midnight = at(day, 0);

            for origin in &origins {
                let Some(origin_routes) = by_origin.get(origin) else {
                    continue;
                };
                for &hour in slot_hours(origin) {
                    let candidates: Vec<(&Route, &Aircraft)> = origin_routes
                        .iter()
                        .filter(|r| r.date_effective <= day)
                        .flat_map(|r| fleet.iter().map(move |a| (*r, a)))
                        .filter(|(r, a)| self.can_fly(a, r, day, midnight))
                        .collect();
                    if candidates.is_empty() {
                        continue;
                    }
                    let (route, aircraft) = *self.rng.pick(&candidates);

                    let leg = self.fly(route, aircraft, at(day, hour), false, &mut crew_used);
                    let landed = leg.actual_arrival.filter(|_| !leg.is_cancelled());
                    schedules.push(leg);

                    let Some(arrival) = landed else {
                        continue;
                    };
                    let ready = self.park(aircraft, &route.destination_airport, arrival);

                    let Some(back) = reverse_route(routes, route, day) else {
                        continue;
                    };
                    let Some(departure) = return_slot(&back.origin_airport, day, ready) else {
                        continue;
                    };
                    let leg = self.fly(back, aircraft, departure, true, &mut crew_used);
                    let landed = leg.actual_arrival.filter(|_| !leg.is_cancelled());
                    schedules.push(leg);
                    if let Some(arrival) = landed {
                        self.park(aircraft, &back.destination_airport, arrival);
                    }
                }
            }
        }

        tracing::info!(
            year = self.year,
            flights = schedules.len(),
            cancelled = schedules.iter().filter(|s| s.is_cancelled()).count(),
            "schedule generated"
        );
        schedules
    }

    fn can_fly(&self, aircraft: &Aircraft, route: &Route, day: NaiveDate, midnight: NaiveDateTime) -> bool {
        fleet::suits(&aircraft.aircraft_model, route.route_type)
            && aircraft.date_added <= day
            && self.locations.get(&aircraft.flight_id).map(String::as_str) == Some(route.origin_airport.as_str())
            && self.ready_at.get(&aircraft.flight_id).map_or(true, |t| *t <= midnight)
    }

    /// Moves the aircraft and starts its layover. Returns when it can fly again.
    fn park(&mut self, aircraft: &Aircraft, airport: &str, arrival: NaiveDateTime) -> NaiveDateTime {
        let ready = arrival + Duration::minutes(self.rng.int(120, 240));
        self.ready_at.insert(aircraft.flight_id.clone(), ready);
        self.locations.insert(aircraft.flight_id.clone(), airport.to_string());
        ready
    }

    fn fly(
        &mut self,
        route: &Route,
        aircraft: &Aircraft,
        departure: NaiveDateTime,
        is_return: bool,
        crew_used: &mut HashSet<&'static str>,
    ) -> FlightSchedule {
        self.counter += 1;
        let duration = Duration::minutes(route.estimated_duration_min as i64);

        let mut cancellation_note = None;
        let mut actual = None;
        if self.rng.binomial(1, CANCELLATION_RATE) == 1 {
            cancellation_note = Some(self.rng.pick(&CANCELLATION_REASONS).to_string());
        } else {
            actual = Some(self.actual_times(departure, duration));
        }

        let captain = self.assign_captain(&route.origin_airport, &route.destination_airport, crew_used);
        if captain.is_none() {
            cancellation_note = Some(CREW_DELAY.to_string());
            actual = None;
        }

        FlightSchedule {
            planning_id: format!("PLN{:06}", self.counter),
            flight_id: aircraft.flight_id.clone(),
            route_id: route.route_id.clone(),
            scheduled_departure: departure,
            actual_departure: actual.map(|(d, _)| d),
            scheduled_arrival: departure + duration,
            actual_arrival: actual.map(|(_, a)| a),
            captain: captain.map(str::to_string),
            departure_bay: bay(&mut self.rng, route.route_type),
            cancellation_note,
            base_price_zar: route.base_price_zar,
            is_return,
        }
    }

    /// Departure delay, then an on-time, early or late arrival
    fn actual_times(&mut self, departure: NaiveDateTime, duration: Duration) -> (NaiveDateTime, NaiveDateTime) {
        let mut delay = if self.rng.chance(ON_TIME_RATE) {
            0
        } else {
            (self.rng.exponential(30.0) as i64).max(5)
        };
        if self.rng.chance(0.05) {
            delay = delay.max(self.rng.lognormal(5.5, 0.5) as i64);
        }
        let actual_departure = departure + Duration::minutes(delay);

        let offset = match self.rng.weighted_index(&[0.90, 0.05, 0.05]) {
            0 => 0,
            1 => self.rng.normal(-10.0, 5.0) as i64,
            _ => self.rng.exponential(20.0) as i64,
        };
        (actual_departure, actual_departure + duration + Duration::minutes(offset))
    }

    /// A captain at `origin` who has not flown today. They end the day at `destination`.
    fn assign_captain(
        &mut self,
        origin: &str,
        destination: &str,
        crew_used: &mut HashSet<&'static str>,
    ) -> Option<&'static str> {
        let available: Vec<usize> = self
            .captains
            .iter()
            .enumerate()
            .filter(|(_, c)| c.location == origin && !crew_used.contains(c.name))
            .map(|(i, _)| i)
            .collect();
        if available.is_empty() {
            return None;
        }
        let idx = *self.rng.pick(&available);
        let captain = &mut self.captains[idx];
        captain.location = destination.to_string();
        crew_used.insert(captain.name);
        Some(captain.name)
    }
}

/// The opposite direction of the same airport pair
fn reverse_route<'a>(routes: &'a [Route], route: &Route, day: NaiveDate) -> Option<&'a Route> {
    routes.iter().find(|r| {
        r.route_pair_id == route.route_pair_id && r.route_id != route.route_id && r.date_effective <= day
    })
}

/// First slot at `airport` on `day` at or after `ready`
fn return_slot(airport: &str, day: NaiveDate, ready: NaiveDateTime) -> Option<NaiveDateTime> {
    if ready.date() != day {
        return None;
    }
    slot_hours(airport)
        .iter()
        .map(|&h| at(day, h))
        .find(|slot| *slot >= ready)
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    check_year(GENERATOR, config.year)?;
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("🕑 Generating flight schedules for {}...", config.year);
    let routes = load_network(&layout, config.year)?;
    if routes.is_empty() {
        return Err(GenError::MissingInput {
            path: layout.path(Domain::Airline, "routes", Some(config.year)),
        }
        .into());
    }
    let fleet: Vec<Aircraft> = read_table(&layout.path(Domain::Airline, "fleet", Some(config.year)))?;
    println!("   📂 {} routes, {} aircraft", routes.len(), fleet.len());

    let mut generator = ScheduleGenerator::new(config.year, seed);
    let schedules = generator.generate(&routes, &fleet);

    let path = layout.path(Domain::Airline, "schedules", Some(config.year));
    let rows = write_table(&path, &schedules)?;
    println!("✓ Saved {} scheduled flights to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

/// Scheduled flights keyed by planning id
pub fn index(schedules: &[FlightSchedule]) -> HashMap<&str, &FlightSchedule> {
    schedules.iter().map(|s| (s.planning_id.as_str(), s)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::airline::fleet::tests::create_test_fleet;
    use crate::airline::routes::generate_routes;
    use crate::airline::BASE_YEAR;
    use chrono::Datelike;

    pub(crate) fn create_test_network(year: i32) -> (Vec<Route>, Vec<Aircraft>, Vec<FlightSchedule>) {
        let routes = generate_routes(year, &HashSet::new());
        let fleet = create_test_fleet(year);
        let schedules = ScheduleGenerator::new(year, 42).generate(&routes, &fleet);
        (routes, fleet, schedules)
    }

    #[test]
    fn test_schedule_ids_and_year() {
        let (_, _, schedules) = create_test_network(2015);
        assert!(!schedules.is_empty());
        for (i, s) in schedules.iter().enumerate() {
            assert_eq!(s.planning_id, format!("PLN{:06}", i + 1));
            assert_eq!(s.scheduled_departure.year(), 2015);
        }
        println!("✅ {} flights scheduled PASSED", schedules.len());
    }

    #[test]
    fn test_aircraft_continuity() {
        let (routes, fleet, schedules) = create_test_network(2015);
        let by_id: HashMap<&str, &Route> = routes.iter().map(|r| (r.route_id.as_str(), r)).collect();

        for aircraft in &fleet {
            let mut at_airport = HOME_BASE.to_string();
            for leg in schedules.iter().filter(|s| s.flight_id == aircraft.flight_id) {
                let route = by_id[leg.route_id.as_str()];
                assert_eq!(route.origin_airport, at_airport, "{} departs where it is", leg.planning_id);
                assert!(fleet::suits(&aircraft.aircraft_model, route.route_type));
                if !leg.is_cancelled() {
                    at_airport = route.destination_airport.clone();
                }
            }
        }
    }

    #[test]
    fn test_cancellations_and_actual_times() {
        let (_, _, schedules) = create_test_network(2015);
        for s in &schedules {
            if s.is_cancelled() {
                assert!(s.actual_departure.is_none() && s.actual_arrival.is_none());
            } else {
                let dep = s.actual_departure.unwrap();
                assert!(dep >= s.scheduled_departure, "no early departures");
                assert!(s.actual_arrival.unwrap() > dep);
                assert!(s.captain.is_some());
            }
            if let Some(note) = s.cancellation_note.as_deref() {
                assert!(CANCELLATION_REASONS.contains(&note), "unknown reason {}", note);
            }
            if s.captain.is_none() {
                assert_eq!(s.cancellation_note.as_deref(), Some(CREW_DELAY));
            }
        }
    }

    #[test]
    fn test_return_legs_follow_outbound() {
        let (routes, _, schedules) = create_test_network(BASE_YEAR);
        let by_id: HashMap<&str, &Route> = routes.iter().map(|r| (r.route_id.as_str(), r)).collect();

        for pair in schedules.windows(2) {
            let (out, back) = (&pair[0], &pair[1]);
            if !back.is_return {
                continue;
            }
            assert!(!out.is_return && !out.is_cancelled());
            assert_eq!(out.flight_id, back.flight_id);
            assert_eq!(
                by_id[out.route_id.as_str()].route_pair_id,
                by_id[back.route_id.as_str()].route_pair_id
            );
            assert!(back.scheduled_departure >= out.actual_arrival.unwrap() + Duration::minutes(120));
            assert_eq!(back.scheduled_departure.date(), out.scheduled_departure.date());
        }
    }
}
