// 🛂 Check-ins - one row per passenger on confirmed bookings
//
// Busy flights (load factor ≥ 60%) only see a sample of their bookings at
// the desk. Seats come from the aircraft's seat map; a passenger who cannot
// be seated on a checked-in booking is bumped.

use crate::airline::bookings::{Booking, BookingStatus};
use crate::airline::customers::AirlineCustomer;
use crate::airline::fleet::Aircraft;
use crate::airline::routes::{load_network, Route};
use crate::airline::schedules::FlightSchedule;
use crate::airline::{check_year, BASE_YEAR};
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::identity::{draw_sa_demographic, full_name, surname, Gender};
use crate::pipeline::RunOutcome;
use crate::random::{round_to, Sampler};
use crate::table::{read_or_empty, read_table, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const GENERATOR: &str = "airline/checkins";
pub const SEED: SeedPolicy = SeedPolicy::Entropy;

const SAMPLING_LOAD_FACTOR: f64 = 0.60;
const DEFAULT_CAPACITY: u32 = 150;
const SEAT_ATTEMPTS: usize = 50;
const ONLINE_SHARE: f64 = 0.7;
const LARGE_AIRPORTS: [&str; 3] = ["JNB", "CPT", "DUR"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    CheckedIn,
    NoShow,
    TicketBumping,
    DeniedBoarding,
}

impl CheckInStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInStatus::CheckedIn => "checked_in",
            CheckInStatus::NoShow => "no_show",
            CheckInStatus::TicketBumping => "ticket_bumping",
            CheckInStatus::DeniedBoarding => "denied_boarding",
        }
    }
}

/// Outcome probabilities for a flight's load factor, normalized
pub fn status_weights(load_factor: f64) -> [(CheckInStatus, f64); 4] {
    let (mut checked_in, mut no_show, mut bumping, mut denied) = (0.90, 0.07, 0.02, 0.01);
    if load_factor > 1.0 {
        bumping = (0.02 + (load_factor - 1.0) * 0.3).min(0.15);
        denied = (0.01 + (load_factor - 1.0) * 0.15).min(0.08);
        no_show = 0.03;
        checked_in = 1.0 - bumping - denied - no_show;
    } else if load_factor > 0.9 {
        bumping = (bumping * 2.0_f64).min(0.08);
        denied = (denied * 2.0_f64).min(0.03);
        checked_in = 1.0 - bumping - denied - no_show;
    } else if load_factor < 0.4 {
        no_show = (no_show * 1.5_f64).min(0.12);
        bumping = 0.005;
        denied = 0.001;
        checked_in = 1.0 - no_show - bumping - denied;
    }
    let total = checked_in + no_show + bumping + denied;
    [
        (CheckInStatus::CheckedIn, checked_in / total),
        (CheckInStatus::NoShow, no_show / total),
        (CheckInStatus::TicketBumping, bumping / total),
        (CheckInStatus::DeniedBoarding, denied / total),
    ]
}

// ============================================================================
// SEAT MAPS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatMap {
    pub rows: u32,
    pub letters: &'static str,
    /// Leading rows reserved for Business and First
    pub business_rows: u32,
}

const DEFAULT_SEAT_MAP: SeatMap = SeatMap { rows: 25, letters: "ABCDEF", business_rows: 3 };

const SEAT_MAPS: [(&str, SeatMap); 7] = [
    ("Boeing 737-800", SeatMap { rows: 32, letters: "ABCDEF", business_rows: 4 }),
    ("Boeing 737-900", SeatMap { rows: 30, letters: "ABCDEF", business_rows: 4 }),
    ("Airbus A321neo", SeatMap { rows: 33, letters: "ABCDEF", business_rows: 4 }),
    ("Embraer E190", SeatMap { rows: 25, letters: "ACDF", business_rows: 5 }),
    ("Bombardier Q400", SeatMap { rows: 20, letters: "ACDF", business_rows: 0 }),
    ("Airbus A330-300", SeatMap { rows: 36, letters: "ABCDEFGH", business_rows: 5 }),
    ("Boeing 777-300ER", SeatMap { rows: 42, letters: "ABCDEFGHJK", business_rows: 6 }),
];

pub fn seat_map(model: &str) -> SeatMap {
    SEAT_MAPS
        .iter()
        .find(|(m, _)| *m == model)
        .map_or(DEFAULT_SEAT_MAP, |(_, map)| *map)
}

/// A free seat in the right cabin, or None after repeated collisions
fn allocate_seat(rng: &mut Sampler, map: SeatMap, premium: bool, taken: &HashSet<String>) -> Option<String> {
    let (first_row, last_row) = if premium && map.business_rows > 0 {
        (1, map.business_rows)
    } else {
        (map.business_rows + 1, map.rows)
    };
    let letters: Vec<char> = map.letters.chars().collect();
    for _ in 0..SEAT_ATTEMPTS {
        let seat = format!("{}{}", rng.int(first_row as i64, last_row as i64), rng.pick(&letters));
        if !taken.contains(&seat) {
            return Some(seat);
        }
    }
    None
}

fn gate(rng: &mut Sampler, origin: &str) -> String {
    let (piers, gates): (&[char], i64) = if LARGE_AIRPORTS.contains(&origin) {
        (&['A', 'B', 'C'], 20)
    } else {
        (&['A', 'B'], 10)
    };
    format!("{}{}", rng.pick(piers), rng.int(1, gates))
}

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerType {
    Adult,
    Child,
    Infant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub checkin_id: String,
    pub booking_id: String,
    pub planning_id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub passenger_type: PassengerType,
    pub checkin_status: CheckInStatus,
    pub gate_number: String,
    pub seat_allocation: Option<String>,
    pub max_luggage: u32,
    pub checkin_luggage: f64,
    pub checkin_time: NaiveDateTime,
}

// ============================================================================
// GENERATOR
// ============================================================================

pub struct CheckInGenerator {
    year: i32,
    rng: Sampler,
    counter: usize,
}

impl CheckInGenerator {
    pub fn new(year: i32, seed: u64) -> Self {
        CheckInGenerator {
            year,
            rng: Sampler::seeded(seed),
            counter: 0,
        }
    }

    pub fn generate(
        &mut self,
        bookings: &[Booking],
        customers: &[AirlineCustomer],
        schedules: &[FlightSchedule],
        routes: &[Route],
        fleet: &[Aircraft],
    ) -> Vec<CheckIn> {
        let names: HashMap<&str, &str> = customers.iter().map(|c| (c.customer_id.as_str(), c.name.as_str())).collect();
        let flights: HashMap<&str, &FlightSchedule> = schedules.iter().map(|s| (s.planning_id.as_str(), s)).collect();
        let route_by_id: HashMap<&str, &Route> = routes.iter().map(|r| (r.route_id.as_str(), r)).collect();
        let aircraft: HashMap<&str, &Aircraft> = fleet.iter().map(|a| (a.flight_id.as_str(), a)).collect();

        let mut order: Vec<&str> = Vec::new();
        let mut per_flight: HashMap<&str, Vec<&Booking>> = HashMap::new();
        for b in bookings.iter().filter(|b| {
            matches!(
                b.booking_status,
                BookingStatus::Confirmed | BookingStatus::Rescheduled | BookingStatus::CheckedIn
            )
        }) {
            let group = per_flight.entry(b.planning_id.as_str()).or_default();
            if group.is_empty() {
                order.push(b.planning_id.as_str());
            }
            group.push(b);
        }

        let mut checkins = Vec::new();
        for planning_id in order {
            let Some(flight) = flights.get(planning_id).copied() else {
                tracing::debug!(planning_id, "booking references unknown flight");
                continue;
            };
            let plane = aircraft.get(flight.flight_id.as_str()).copied();
            let capacity = plane.map_or(DEFAULT_CAPACITY, |a| a.capacity);
            let map = plane.map_or(DEFAULT_SEAT_MAP, |a| seat_map(&a.aircraft_model));
            let origin = route_by_id.get(flight.route_id.as_str()).map_or("", |r| r.origin_airport.as_str());

            let group = per_flight.get(planning_id).cloned().unwrap_or_default();
            let seated: u32 = group.iter().map(|b| b.seated()).sum();
            let load_factor = seated as f64 / capacity.max(1) as f64;
            let group = self.sample_busy_flight(group, load_factor);

            let weights = status_weights(load_factor);
            let gate_number = gate(&mut self.rng, origin);
            let mut taken: HashSet<String> = HashSet::new();

            for booking in group {
                let name = names.get(booking.customer_id.as_str()).copied();
                let rows = self.check_in_party(booking, flight, name, map, &weights, &gate_number, &mut taken);
                checkins.extend(rows);
            }
        }

        tracing::info!(year = self.year, checkins = checkins.len(), "check-ins generated");
        checkins
    }

    /// All bookings below the threshold load, otherwise an adaptive sample
    fn sample_busy_flight<'b>(&mut self, group: Vec<&'b Booking>, load_factor: f64) -> Vec<&'b Booking> {
        if load_factor < SAMPLING_LOAD_FACTOR {
            return group;
        }
        let rate = (SAMPLING_LOAD_FACTOR / load_factor).clamp(0.7, 0.95);
        let keep = (group.len() as f64 * rate).round() as usize;
        let indices: Vec<usize> = (0..group.len()).collect();
        let mut chosen = self.rng.sample(&indices, keep);
        chosen.sort_unstable();
        chosen.into_iter().map(|i| group[i]).collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn check_in_party(
        &mut self,
        booking: &Booking,
        flight: &FlightSchedule,
        holder_name: Option<&str>,
        map: SeatMap,
        weights: &[(CheckInStatus, f64); 4],
        gate_number: &str,
        taken: &mut HashSet<String>,
    ) -> Vec<CheckIn> {
        let hours_before = if self.rng.chance(ONLINE_SHARE) {
            self.rng.uniform(2.0, 24.0)
        } else {
            self.rng.uniform(0.5, 2.0)
        };
        let checkin_time = flight.scheduled_departure - Duration::seconds((hours_before * 3600.0) as i64);
        let mut status = *self.rng.weighted(weights);
        let premium = booking.booking_class.is_premium();

        let holder = holder_name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Customer {}", booking.customer_id));
        let mut adult_seats: Vec<String> = Vec::new();
        let mut rows = Vec::new();

        let passengers = booking.num_adults + booking.num_children + booking.num_infants;
        for i in 0..passengers {
            let kind = if i < booking.num_adults {
                PassengerType::Adult
            } else if i < booking.num_adults + booking.num_children {
                PassengerType::Child
            } else {
                PassengerType::Infant
            };

            let customer_name = match kind {
                PassengerType::Infant => format!("Infant {}", surname(&holder)),
                _ if i == 0 => holder.clone(),
                _ => {
                    let demographic = draw_sa_demographic(&mut self.rng);
                    let gender = Gender::draw(&mut self.rng);
                    full_name(&mut self.rng, demographic, gender)
                }
            };

            let seat = if kind == PassengerType::Infant && !adult_seats.is_empty() {
                Some(format!("{}-Infant", self.rng.pick(&adult_seats)))
            } else {
                let seat = allocate_seat(&mut self.rng, map, premium, taken);
                if let Some(s) = &seat {
                    taken.insert(s.clone());
                    if kind == PassengerType::Adult {
                        adult_seats.push(s.clone());
                    }
                }
                seat
            };
            if seat.is_none() && status == CheckInStatus::CheckedIn {
                status = CheckInStatus::TicketBumping;
            }

            let allowance = if premium { 46 } else { 23 };
            let (luggage, max_luggage) = match kind {
                PassengerType::Infant => (self.rng.uniform(0.0, 5.0), 10),
                PassengerType::Child => (self.rng.normal(12.0, 3.0), allowance),
                PassengerType::Adult => (self.rng.normal(18.0, 4.0), allowance),
            };

            self.counter += 1;
            rows.push(CheckIn {
                checkin_id: format!("CI{}{:06}", self.year, self.counter),
                booking_id: booking.booking_id.clone(),
                planning_id: booking.planning_id.clone(),
                customer_id: booking.customer_id.clone(),
                customer_name,
                passenger_type: kind,
                checkin_status: status,
                gate_number: gate_number.to_string(),
                seat_allocation: seat,
                max_luggage,
                checkin_luggage: round_to(luggage.max(0.0), 2),
                checkin_time,
            });
        }
        rows
    }
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    check_year(GENERATOR, config.year)?;
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("🛂 Generating check-ins for {}...", config.year);
    let bookings: Vec<Booking> = read_table(&layout.path(Domain::Airline, "bookings", Some(config.year)))?;
    let schedules: Vec<FlightSchedule> = read_table(&layout.path(Domain::Airline, "schedules", Some(config.year)))?;
    let fleet: Vec<Aircraft> = read_table(&layout.path(Domain::Airline, "fleet", Some(config.year)))?;
    let routes = load_network(&layout, config.year)?;
    let mut customers: Vec<AirlineCustomer> = Vec::new();
    for year in BASE_YEAR..=config.year {
        customers.extend(read_or_empty::<AirlineCustomer>(&layout.path(Domain::Airline, "customers", Some(year)))?);
    }
    println!("   📂 {} bookings on {} flights", bookings.len(), schedules.len());

    let mut generator = CheckInGenerator::new(config.year, seed);
    let checkins = generator.generate(&bookings, &customers, &schedules, &routes, &fleet);

    let path = layout.path(Domain::Airline, "checkins", Some(config.year));
    let rows = write_table(&path, &checkins)?;
    println!("✓ Saved {} check-ins to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airline::bookings::tests::create_test_bookings;

    fn create_test_checkins() -> (Vec<Booking>, Vec<FlightSchedule>, Vec<CheckIn>) {
        let airline = create_test_bookings(2015);
        let checkins = CheckInGenerator::new(2015, 5).generate(
            &airline.bookings,
            &airline.customers,
            &airline.schedules,
            &airline.routes,
            &airline.fleet,
        );
        (airline.bookings, airline.schedules, checkins)
    }

    #[test]
    fn test_only_confirmed_bookings_check_in() {
        let (bookings, schedules, checkins) = create_test_checkins();
        assert!(!checkins.is_empty());
        let by_id: HashMap<&str, &Booking> = bookings.iter().map(|b| (b.booking_id.as_str(), b)).collect();
        let flights: HashMap<&str, &FlightSchedule> = schedules.iter().map(|s| (s.planning_id.as_str(), s)).collect();

        for c in &checkins {
            let booking = by_id[c.booking_id.as_str()];
            assert!(matches!(
                booking.booking_status,
                BookingStatus::Confirmed | BookingStatus::Rescheduled | BookingStatus::CheckedIn
            ));
            let departure = flights[c.planning_id.as_str()].scheduled_departure;
            assert!(c.checkin_time < departure);
            assert!(c.checkin_time >= departure - Duration::hours(24));
        }
        println!("✅ {} check-ins PASSED", checkins.len());
    }

    #[test]
    fn test_seats_unique_per_flight() {
        let (_, _, checkins) = create_test_checkins();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        for c in &checkins {
            let Some(seat) = c.seat_allocation.as_deref() else {
                continue;
            };
            if c.passenger_type == PassengerType::Infant && seat.ends_with("-Infant") {
                continue;
            }
            assert!(seen.insert((c.planning_id.as_str(), seat)), "seat {} reused", seat);
        }
    }

    #[test]
    fn test_luggage_allowances() {
        let (_, _, checkins) = create_test_checkins();
        for c in &checkins {
            assert!(c.checkin_luggage >= 0.0);
            match c.passenger_type {
                PassengerType::Infant => assert_eq!(c.max_luggage, 10),
                _ => assert!(c.max_luggage == 23 || c.max_luggage == 46),
            }
        }
    }

    #[test]
    fn test_status_weights() {
        for lf in [0.2, 0.5, 0.95, 1.3] {
            let total: f64 = status_weights(lf).iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
        let busy = status_weights(1.3);
        let quiet = status_weights(0.5);
        assert!(busy[2].1 > quiet[2].1, "overbooked flights bump more");
        assert_eq!(seat_map("Unknown Jet"), DEFAULT_SEAT_MAP);
    }
}
