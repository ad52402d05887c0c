// 🎫 Bookings - seats sold on every scheduled flight
//
// Price = base fare × class × holiday × urgency × season × demand × noise,
// floored at R100. A booking is always made before its flight departs.

use crate::airline::customers::AirlineCustomer;
use crate::airline::fleet::Aircraft;
use crate::airline::routes::{load_network, Route};
use crate::airline::schedules::FlightSchedule;
use crate::airline::{check_year, BASE_YEAR};
use crate::config::{GeneratorConfig, SeedPolicy};
use crate::error::GenError;
use crate::pipeline::RunOutcome;
use crate::random::{round_to, Sampler};
use crate::table::{read_or_empty, read_table, write_table, DataLayout, Domain};
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const GENERATOR: &str = "airline/bookings";
pub const SEED: SeedPolicy = SeedPolicy::Entropy;

pub const MIN_TICKET_PRICE: f64 = 100.0;
const DEFAULT_CAPACITY: u32 = 100;
const RETURN_TRIP_RATE: f64 = 0.15;
const AVG_PARTY_SIZE: f64 = 1.5;
const ON_HOLD_DAYS: i64 = 365;

// ============================================================================
// ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    CheckedIn,
    OnHold,
    Rescheduled,
    Cancelled,
    NoShow,
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::CheckedIn => "checked-in",
            BookingStatus::OnHold => "on-hold",
            BookingStatus::Rescheduled => "rescheduled",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no-show",
            BookingStatus::Confirmed => "confirmed",
        }
    }

    pub fn draw(rng: &mut Sampler) -> BookingStatus {
        *rng.weighted(&[
            (BookingStatus::CheckedIn, 0.65),
            (BookingStatus::OnHold, 0.05),
            (BookingStatus::Rescheduled, 0.03),
            (BookingStatus::Cancelled, 0.02),
            (BookingStatus::NoShow, 0.05),
            (BookingStatus::Confirmed, 0.20),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingClass {
    Economy,
    Business,
    First,
}

impl BookingClass {
    pub const ALL: [BookingClass; 3] = [BookingClass::Economy, BookingClass::Business, BookingClass::First];

    pub fn multiplier(&self) -> f64 {
        match self {
            BookingClass::Economy => 1.0,
            BookingClass::Business => 2.0,
            BookingClass::First => 3.5,
        }
    }

    pub fn is_premium(&self) -> bool {
        !matches!(self, BookingClass::Economy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripType {
    #[serde(rename = "One-way")]
    OneWay,
    Return,
}

// ============================================================================
// ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,
    pub customer_id: String,
    pub planning_id: String,
    pub booking_date: NaiveDateTime,
    pub trip_type: TripType,
    pub num_adults: u32,
    pub num_children: u32,
    pub num_infants: u32,
    pub booking_class: BookingClass,
    pub price_per_ticket: f64,
    pub total_amount_paid: f64,
    pub booking_status: BookingStatus,
    pub on_hold: bool,
    pub on_hold_end_date: Option<NaiveDateTime>,
    pub rescheduled_date: Option<NaiveDateTime>,
    pub return_date: Option<NaiveDateTime>,
    pub is_return: bool,
}

impl Booking {
    /// Passengers occupying a seat. Infants fly on a lap.
    pub fn seated(&self) -> u32 {
        self.num_adults + self.num_children
    }
}

// ============================================================================
// PRICING
// ============================================================================

/// Durban July, Easter, year-end, and New Year from the second year of operations
pub fn is_holiday(date: NaiveDate) -> bool {
    let (m, d) = (date.month(), date.day());
    match m {
        1 => d <= 10 && date.year() > BASE_YEAR,
        4 => d <= 15,
        7 => d <= 7,
        12 => d >= 15,
        _ => false,
    }
}

fn season_multiplier(date: NaiveDate) -> f64 {
    if matches!(date.month(), 6 | 7 | 12) {
        1.2
    } else {
        1.0
    }
}

fn urgency_multiplier(days_to_departure: i64) -> f64 {
    if days_to_departure < 7 {
        1.2
    } else if days_to_departure > 30 {
        0.9
    } else {
        1.0
    }
}

pub fn ticket_price(
    rng: &mut Sampler,
    base_fare: f64,
    class: BookingClass,
    departure: NaiveDateTime,
    days_to_departure: i64,
    fill_ratio: f64,
) -> f64 {
    let date = departure.date();
    let holiday = if is_holiday(date) { 1.3 } else { 1.0 };
    let demand = 0.8 + fill_ratio * 0.4;
    let noise = rng.normal(1.0, 0.1);
    let price = base_fare
        * class.multiplier()
        * holiday
        * urgency_multiplier(days_to_departure)
        * season_multiplier(date)
        * demand
        * noise;
    round_to(price, 2).max(MIN_TICKET_PRICE)
}

/// Booked mostly weeks ahead, sometimes on the day; never before
/// registration unless that would reach the departure itself
pub fn booking_time(rng: &mut Sampler, departure: NaiveDateTime, registered: NaiveDate) -> NaiveDateTime {
    let days_before = rng.exponential(30.0) as i64;
    let mut booked = if days_before == 0 {
        departure - Duration::hours(rng.int(1, 6)) - Duration::minutes(rng.int(0, 59))
    } else {
        let day = departure.date() - Duration::days(days_before);
        let time = NaiveTime::from_hms_opt(rng.int(8, 20) as u32, rng.int(0, 59) as u32, 0).unwrap_or_default();
        day.and_time(time)
    };

    let registered = registered.and_time(NaiveTime::MIN);
    if booked < registered {
        booked = registered + Duration::hours(rng.int(1, 12));
    }
    if booked >= departure {
        booked = departure - Duration::minutes(30);
    }
    booked
}

/// (adults, children, infants)
fn party(rng: &mut Sampler, corporate: bool) -> (u32, u32, u32) {
    if corporate {
        (rng.poisson(3.0).max(1), 0, 0)
    } else {
        (rng.poisson(1.0).max(1), rng.poisson(0.2), rng.poisson(0.1))
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Flights that can still be sold, with lookups the generator needs
struct Inventory<'a> {
    routes: HashMap<&'a str, &'a Route>,
    /// Flyable schedules in departure order
    flights: Vec<&'a FlightSchedule>,
    by_date: HashMap<NaiveDate, Vec<&'a FlightSchedule>>,
    capacity: HashMap<&'a str, u32>,
    seats_left: HashMap<&'a str, u32>,
}

impl<'a> Inventory<'a> {
    fn new(schedules: &'a [FlightSchedule], routes: &'a [Route], fleet: &'a [Aircraft]) -> Self {
        let aircraft: HashMap<&str, u32> = fleet.iter().map(|a| (a.flight_id.as_str(), a.capacity)).collect();

        let mut flights: Vec<&FlightSchedule> = schedules.iter().filter(|s| !s.is_cancelled()).collect();
        flights.sort_by_key(|s| s.scheduled_departure);

        let mut by_date: HashMap<NaiveDate, Vec<&FlightSchedule>> = HashMap::new();
        let mut capacity = HashMap::new();
        for s in flights.iter().copied() {
            by_date.entry(s.scheduled_departure.date()).or_default().push(s);
            let seats = aircraft.get(s.flight_id.as_str()).copied().unwrap_or(DEFAULT_CAPACITY);
            capacity.insert(s.planning_id.as_str(), seats);
        }

        Inventory {
            routes: routes.iter().map(|r| (r.route_id.as_str(), r)).collect(),
            seats_left: capacity.clone(),
            capacity,
            flights,
            by_date,
        }
    }

    fn left(&self, planning_id: &str) -> u32 {
        self.seats_left.get(planning_id).copied().unwrap_or(0)
    }

    fn take(&mut self, planning_id: &str, seats: u32) {
        if let Some(left) = self.seats_left.get_mut(planning_id) {
            *left = left.saturating_sub(seats);
        }
    }

    /// First flight on `date` flying the opposite direction with room for `seats`
    fn return_flight(&self, route: &Route, date: NaiveDate, seats: u32) -> Option<&'a FlightSchedule> {
        self.by_date.get(&date)?.iter().copied().find(|s| {
            self.routes.get(s.route_id.as_str()).map_or(false, |r| {
                r.route_pair_id == route.route_pair_id && r.route_id != route.route_id
            }) && self.left(&s.planning_id) >= seats
        })
    }
}

pub struct BookingGenerator {
    year: i32,
    rng: Sampler,
    counter: usize,
}

impl BookingGenerator {
    pub fn new(year: i32, seed: u64) -> Self {
        BookingGenerator {
            year,
            rng: Sampler::seeded(seed),
            counter: 0,
        }
    }

    fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("BKG{:06}", self.counter)
    }

    pub fn generate(
        &mut self,
        customers: &[AirlineCustomer],
        schedules: &[FlightSchedule],
        routes: &[Route],
        fleet: &[Aircraft],
    ) -> Vec<Booking> {
        let mut inventory = Inventory::new(schedules, routes, fleet);
        let mut bookings = Vec::new();
        if customers.is_empty() {
            return bookings;
        }

        self.regular_bookings(customers, &mut inventory, &mut bookings);
        let first_pass = bookings.len();
        self.cover_unbooked(customers, &mut inventory, &mut bookings);

        tracing::info!(
            year = self.year,
            bookings = bookings.len(),
            second_pass = bookings.len() - first_pass,
            "bookings generated"
        );
        bookings
    }

    /// Fill each flight towards a Weibull-drawn load factor with random customers
    fn regular_bookings(&mut self, customers: &[AirlineCustomer], inventory: &mut Inventory, bookings: &mut Vec<Booking>) {
        let flights = inventory.flights.clone();
        for flight in flights {
            let Some(route) = inventory.routes.get(flight.route_id.as_str()).copied() else {
                continue;
            };
            let departure = flight.scheduled_departure;
            let fill = if is_holiday(departure.date()) {
                0.99
            } else {
                (self.rng.weibull(2.0) * 0.54).clamp(0.45, 0.99)
            };

            let mut available = inventory.left(&flight.planning_id);
            if available == 0 {
                continue;
            }
            let capacity = inventory.capacity.get(flight.planning_id.as_str()).copied().unwrap_or(DEFAULT_CAPACITY);
            let target = available.min((capacity as f64 * fill) as u32);
            let attempts = ((target as f64 / AVG_PARTY_SIZE) as u32).min(target).max(1);

            for _ in 0..attempts {
                let customer = self.rng.pick(customers);
                if customer.date_of_registration.and_time(NaiveTime::MIN) > departure {
                    continue;
                }
                let booked = booking_time(&mut self.rng, departure, customer.date_of_registration);
                let (adults, children, infants) = party(&mut self.rng, customer.is_corporate());
                if adults + children > available {
                    continue;
                }

                let booking = self.book(customer, flight, route, booked, fill, (adults, children, infants));
                inventory.take(&flight.planning_id, booking.seated());
                available -= booking.seated();

                let return_leg = booking
                    .return_date
                    .and_then(|date| inventory.return_flight(route, date.date(), booking.seated()));
                if let Some(back) = return_leg {
                    let mut ret = booking.clone();
                    ret.booking_id = self.next_id();
                    ret.planning_id = back.planning_id.clone();
                    ret.return_date = None;
                    ret.is_return = true;
                    ret.booking_status = BookingStatus::draw(&mut self.rng);
                    inventory.take(&back.planning_id, ret.seated());
                    bookings.push(booking);
                    bookings.push(ret);
                } else {
                    bookings.push(booking);
                }
            }
        }
    }

    fn book(
        &mut self,
        customer: &AirlineCustomer,
        flight: &FlightSchedule,
        route: &Route,
        booked: NaiveDateTime,
        fill: f64,
        (adults, children, infants): (u32, u32, u32),
    ) -> Booking {
        let departure = flight.scheduled_departure;
        let trip_type = if self.rng.chance(RETURN_TRIP_RATE) { TripType::Return } else { TripType::OneWay };
        let class = *self.rng.pick(&BookingClass::ALL);
        let days_to_departure = (departure - booked).num_days();
        let price = ticket_price(&mut self.rng, route.base_price_zar, class, departure, days_to_departure, fill);
        let status = BookingStatus::draw(&mut self.rng);

        let on_hold = status == BookingStatus::OnHold;
        let rescheduled_date = (status == BookingStatus::Rescheduled)
            .then(|| departure + Duration::days((self.rng.exponential(60.0) as i64).max(7)));
        let return_date = (trip_type == TripType::Return)
            .then(|| departure + Duration::days((self.rng.exponential(7.0) as i64).max(2)));

        Booking {
            booking_id: self.next_id(),
            customer_id: customer.customer_id.clone(),
            planning_id: flight.planning_id.clone(),
            booking_date: booked,
            trip_type,
            num_adults: adults,
            num_children: children,
            num_infants: infants,
            booking_class: class,
            price_per_ticket: price,
            total_amount_paid: round_to(price * (adults + children) as f64, 2),
            booking_status: status,
            on_hold,
            on_hold_end_date: on_hold.then(|| booked + Duration::days(ON_HOLD_DAYS)),
            rescheduled_date,
            return_date,
            is_return: false,
        }
    }

    /// One one-way booking for every customer the first pass missed
    fn cover_unbooked(&mut self, customers: &[AirlineCustomer], inventory: &mut Inventory, bookings: &mut Vec<Booking>) {
        let booked: HashSet<String> = bookings.iter().map(|b| b.customer_id.clone()).collect();
        let flights = inventory.flights.clone();

        for customer in customers.iter().filter(|c| !booked.contains(&c.customer_id)) {
            let registered = customer.date_of_registration.and_time(NaiveTime::MIN);
            let first = flights.partition_point(|f| f.scheduled_departure < registered);
            if first >= flights.len() {
                continue;
            }

            let mut chosen = None;
            for _ in 0..10 {
                let flight = flights[self.rng.int(first as i64, flights.len() as i64 - 1) as usize];
                if inventory.left(&flight.planning_id) > 0 {
                    chosen = Some(flight);
                    break;
                }
            }
            let Some(flight) = chosen else {
                continue;
            };
            let Some(route) = inventory.routes.get(flight.route_id.as_str()).copied() else {
                continue;
            };

            let departure = flight.scheduled_departure;
            let booked_at = booking_time(&mut self.rng, departure, customer.date_of_registration);
            let counts = party(&mut self.rng, customer.is_corporate());
            if counts.0 + counts.1 > inventory.left(&flight.planning_id) {
                continue;
            }

            let mut booking = self.book(customer, flight, route, booked_at, 0.7, counts);
            booking.trip_type = TripType::OneWay;
            booking.return_date = None;
            booking.rescheduled_date = None;
            inventory.take(&flight.planning_id, booking.seated());
            bookings.push(booking);
        }
    }
}

pub fn run(config: &GeneratorConfig) -> Result<RunOutcome> {
    check_year(GENERATOR, config.year)?;
    let layout = DataLayout::new(&config.data_dir);
    let seed = config.resolve_seed(SEED);

    println!("🎫 Generating bookings for {}...", config.year);
    let mut customers: Vec<AirlineCustomer> = Vec::new();
    for year in BASE_YEAR..config.year {
        customers.extend(read_or_empty::<AirlineCustomer>(&layout.path(Domain::Airline, "customers", Some(year)))?);
    }
    customers.extend(read_table::<AirlineCustomer>(&layout.path(Domain::Airline, "customers", Some(config.year)))?);

    let schedules: Vec<FlightSchedule> = read_table(&layout.path(Domain::Airline, "schedules", Some(config.year)))?;
    let fleet: Vec<Aircraft> = read_table(&layout.path(Domain::Airline, "fleet", Some(config.year)))?;
    let routes = load_network(&layout, config.year)?;
    if routes.is_empty() {
        return Err(GenError::MissingInput {
            path: layout.path(Domain::Airline, "routes", Some(config.year)),
        }
        .into());
    }
    println!(
        "   📂 {} customers, {} scheduled flights, {} routes",
        customers.len(),
        schedules.len(),
        routes.len()
    );

    let mut generator = BookingGenerator::new(config.year, seed);
    let bookings = generator.generate(&customers, &schedules, &routes, &fleet);

    let path = layout.path(Domain::Airline, "bookings", Some(config.year));
    let rows = write_table(&path, &bookings)?;
    println!("✓ Saved {} bookings to {}", rows, path.display());

    Ok(RunOutcome::new(GENERATOR, config.year, seed, vec![path], rows))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::airline::customers::tests::create_test_customers;
    use crate::airline::schedules::tests::create_test_network;

    pub(crate) struct TestAirline {
        pub routes: Vec<Route>,
        pub fleet: Vec<Aircraft>,
        pub schedules: Vec<FlightSchedule>,
        pub customers: Vec<AirlineCustomer>,
        pub bookings: Vec<Booking>,
    }

    /// One year of network with bookings on the first two weeks of flights
    pub(crate) fn create_test_bookings(year: i32) -> TestAirline {
        let (routes, fleet, mut schedules) = create_test_network(year);
        let cutoff = NaiveDate::from_ymd_opt(year, 1, 15).unwrap().and_time(NaiveTime::MIN);
        schedules.retain(|s| s.scheduled_departure < cutoff);
        let mut customers = create_test_customers(year);
        for c in &mut customers {
            c.date_of_registration = NaiveDate::from_ymd_opt(year, 1, 1 + (c.dob.day() % 10)).unwrap();
        }
        let bookings = BookingGenerator::new(year, 7).generate(&customers, &schedules, &routes, &fleet);
        TestAirline { routes, fleet, schedules, customers, bookings }
    }

    #[test]
    fn test_booking_precedes_departure() {
        let airline = create_test_bookings(2015);
        assert!(!airline.bookings.is_empty());
        let flights: HashMap<&str, &FlightSchedule> =
            airline.schedules.iter().map(|s| (s.planning_id.as_str(), s)).collect();

        for b in &airline.bookings {
            let flight = flights[b.planning_id.as_str()];
            assert!(!flight.is_cancelled(), "no seats sold on cancelled flights");
            assert!(b.booking_date < flight.scheduled_departure, "{} booked after departure", b.booking_id);
            assert!(b.price_per_ticket >= MIN_TICKET_PRICE);
        }
        println!("✅ {} bookings precede departure PASSED", airline.bookings.len());
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let airline = create_test_bookings(2015);
        let capacity: HashMap<&str, u32> =
            airline.fleet.iter().map(|a| (a.flight_id.as_str(), a.capacity)).collect();
        let mut seated: HashMap<&str, u32> = HashMap::new();
        for b in &airline.bookings {
            *seated.entry(b.planning_id.as_str()).or_default() += b.seated();
        }
        for s in &airline.schedules {
            let sold = seated.get(s.planning_id.as_str()).copied().unwrap_or(0);
            assert!(sold <= capacity[s.flight_id.as_str()], "{} oversold", s.planning_id);
        }
    }

    #[test]
    fn test_return_bookings_fly_back() {
        let airline = create_test_bookings(2015);
        let flights: HashMap<&str, &FlightSchedule> =
            airline.schedules.iter().map(|s| (s.planning_id.as_str(), s)).collect();
        let routes: HashMap<&str, &Route> = airline.routes.iter().map(|r| (r.route_id.as_str(), r)).collect();

        for pair in airline.bookings.windows(2) {
            let (out, back) = (&pair[0], &pair[1]);
            if !back.is_return {
                continue;
            }
            assert_eq!(out.trip_type, TripType::Return);
            assert_eq!(back.customer_id, out.customer_id);
            assert!(back.return_date.is_none());
            let out_route = routes[flights[out.planning_id.as_str()].route_id.as_str()];
            let back_route = routes[flights[back.planning_id.as_str()].route_id.as_str()];
            assert_eq!(out_route.route_pair_id, back_route.route_pair_id);
            assert_ne!(out_route.route_id, back_route.route_id);
        }
    }

    #[test]
    fn test_every_customer_gets_a_booking() {
        let airline = create_test_bookings(2015);
        let booked: HashSet<&str> = airline.bookings.iter().map(|b| b.customer_id.as_str()).collect();
        let share = booked.len() as f64 / airline.customers.len() as f64;
        assert!(share > 0.9, "only {:.2} of customers booked", share);

        let mut ids: Vec<&str> = airline.bookings.iter().map(|b| b.booking_id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), airline.bookings.len());
    }

    #[test]
    fn test_pricing_rules() {
        let d = |m, day| NaiveDate::from_ymd_opt(2016, m, day).unwrap();
        assert!(is_holiday(d(7, 3)));
        assert!(is_holiday(d(12, 20)));
        assert!(is_holiday(d(1, 5)));
        assert!(!is_holiday(NaiveDate::from_ymd_opt(BASE_YEAR, 1, 5).unwrap()));
        assert!(!is_holiday(d(3, 10)));

        let mut rng = Sampler::seeded(3);
        let departure = d(3, 10).and_hms_opt(10, 0, 0).unwrap();
        let cheap = ticket_price(&mut rng, 10.0, BookingClass::Economy, departure, 40, 0.5);
        assert_eq!(cheap, MIN_TICKET_PRICE, "floor applies");

        let mut total = 0.0;
        for _ in 0..500 {
            total += ticket_price(&mut rng, 1000.0, BookingClass::First, departure, 14, 0.5);
        }
        let mean = total / 500.0;
        assert!((3_300.0..3_700.0).contains(&mean), "first class mean {}", mean);
    }

    #[test]
    fn test_booking_time_clamps() {
        let mut rng = Sampler::seeded(11);
        let departure = NaiveDate::from_ymd_opt(2016, 5, 1).unwrap().and_hms_opt(6, 0, 0).unwrap();
        for _ in 0..200 {
            let t = booking_time(&mut rng, departure, NaiveDate::from_ymd_opt(2016, 5, 1).unwrap());
            assert!(t < departure);
        }
        let early_reg = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        for _ in 0..200 {
            let t = booking_time(&mut rng, departure, early_reg);
            assert!(t < departure && t >= early_reg.and_time(NaiveTime::MIN));
        }
    }
}
