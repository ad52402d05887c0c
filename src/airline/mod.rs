// Airline Domain
// Routes + Fleet → Schedules; Customers + Schedules → Bookings → Check-ins
//
// Every table is yearly (airline_data/{entity}_{year}.csv). The network
// starts in 2013 and grows: later years only add routes.

pub mod routes;
pub mod fleet;
pub mod schedules;
pub mod customers;
pub mod bookings;
pub mod checkins;

use crate::error::GenError;

pub use bookings::{Booking, BookingGenerator, BookingStatus};
pub use checkins::{CheckIn, CheckInGenerator};
pub use customers::{AirlineCustomer, AirlineCustomerGenerator};
pub use fleet::Aircraft;
pub use routes::{Airport, Route, RouteType};
pub use schedules::{FlightSchedule, ScheduleGenerator};

/// First year of operations
pub const BASE_YEAR: i32 = 2013;

pub(crate) fn check_year(generator: &str, year: i32) -> Result<(), GenError> {
    if year < BASE_YEAR {
        return Err(GenError::UnsupportedYear {
            generator: generator.to_string(),
            year,
            minimum: BASE_YEAR,
        });
    }
    Ok(())
}
