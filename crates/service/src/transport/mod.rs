//! Bus operators: fleet, scheduled trips and seat tickets.

pub mod buses;
pub mod trips;
pub mod tickets;

use serde::Serialize;

use models::{ticket, TicketStatus};

/// Seat occupancy of one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatMap {
    pub capacity: i32,
    pub taken: Vec<i32>,
    pub available: Vec<i32>,
}

/// Seats `1..=capacity` split into taken (issued tickets) and available.
pub fn seat_map(capacity: i32, tickets: &[ticket::Model]) -> SeatMap {
    let mut taken: Vec<i32> = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Issued.as_str())
        .map(|t| t.seat_no)
        .filter(|s| (1..=capacity).contains(s))
        .collect();
    taken.sort_unstable();
    taken.dedup();
    let available = (1..=capacity).filter(|s| taken.binary_search(s).is_err()).collect();
    SeatMap { capacity, taken, available }
}
