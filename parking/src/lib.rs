//! Spot allocation and ticket lifecycle for a small parking facility.
//!
//! [`manager::ParkingManager`] is the core: it matches vehicles to the first compatible free
//! spot, issues tickets and closes them again while computing the fee. Everything else in this
//! crate adapts plain strings (console prompts, a line-oriented TCP protocol) to those two calls.

pub mod app;
pub mod clock;
pub mod config;
pub mod console;
pub mod error;
pub mod fees;
mod handles;
pub mod io;
pub mod manager;
pub mod models;
pub mod parser;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, InputError, LayoutError, ParkingError, TicketError};
pub use fees::{Fee, FeeRule};
pub use manager::{Availability, ParkingManager, Receipt};
pub use models::{ParkingSpot, Ticket, Vehicle, VehicleCategory};

pub type SpotId = u32;
pub type TicketId = u64;

/// Longest request line accepted from a client before the stream is considered broken.
pub(crate) const MAX_LINE_LENGTH: usize = common::BUFFER_SIZE;
