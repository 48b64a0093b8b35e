use crate::models::VehicleCategory;
use crate::{SpotId, TicketId};
use thiserror::Error;

/// Expected, recoverable outcomes of the two core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParkingError {
    #[error("no free spot for {0}")]
    NoSpotAvailable(VehicleCategory),
    #[error("ticket {0} is not active")]
    InvalidTicket(TicketId),
}

/// Malformed input caught at the adapter boundary, before anything reaches the manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("plate number cannot be empty")]
    EmptyPlate,
    #[error("unknown vehicle type {0:?}, only CAR or BIKE allowed")]
    UnknownCategory(String),
    #[error("ticket id must be a positive integer, got {0:?}")]
    InvalidTicketId(String),
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("malformed request")]
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("a parking facility needs at least one spot")]
    Empty,
    #[error("spot {0} is declared more than once")]
    DuplicateSpot(SpotId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TicketError {
    #[error("ticket {0} has not exited yet")]
    NotExited(TicketId),
    #[error("ticket {0} has already exited")]
    AlreadyExited(TicketId),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
