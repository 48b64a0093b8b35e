use crate::error::{InputError, ParkingError};
use crate::fees::Fee;
use crate::manager::Availability;
use crate::models::VehicleCategory;
use crate::parser::Request;
use crate::{SpotId, TicketId};
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::net::TcpStream;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug)]
pub enum ClientInput {
    /// The write half of a freshly accepted connection.
    Connected(TcpStream),
    Request(Request),
    Invalid(InputError),
    StreamEnded,
    StreamErrored,
}

#[derive(Debug)]
pub struct Message {
    pub from: Uuid,
    pub input: ClientInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerOutput {
    Parked { ticket: TicketId, spot: SpotId },
    Exited { ticket: TicketId, fee: Fee },
    Status(Vec<(VehicleCategory, Availability)>),
    Refused(ParkingError),
    Invalid(InputError),
    Goodbye,
}
impl ServerOutput {
    pub fn write(&self, stream: &mut impl Write) -> bool {
        let response = format!("{self}\n");
        debug!(">>> {}", response.trim_end());
        stream.write_all(response.as_bytes()).is_ok()
    }
}
impl Display for ServerOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parked { ticket, spot } => write!(f, "OK PARKED {ticket} {spot}"),
            Self::Exited { ticket, fee } => write!(f, "OK EXITED {ticket} {fee}"),
            Self::Status(availability) => {
                f.write_str("OK STATUS")?;
                for (category, Availability { free, total }) in availability {
                    write!(f, " {category} {free}/{total}")?;
                }
                Ok(())
            },
            Self::Refused(ParkingError::NoSpotAvailable(category)) => write!(f, "ERR NO_SPOT {category}"),
            Self::Refused(ParkingError::InvalidTicket(ticket)) => write!(f, "ERR INVALID_TICKET {ticket}"),
            Self::Invalid(error) => write!(f, "ERR INVALID_INPUT {error}"),
            Self::Goodbye => f.write_str("OK BYE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines() {
        assert_eq!("OK PARKED 1 3", ServerOutput::Parked { ticket: 1, spot: 3 }.to_string());
        assert_eq!(
            "OK EXITED 2 40.00",
            ServerOutput::Exited { ticket: 2, fee: Fee::new(40) }.to_string()
        );
        assert_eq!(
            "ERR NO_SPOT BIKE",
            ServerOutput::Refused(ParkingError::NoSpotAvailable(VehicleCategory::Bike)).to_string()
        );
        assert_eq!(
            "ERR INVALID_TICKET 999",
            ServerOutput::Refused(ParkingError::InvalidTicket(999)).to_string()
        );
        assert_eq!(
            "ERR INVALID_INPUT plate number cannot be empty",
            ServerOutput::Invalid(InputError::EmptyPlate).to_string()
        );
    }

    #[test]
    fn test_status_line() {
        let status = ServerOutput::Status(vec![
            (VehicleCategory::Car, Availability { free: 1, total: 2 }),
            (VehicleCategory::Bike, Availability { free: 2, total: 2 }),
        ]);
        assert_eq!("OK STATUS CAR 1/2 BIKE 2/2", status.to_string());
    }

    #[test]
    fn test_write_appends_newline() {
        let mut buffer: Vec<u8> = Vec::new();
        assert!(ServerOutput::Goodbye.write(&mut buffer));
        assert_eq!(b"OK BYE\n".to_vec(), buffer);
    }
}
