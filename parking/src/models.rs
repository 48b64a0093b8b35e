use crate::error::{InputError, TicketError};
use crate::{SpotId, TicketId};
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VehicleCategory {
    Car,
    Bike,
}
impl VehicleCategory {
    pub const ALL: [Self; 2] = [Self::Car, Self::Bike];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "CAR",
            Self::Bike => "BIKE",
        }
    }
}
impl Display for VehicleCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for VehicleCategory {
    type Err = InputError;

    // Case-insensitive; the category is normalised here and never leaves the boundary as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InputError::UnknownCategory(trimmed.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    plate: String,
    category: VehicleCategory,
}
impl Vehicle {
    pub fn new(plate: impl Into<String>, category: VehicleCategory) -> Result<Self, InputError> {
        let plate: String = plate.into();
        let plate = plate.trim();
        if plate.is_empty() {
            return Err(InputError::EmptyPlate);
        }
        Ok(Self {
            plate: plate.to_owned(),
            category,
        })
    }

    /// Validates the two raw strings an adapter collects from its user.
    pub fn parse(plate: &str, category: &str) -> Result<Self, InputError> {
        Self::new(plate, category.parse()?)
    }

    pub fn plate(&self) -> &str {
        &self.plate
    }

    pub fn category(&self) -> VehicleCategory {
        self.category
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingSpot {
    id: SpotId,
    accepts: VehicleCategory,
    occupant: Option<Vehicle>,
}
impl ParkingSpot {
    pub fn new(id: SpotId, accepts: VehicleCategory) -> Self {
        Self {
            id,
            accepts,
            occupant: None,
        }
    }

    pub fn id(&self) -> SpotId {
        self.id
    }

    pub fn accepts(&self) -> VehicleCategory {
        self.accepts
    }

    pub fn occupant(&self) -> Option<&Vehicle> {
        self.occupant.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.occupant.is_none()
    }

    /// Exact category match only; a car never takes a bike spot or vice versa.
    pub fn fits(&self, vehicle: &Vehicle) -> bool {
        self.accepts == vehicle.category() && self.is_available()
    }

    pub(crate) fn park(&mut self, vehicle: Vehicle) {
        debug_assert!(self.fits(&vehicle), "spot {} cannot take {:?}", self.id, vehicle);
        self.occupant = Some(vehicle);
    }

    pub(crate) fn release(&mut self) -> Option<Vehicle> {
        self.occupant.take()
    }
}

/// One park-to-exit session.
///
/// The ticket refers to its spot by id and by position in the manager's spot sequence; the spot
/// sequence stays the only owner of occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    id: TicketId,
    vehicle: Vehicle,
    spot: SpotId,
    pub(crate) spot_index: usize,
    entry: DateTime<Utc>,
    exit: Option<DateTime<Utc>>,
}
impl Ticket {
    pub(crate) fn new(id: TicketId, vehicle: Vehicle, spot: &ParkingSpot, spot_index: usize, entry: DateTime<Utc>) -> Self {
        Self {
            id,
            vehicle,
            spot: spot.id(),
            spot_index,
            entry,
            exit: None,
        }
    }

    pub fn id(&self) -> TicketId {
        self.id
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn spot(&self) -> SpotId {
        self.spot
    }

    pub fn entry_time(&self) -> DateTime<Utc> {
        self.entry
    }

    pub fn exit_time(&self) -> Option<DateTime<Utc>> {
        self.exit
    }

    /// Stamps the exit time, once. A clock that stepped backwards is clamped to the entry time
    /// so that `exit >= entry` always holds.
    pub(crate) fn mark_exit(&mut self, at: DateTime<Utc>) -> Result<(), TicketError> {
        if self.exit.is_some() {
            return Err(TicketError::AlreadyExited(self.id));
        }
        self.exit = Some(at.max(self.entry));
        Ok(())
    }

    /// Whole minutes between entry and exit, truncated.
    pub fn duration_minutes(&self) -> Result<u64, TicketError> {
        let exit = self.exit.ok_or(TicketError::NotExited(self.id))?;
        let minutes = (exit - self.entry).num_minutes();
        Ok(u64::try_from(minutes).unwrap_or_default())
    }
}
