use crate::clock::{Clock, SystemClock};
use crate::error::{LayoutError, ParkingError};
use crate::fees::{self, Fee};
use crate::models::{ParkingSpot, Ticket, Vehicle, VehicleCategory};
use crate::{SpotId, TicketId};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

const FIRST_TICKET_ID: TicketId = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Availability {
    pub free: usize,
    pub total: usize,
}

/// The closed ticket handed back by [`ParkingManager::checkout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub ticket: Ticket,
    pub minutes: u64,
    pub fee: Fee,
}

/// Owns the spot inventory and the set of open tickets.
///
/// Every spot holding a vehicle has exactly one active ticket pointing at it, and every active
/// ticket points at an occupied spot. Both `park` and `exit` take `&mut self`, so callers that
/// share a manager must serialise access to it (see [`crate::app::Application`]).
///
/// Spots are scanned first-fit in the order they were given; at larger scale a per-category
/// free list would avoid rescanning occupied spots.
#[derive(Debug)]
pub struct ParkingManager<C: Clock = SystemClock> {
    spots: Vec<ParkingSpot>,
    active: BTreeMap<TicketId, Ticket>,
    next_ticket: TicketId,
    clock: C,
}

impl ParkingManager<SystemClock> {
    pub fn new(spots: Vec<ParkingSpot>) -> Result<Self, LayoutError> {
        Self::with_clock(spots, SystemClock)
    }
}

impl ParkingManager {
    /// Two car spots and two bike spots, interleaved.
    pub fn default_layout() -> Vec<ParkingSpot> {
        Self::layout(&[
            VehicleCategory::Car,
            VehicleCategory::Bike,
            VehicleCategory::Car,
            VehicleCategory::Bike,
        ])
    }

    /// Numbers spots from 1 in the order given.
    pub fn layout(categories: &[VehicleCategory]) -> Vec<ParkingSpot> {
        (1..)
            .zip(categories)
            .map(|(id, category)| ParkingSpot::new(id, *category))
            .collect()
    }
}

impl<C: Clock> ParkingManager<C> {
    pub fn with_clock(spots: Vec<ParkingSpot>, clock: C) -> Result<Self, LayoutError> {
        if spots.is_empty() {
            return Err(LayoutError::Empty);
        }
        let mut seen: HashSet<SpotId> = HashSet::with_capacity(spots.len());
        for spot in &spots {
            if !seen.insert(spot.id()) {
                return Err(LayoutError::DuplicateSpot(spot.id()));
            }
        }
        // Occupancy only ever comes from `park`, so every spot starts empty.
        let spots = spots
            .into_iter()
            .map(|spot| ParkingSpot::new(spot.id(), spot.accepts()))
            .collect::<Vec<_>>();
        info!("Parking facility opened with {} spots.", spots.len());
        Ok(Self {
            spots,
            active: BTreeMap::new(),
            next_ticket: FIRST_TICKET_ID,
            clock,
        })
    }

    /// Parks `vehicle` in the first free spot of its category and issues a ticket for it.
    pub fn park(&mut self, vehicle: Vehicle) -> Result<Ticket, ParkingError> {
        let Some(index) = self.spots.iter().position(|spot| spot.fits(&vehicle)) else {
            warn!(plate = vehicle.plate(), "No free {} spot.", vehicle.category());
            return Err(ParkingError::NoSpotAvailable(vehicle.category()));
        };

        let id = self.next_ticket;
        self.next_ticket += 1;

        let ticket = Ticket::new(id, vehicle.clone(), &self.spots[index], index, self.clock.now());
        self.spots[index].park(vehicle);
        self.active.insert(id, ticket.clone());

        info!(
            ticket = id,
            spot = ticket.spot(),
            plate = ticket.vehicle().plate(),
            "{} parked.",
            ticket.vehicle().category()
        );
        Ok(ticket)
    }

    /// Closes the ticket, frees its spot and returns the fee owed.
    pub fn exit(&mut self, ticket: TicketId) -> Result<Fee, ParkingError> {
        self.checkout(ticket).map(|receipt| receipt.fee)
    }

    /// Like [`Self::exit`], but hands back the closed ticket alongside the fee.
    pub fn checkout(&mut self, id: TicketId) -> Result<Receipt, ParkingError> {
        let now = self.clock.now();

        // Stamp a copy first: nothing below may fail once the live state starts changing.
        let Some(mut ticket) = self.active.get(&id).cloned() else {
            warn!(ticket = id, "Exit requested for an inactive ticket.");
            return Err(ParkingError::InvalidTicket(id));
        };
        if ticket.mark_exit(now).is_err() {
            warn!(ticket = id, "Active ticket was already stamped.");
            return Err(ParkingError::InvalidTicket(id));
        }
        let minutes = ticket.duration_minutes().unwrap_or_default();
        let fee = fees::calculate(ticket.vehicle().category(), minutes);

        self.active.remove(&id);
        let released = self.spots[ticket.spot_index].release();
        debug_assert_eq!(released.as_ref(), Some(ticket.vehicle()));

        info!(ticket = id, spot = ticket.spot(), minutes, %fee, "Vehicle exited.");
        Ok(Receipt { ticket, minutes, fee })
    }

    pub fn spots(&self) -> &[ParkingSpot] {
        &self.spots
    }

    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.active.get(&id)
    }

    pub fn active_tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.active.values()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn availability(&self, category: VehicleCategory) -> Availability {
        let availability = self
            .spots
            .iter()
            .filter(|spot| spot.accepts() == category)
            .fold(Availability::default(), |mut availability, spot| {
                availability.total += 1;
                if spot.is_available() {
                    availability.free += 1;
                }
                availability
            });
        debug!(%category, free = availability.free, total = availability.total, "Availability queried.");
        availability
    }
}
