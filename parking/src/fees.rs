use crate::models::VehicleCategory;
use std::fmt::{Display, Formatter};

pub const MINUTES_PER_HOUR: u64 = 60;

const CAR_RATE: FeeRule = FeeRule { base: 20, per_hour: 10 };
const BIKE_RATE: FeeRule = FeeRule { base: 10, per_hour: 5 };

/// An amount in whole currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fee(u64);
impl Fee {
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    pub const fn units(&self) -> u64 {
        self.0
    }
}
impl Display for Fee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.00", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRule {
    pub base: u64,
    pub per_hour: u64,
}
impl FeeRule {
    pub const fn for_category(category: VehicleCategory) -> Self {
        match category {
            VehicleCategory::Car => CAR_RATE,
            VehicleCategory::Bike => BIKE_RATE,
        }
    }

    /// Only completed hours are charged: 119 minutes bills one hour, not two.
    pub fn charge(&self, elapsed_minutes: u64) -> Fee {
        let hours = elapsed_minutes / MINUTES_PER_HOUR;
        Fee(self.base.saturating_add(self.per_hour.saturating_mul(hours)))
    }
}

pub fn calculate(category: VehicleCategory, elapsed_minutes: u64) -> Fee {
    FeeRule::for_category(category).charge(elapsed_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_car_rates() {
        assert_eq!(Fee::new(20), calculate(VehicleCategory::Car, 0));
        assert_eq!(Fee::new(20), calculate(VehicleCategory::Car, 59));
        assert_eq!(Fee::new(30), calculate(VehicleCategory::Car, 60));
        assert_eq!(Fee::new(40), calculate(VehicleCategory::Car, 125));
    }

    #[test]
    fn test_bike_rates() {
        assert_eq!(Fee::new(10), calculate(VehicleCategory::Bike, 0));
        assert_eq!(Fee::new(10), calculate(VehicleCategory::Bike, 59));
        assert_eq!(Fee::new(15), calculate(VehicleCategory::Bike, 119));
        assert_eq!(Fee::new(20), calculate(VehicleCategory::Bike, 120));
    }

    #[test]
    fn test_display() {
        assert_eq!("40.00", Fee::new(40).to_string());
    }

    #[test]
    fn test_longest_stay_is_exact() {
        assert_eq!(Fee::new(20 + 10 * (u64::MAX / 60)), calculate(VehicleCategory::Car, u64::MAX));
    }

    #[test]
    fn test_saturates_instead_of_overflowing() {
        assert_eq!(Fee::new(u64::MAX), FeeRule { base: u64::MAX, per_hour: 1 }.charge(60));
        assert_eq!(Fee::new(u64::MAX), FeeRule { base: 0, per_hour: u64::MAX }.charge(120));
        assert_eq!(Fee::new(u64::MAX), FeeRule { base: 1, per_hour: u64::MAX }.charge(60));
    }

    fn category() -> impl Strategy<Value = VehicleCategory> {
        prop_oneof![Just(VehicleCategory::Car), Just(VehicleCategory::Bike)]
    }

    proptest! {
        #[test]
        fn fee_is_monotonic(category in category(), a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let (shorter, longer) = (a.min(b), a.max(b));
            prop_assert!(calculate(category, shorter) <= calculate(category, longer));
        }

        #[test]
        fn fee_never_below_base(category in category(), minutes in any::<u64>()) {
            prop_assert!(calculate(category, minutes).units() >= FeeRule::for_category(category).base);
        }
    }
}
