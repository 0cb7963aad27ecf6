//! Arena-style identifiers shared by the adapters and the merge engine.
//!
//! Local and global models each number their shipments and vehicles from
//! zero. These newtypes keep the index spaces apart so that a local index can
//! never be used where an original one is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_index_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            pub const fn get(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_index_newtype!(
    /// Index of a shipment in the original (undecomposed) model.
    ShipmentIdx
);
define_index_newtype!(
    /// Index of a vehicle in the original model; the global model keeps it.
    VehicleIdx
);
define_index_newtype!(
    /// Index of a parking/staging location.
    ParkingIdx
);
define_index_newtype!(
    /// Index of a local route (round) within one parking's local model.
    RoundIdx
);

/// Identity of one round: the parking it starts from and its local vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoundKey {
    pub parking: ParkingIdx,
    pub round: RoundIdx,
}

impl RoundKey {
    pub fn new(parking: ParkingIdx, round: RoundIdx) -> Self {
        Self { parking, round }
    }
}

impl fmt::Display for RoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parking {} round {}", self.parking, self.round)
    }
}

/// What a shipment of the global model stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalShipment {
    /// A shipment served directly by the vehicle, not through a parking.
    Direct(ShipmentIdx),
    /// A virtual shipment standing for one round from a parking.
    Round(RoundKey),
}
