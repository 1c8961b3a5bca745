#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]

use frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use sp_std::marker::PhantomData;

/// Weight functions needed for pallet_pos.
pub trait WeightInfo {
    fn submit_record() -> Weight;
    fn verify_record() -> Weight;
    fn update_params() -> Weight;
}

/// Weights for pallet_pos using the Substrate node and recommended hardware.
pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: frame_system::Config> WeightInfo for SubstrateWeight<T> {
    /// Storage: `Pos::Params` (r:1 w:0)
    /// Storage: `Pos::Records` (r:1 w:1)
    /// Storage: `Pos::ValidatorStats` (r:1 w:1)
    /// Storage: `Pos::EpochRecordCount` (r:1 w:1)
    /// Storage: `Pos::RecordsByValidator` (r:0 w:1)
    fn submit_record() -> Weight {
        Weight::from_parts(35_000_000, 1_100_000)
            .saturating_add(T::DbWeight::get().reads(4))
            .saturating_add(T::DbWeight::get().writes(4))
    }

    /// Storage: `Pos::Params` (r:1 w:0)
    /// Storage: `Pos::Records` (r:1 w:1)
    /// Storage: `Pos::ValidatorStats` (r:1 w:1)
    fn verify_record() -> Weight {
        Weight::from_parts(40_000_000, 1_100_000)
            .saturating_add(T::DbWeight::get().reads(3))
            .saturating_add(T::DbWeight::get().writes(2))
    }

    /// Storage: `Pos::Params` (r:0 w:1)
    fn update_params() -> Weight {
        Weight::from_parts(10_000_000, 0)
            .saturating_add(T::DbWeight::get().writes(1))
    }
}

impl WeightInfo for () {
    fn submit_record() -> Weight {
        Weight::from_parts(35_000_000, 1_100_000)
            .saturating_add(RocksDbWeight::get().reads(4))
            .saturating_add(RocksDbWeight::get().writes(4))
    }

    fn verify_record() -> Weight {
        Weight::from_parts(40_000_000, 1_100_000)
            .saturating_add(RocksDbWeight::get().reads(3))
            .saturating_add(RocksDbWeight::get().writes(2))
    }

    fn update_params() -> Weight {
        Weight::from_parts(10_000_000, 0)
            .saturating_add(RocksDbWeight::get().writes(1))
    }
}
