//! Benchmarking setup for pallet-pos
#![cfg(feature = "runtime-benchmarks")]
use super::*;

#[allow(unused)]
use crate::Pallet as Pos;
use frame_benchmarking::v2::*;
use frame_support::traits::Get;
use frame_system::{pallet_prelude::BlockNumberFor, RawOrigin};
use sp_std::vec;

const POWER: u64 = 1_000;

fn bonded<T: Config>(name: &'static str, index: u32) -> T::AccountId {
	let who: T::AccountId = account(name, index, 0);
	T::BenchmarkHelper::bond_validator(&who, POWER);
	who
}

#[benchmarks]
mod benchmarks {
	use super::*;

	#[benchmark]
	fn submit_record() -> Result<(), BenchmarkError> {
		let caller = bonded::<T>("validator", 0);
		let params = Params::<T>::get();
		let data = vec![1u8; params.max_record_size as usize];

		#[extrinsic_call]
		submit_record(RawOrigin::Signed(caller.clone()), data, vec![7u8; 32]);

		assert_eq!(Pos::<T>::records(Some(&caller)).len(), 1);
		Ok(())
	}

	#[benchmark]
	fn verify_record() -> Result<(), BenchmarkError> {
		let submitter = bonded::<T>("validator", 0);
		let verifier = bonded::<T>("verifier", 1);
		let (record_id, _) = Pos::<T>::do_submit_record(
			submitter,
			vec![1u8; Params::<T>::get().min_record_size as usize],
			vec![7u8; 32],
			BlockNumberFor::<T>::from(1u32),
			1,
		)?;

		// Rejection is the heavier path, it also requests a slash.
		#[extrinsic_call]
		verify_record(RawOrigin::Signed(verifier), record_id.clone(), false);

		assert_eq!(Records::<T>::get(&record_id).map(|r| r.status), Some(RecordStatus::Rejected));
		Ok(())
	}

	#[benchmark]
	fn update_params() -> Result<(), BenchmarkError> {
		let params = PosParams { records_per_epoch: 20, ..Default::default() };

		#[extrinsic_call]
		update_params(RawOrigin::Signed(T::ParamsAuthority::get()), params.clone());

		assert_eq!(Params::<T>::get(), params);
		Ok(())
	}

	impl_benchmark_test_suite!(Pos, crate::mock::new_test_ext(), crate::mock::Test);
}
