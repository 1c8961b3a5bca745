//! Runtime API definition for the pos pallet.
#![cfg_attr(not(feature = "std"), no_std)]

use codec::Codec;
use sp_std::vec::Vec;

pub use pallet_pos::{PosParams, Record, RecordId, ValidatorRecordStats};

sp_api::decl_runtime_apis! {
	/// Read access to the pos pallet. The host runtime implements it by forwarding to
	/// `pallet_pos::Pallet::{record, records, validator_stats, params}`.
	pub trait PosApi<AccountId, BlockNumber>
	where
		AccountId: Codec,
		BlockNumber: Codec,
	{
		/// Record with the given id, if any.
		fn record(record_id: RecordId) -> Option<Record<AccountId, BlockNumber>>;

		/// All records, or the ones submitted by `validator`.
		fn records(validator: Option<AccountId>) -> Vec<Record<AccountId, BlockNumber>>;

		fn validator_stats(validator: AccountId) -> Option<ValidatorRecordStats>;

		fn params() -> PosParams;
	}
}
