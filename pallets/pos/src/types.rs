use codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};
use sp_arithmetic::{FixedPointNumber, FixedU128};
use sp_runtime::RuntimeDebug;
use sp_std::prelude::*;

/// Hex encoded sha256 digest identifying a record.
pub type RecordId = Vec<u8>;

pub const DEFAULT_MIN_RECORD_SIZE: u64 = 100;
pub const DEFAULT_MAX_RECORD_SIZE: u64 = 1024 * 1024;
pub const DEFAULT_RECORDS_PER_EPOCH: u64 = 10;
pub const DEFAULT_EPOCH_LENGTH: u64 = 100;
pub const DEFAULT_MIN_VERIFIED_RECORDS: u64 = 5;

/// Tunables of the record accountability engine.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, Serialize, Deserialize)]
pub struct PosParams {
	/// Smallest accepted payload, in bytes.
	pub min_record_size: u64,
	/// Largest accepted payload, in bytes.
	pub max_record_size: u64,
	/// Submissions allowed per validator within one epoch.
	pub records_per_epoch: u64,
	/// Epoch length in blocks.
	pub epoch_length: u64,
	pub slash_fraction_missing_record: FixedU128,
	pub slash_fraction_invalid_record: FixedU128,
	/// Verified records a validator needs before it counts as eligible.
	pub min_verified_records_for_eligibility: u64,
}

impl Default for PosParams {
	fn default() -> Self {
		Self {
			min_record_size: DEFAULT_MIN_RECORD_SIZE,
			max_record_size: DEFAULT_MAX_RECORD_SIZE,
			records_per_epoch: DEFAULT_RECORDS_PER_EPOCH,
			epoch_length: DEFAULT_EPOCH_LENGTH,
			slash_fraction_missing_record: FixedU128::saturating_from_rational(1, 100),
			slash_fraction_invalid_record: FixedU128::saturating_from_rational(5, 100),
			min_verified_records_for_eligibility: DEFAULT_MIN_VERIFIED_RECORDS,
		}
	}
}

impl PosParams {
	pub fn validate(&self) -> Result<(), &'static str> {
		if self.min_record_size == 0 {
			return Err("min record size must be positive");
		}
		if self.max_record_size == 0 {
			return Err("max record size must be positive");
		}
		if self.min_record_size > self.max_record_size {
			return Err("min record size cannot be greater than max record size");
		}
		if self.records_per_epoch == 0 {
			return Err("records per epoch must be positive");
		}
		if self.epoch_length == 0 {
			return Err("epoch length must be positive");
		}
		if self.slash_fraction_missing_record > FixedU128::saturating_from_integer(1) {
			return Err("slash fraction for missing record must be between 0 and 1");
		}
		if self.slash_fraction_invalid_record > FixedU128::saturating_from_integer(1) {
			return Err("slash fraction for invalid record must be between 0 and 1");
		}
		Ok(())
	}

	/// Epoch index containing `height`. Callers only hold validated params, so
	/// the epoch length is never zero.
	pub fn epoch_of(&self, height: u64) -> u64 {
		height.checked_div(self.epoch_length).unwrap_or_default()
	}
}

#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub enum RecordStatus {
	Pending,
	Verified,
	Rejected,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct Record<AccountId, BlockNumber> {
	pub id: RecordId,
	pub validator: AccountId,
	pub data: Vec<u8>,
	pub merkle_root: Vec<u8>,
	/// Unix seconds of the block the record was admitted in.
	pub timestamp: u64,
	pub block_height: BlockNumber,
	pub status: RecordStatus,
}

/// Per validator accounting row.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct ValidatorRecordStats {
	pub total_records: u64,
	pub verified_records: u64,
	pub rejected_records: u64,
	pub last_record_time: u64,
	pub last_record_block: u64,
	pub is_eligible: bool,
	pub next_required_record_time: u64,
}

impl ValidatorRecordStats {
	/// Fresh, eligible row that must see a record by `next_required_record_time`.
	pub fn new(next_required_record_time: u64) -> Self {
		Self {
			total_records: 0,
			verified_records: 0,
			rejected_records: 0,
			last_record_time: 0,
			last_record_block: 0,
			is_eligible: true,
			next_required_record_time,
		}
	}
}

/// Submission counter of one validator for a single epoch.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, Default)]
pub struct EpochQuota {
	pub epoch: u64,
	/// Epoch length the counter was taken under.
	pub epoch_length: u64,
	pub count: u64,
}

#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub enum SlashReason {
	MissingRecords,
	InvalidRecord,
}
