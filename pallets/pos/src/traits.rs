use codec::{Decode, Encode};
use scale_info::TypeInfo;
use sp_runtime::{DispatchError, Perbill, RuntimeDebug};
use sp_std::prelude::*;

/// Snapshot of a validator as seen by the staking system.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct ValidatorInfo<AccountId> {
	pub who: AccountId,
	/// Stake weight used when a slash is applied.
	pub power: u64,
	pub bonded: bool,
}

/// Staking collaborator. Owns the validator registry and applies slashes.
pub trait ValidatorProvider<AccountId> {
	fn validator(who: &AccountId) -> Result<ValidatorInfo<AccountId>, DispatchError>;

	fn is_bonded(who: &AccountId) -> bool {
		Self::validator(who).map(|v| v.bonded).unwrap_or(false)
	}

	fn bonded_validators() -> Result<Vec<ValidatorInfo<AccountId>>, DispatchError>;

	/// Slash `fraction` of the stake backing `who` at `block_height`. Returns the
	/// amount taken.
	fn request_slash(
		who: &AccountId,
		block_height: u64,
		power: u64,
		fraction: Perbill,
	) -> Result<u128, DispatchError>;
}

/// Notifications from the staking system about validator set changes.
pub trait ValidatorLifecycle<AccountId> {
	fn on_validator_created(who: &AccountId);
	fn on_validator_bonded(who: &AccountId);
	fn on_validator_removed(who: &AccountId);
}

#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
	/// Make `who` a bonded validator in the benchmarking runtime.
	fn bond_validator(who: &AccountId, power: u64);
}
