use crate as pallet_pos;
use crate::{PosParams, ValidatorInfo, ValidatorProvider};
use codec::Encode;
use frame_support::{
	derive_impl,
	storage::unhashed,
	traits::{ConstU64, Hooks},
};
use sp_runtime::{BuildStorage, DispatchError, Perbill};
use std::{cell::RefCell, collections::BTreeMap};

pub type AccountId = u64;

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CHARLIE: AccountId = 3;
/// Not part of the validator set.
pub const DAVE: AccountId = 4;
pub const AUTHORITY: AccountId = 100;

pub const DEFAULT_POWER: u64 = 1_000;

// Configure a mock runtime to test the pallet.
frame_support::construct_runtime!(
	pub enum Test
	{
		System: frame_system,
		Timestamp: pallet_timestamp,
		Pos: pallet_pos,
	}
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
	type Block = frame_system::mocking::MockBlock<Test>;
	type AccountId = AccountId;
}

impl pallet_timestamp::Config for Test {
	type Moment = u64;
	type OnTimestampSet = ();
	type MinimumPeriod = ConstU64<500>;
	type WeightInfo = ();
}

thread_local! {
	static VALIDATORS: RefCell<BTreeMap<AccountId, ValidatorInfo<AccountId>>> =
		RefCell::new(BTreeMap::new());
	static SLASHES: RefCell<Vec<(AccountId, u64, u64, Perbill)>> = RefCell::new(Vec::new());
	static FAIL_SLASH: RefCell<bool> = RefCell::new(false);
	static FAIL_LISTING: RefCell<bool> = RefCell::new(false);
}

/// Staking backend keeping validators and applied slashes in thread local state.
pub struct MockStaking;

impl MockStaking {
	pub fn add_validator(who: AccountId, power: u64) {
		VALIDATORS.with(|v| {
			v.borrow_mut().insert(who, ValidatorInfo { who, power, bonded: true });
		});
	}

	pub fn unbond(who: AccountId) {
		VALIDATORS.with(|v| {
			if let Some(info) = v.borrow_mut().get_mut(&who) {
				info.bonded = false;
			}
		});
	}

	pub fn slashes() -> Vec<(AccountId, u64, u64, Perbill)> {
		SLASHES.with(|s| s.borrow().clone())
	}

	pub fn set_slash_fails(fail: bool) {
		FAIL_SLASH.with(|f| *f.borrow_mut() = fail);
	}

	pub fn set_listing_fails(fail: bool) {
		FAIL_LISTING.with(|f| *f.borrow_mut() = fail);
	}

	/// Storage key the backend writes before applying a slash.
	pub fn slash_marker(who: AccountId) -> Vec<u8> {
		[b"mock_staking:slash".to_vec(), who.encode()].concat()
	}

	fn reset() {
		VALIDATORS.with(|v| v.borrow_mut().clear());
		SLASHES.with(|s| s.borrow_mut().clear());
		FAIL_SLASH.with(|f| *f.borrow_mut() = false);
		FAIL_LISTING.with(|f| *f.borrow_mut() = false);
	}
}

impl ValidatorProvider<AccountId> for MockStaking {
	fn validator(who: &AccountId) -> Result<ValidatorInfo<AccountId>, DispatchError> {
		VALIDATORS
			.with(|v| v.borrow().get(who).cloned())
			.ok_or(DispatchError::CannotLookup)
	}

	fn bonded_validators() -> Result<Vec<ValidatorInfo<AccountId>>, DispatchError> {
		if FAIL_LISTING.with(|f| *f.borrow()) {
			return Err(DispatchError::Unavailable);
		}
		Ok(VALIDATORS.with(|v| v.borrow().values().filter(|i| i.bonded).cloned().collect()))
	}

	fn request_slash(
		who: &AccountId,
		block_height: u64,
		power: u64,
		fraction: Perbill,
	) -> Result<u128, DispatchError> {
		unhashed::put(&Self::slash_marker(*who), &block_height);
		if FAIL_SLASH.with(|f| *f.borrow()) {
			return Err(DispatchError::Unavailable);
		}
		SLASHES.with(|s| s.borrow_mut().push((*who, block_height, power, fraction)));
		Ok(fraction.mul_floor(power as u128))
	}
}

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<AccountId> for MockStaking {
	fn bond_validator(who: &AccountId, power: u64) {
		Self::add_validator(*who, power);
	}
}

impl pallet_pos::Config for Test {
	type RuntimeEvent = RuntimeEvent;
	type Staking = MockStaking;
	type TimeProvider = Timestamp;
	type ParamsAuthority = ConstU64<AUTHORITY>;
	type ExpectedBlockTime = ConstU64<1>;
	type WeightInfo = ();
	#[cfg(feature = "runtime-benchmarks")]
	type BenchmarkHelper = MockStaking;
}

/// Params used by most tests: short epochs and a small quota.
pub fn test_params() -> PosParams {
	PosParams { records_per_epoch: 2, epoch_length: 10, ..Default::default() }
}

// Build genesis storage according to the mock runtime.
pub fn new_test_ext() -> sp_io::TestExternalities {
	new_test_ext_with(PosParams::default())
}

pub fn new_test_ext_with(params: PosParams) -> sp_io::TestExternalities {
	let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();
	pallet_pos::GenesisConfig::<Test> { params, validators: vec![] }
		.assimilate_storage(&mut t)
		.unwrap();

	MockStaking::reset();
	for who in [ALICE, BOB, CHARLIE] {
		MockStaking::add_validator(who, DEFAULT_POWER);
	}

	let mut ext = sp_io::TestExternalities::new(t);
	ext.execute_with(|| {
		System::set_block_number(1);
		Timestamp::set_timestamp(1_000);
	});
	ext
}

/// Advance to block `n`, one second per block. The timestamp is set between
/// the pallet hooks, the way the timestamp inherent lands in a real block.
pub fn run_to_block(n: u64) {
	while System::block_number() < n {
		let next = System::block_number() + 1;
		System::set_block_number(next);
		Pos::on_initialize(next);
		Timestamp::set_timestamp(next * 1_000);
		Pos::on_finalize(next);
	}
}

/// Payload of `len` bytes, distinct per `seed`.
pub fn payload(seed: u8, len: usize) -> Vec<u8> {
	vec![seed; len]
}

pub fn merkle_root() -> Vec<u8> {
	sp_io::hashing::blake2_256(b"merkle").to_vec()
}
