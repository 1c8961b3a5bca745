//! # Proof of Record Pallet
//!
//! ## Overview
//!
//! Validators submit time stamped records (a data blob plus its merkle root) and
//! peer validators verify them. The pallet keeps per validator accounting of
//! submissions and verification outcomes, enforces a per epoch submission quota
//! and asks the staking system to slash validators that fall behind or get
//! records rejected.
//!
//! ## Interface
//!
//! ### Dispatchable Functions
//!
//! - `submit_record`: A bonded validator submits a new record.
//! - `verify_record`: A bonded validator approves or rejects a pending record.
//! - `update_params`: The params authority replaces the pallet parameters.
//!
//! At every epoch boundary `on_initialize` audits all bonded validators and
//! slashes the ones that are not eligible anymore.
//!
//! The staking system reports validator set changes through
//! [`ValidatorLifecycle`], implemented by [`Pallet`].

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

pub mod traits;
pub mod types;
pub mod weights;

#[cfg(feature = "runtime-benchmarks")]
pub use traits::BenchmarkHelper;
pub use traits::{ValidatorInfo, ValidatorLifecycle, ValidatorProvider};
pub use types::*;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub const LOG_TARGET: &str = "runtime::pos";

#[frame_support::pallet]
pub mod pallet {
	use super::*;
	use frame_support::{pallet_prelude::*, storage::with_storage_layer, traits::UnixTime};
	use frame_system::pallet_prelude::*;
	use sp_io::hashing::sha2_256;
	use sp_runtime::{
		format, traits::Zero, FixedPointNumber, FixedU128, Perbill, SaturatedConversion,
	};
	use sp_std::vec::Vec;

	pub type RecordOf<T> =
		Record<<T as frame_system::Config>::AccountId, BlockNumberFor<T>>;

	#[pallet::pallet]
	#[pallet::without_storage_info]
	pub struct Pallet<T>(_);

	#[pallet::config]
	pub trait Config: frame_system::Config {
		/// Because this pallet emits events, it depends on the runtime's definition of an event.
		type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

		/// Validator registry and slashing backend.
		type Staking: ValidatorProvider<Self::AccountId>;

		/// Wall clock of the chain, read once per transition.
		type TimeProvider: UnixTime;

		/// Account allowed to change the pallet parameters.
		type ParamsAuthority: Get<Self::AccountId>;

		/// Seconds per block. Converts the epoch length into a deadline.
		#[pallet::constant]
		type ExpectedBlockTime: Get<u64>;

		/// Weight information for extrinsics in this pallet.
		type WeightInfo: WeightInfo;

		#[cfg(feature = "runtime-benchmarks")]
		type BenchmarkHelper: BenchmarkHelper<Self::AccountId>;
	}

	#[pallet::storage]
	#[pallet::getter(fn params)]
	pub type Params<T> = StorageValue<_, PosParams, ValueQuery>;

	#[pallet::storage]
	pub type Records<T: Config> = StorageMap<_, Blake2_128Concat, RecordId, RecordOf<T>>;

	/// Record ids per validator, used for filtered listing and quota recounts.
	#[pallet::storage]
	pub type RecordsByValidator<T: Config> = StorageDoubleMap<
		_,
		Blake2_128Concat,
		T::AccountId,
		Blake2_128Concat,
		RecordId,
		(),
	>;

	#[pallet::storage]
	pub type ValidatorStats<T: Config> =
		StorageMap<_, Blake2_128Concat, T::AccountId, ValidatorRecordStats>;

	#[pallet::storage]
	pub type EpochRecordCount<T: Config> =
		StorageMap<_, Blake2_128Concat, T::AccountId, EpochQuota>;

	/// Height of the last epoch boundary that was audited.
	#[pallet::storage]
	pub type LastSweepHeight<T> = StorageValue<_, u64>;

	#[pallet::event]
	#[pallet::generate_deposit(pub(super) fn deposit_event)]
	pub enum Event<T: Config> {
		RecordCreated {
			record_id: RecordId,
			validator: T::AccountId,
			block_height: BlockNumberFor<T>,
			merkle_root: Vec<u8>,
			timestamp: u64,
		},
		RecordVerified {
			record_id: RecordId,
			verifier: T::AccountId,
			validator: T::AccountId,
			approved: bool,
			status: RecordStatus,
		},
		ValidatorSlashed {
			validator: T::AccountId,
			reason: SlashReason,
			fraction: Perbill,
			amount: u128,
			record_id: Option<RecordId>,
		},
		/// The staking system refused a slash. State changes of the triggering
		/// transition are kept.
		SlashRequestFailed { validator: T::AccountId, reason: SlashReason, error: DispatchError },
		ValidatorMarkedIneligible { validator: T::AccountId, epoch: u64 },
		ValidatorStatsInitialized { validator: T::AccountId },
		ParamsUpdated { params: PosParams },
		EpochSwept { epoch: u64, checked: u32, ineligible: u32 },
	}

	#[pallet::error]
	pub enum Error<T> {
		/// Payload size outside of the configured bounds.
		InvalidRecordSize,
		/// Merkle root is empty.
		InvalidMerkleRoot,
		/// Caller is not a bonded validator.
		NotValidator,
		DuplicateRecord,
		/// Validator already used its quota for the current epoch.
		EpochRecordsExceeded,
		RecordNotFound,
		/// Record was already approved or rejected.
		RecordAlreadyVerified,
		ValidatorStatsNotFound,
		/// Caller is not the params authority.
		InvalidSigner,
		InvalidParams,
	}

	#[pallet::genesis_config]
	#[derive(frame_support::DefaultNoBound)]
	pub struct GenesisConfig<T: Config> {
		pub params: PosParams,
		/// Validators that start with an eligible accounting row.
		pub validators: Vec<T::AccountId>,
	}

	#[pallet::genesis_build]
	impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
		fn build(&self) {
			if let Err(reason) = self.params.validate() {
				panic!("invalid pos genesis params: {}", reason);
			}
			Params::<T>::put(&self.params);
			let next_required = Pallet::<T>::deadline_after(0, &self.params);
			for validator in &self.validators {
				if !ValidatorStats::<T>::contains_key(validator) {
					ValidatorStats::<T>::insert(
						validator,
						ValidatorRecordStats::new(next_required),
					);
				}
			}
		}
	}

	#[pallet::hooks]
	impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
		/// Reserves the audit weight. The audit itself runs in `on_finalize`, once
		/// the timestamp of this block is set.
		fn on_initialize(n: BlockNumberFor<T>) -> Weight {
			let params = Params::<T>::get();
			if !Self::is_epoch_boundary(n, &params) {
				return T::DbWeight::get().reads(1);
			}
			let validators = T::Staking::bonded_validators()
				.map(|v| v.len() as u64)
				.unwrap_or_default();
			T::DbWeight::get().reads_writes(
				2u64.saturating_add(validators.saturating_mul(2)),
				1u64.saturating_add(validators.saturating_mul(3)),
			)
		}

		fn on_finalize(n: BlockNumberFor<T>) {
			if !Self::is_epoch_boundary(n, &Params::<T>::get()) {
				return;
			}
			let now = T::TimeProvider::now().as_secs();
			let _ = Self::do_epoch_sweep(n, now);
		}
	}

	#[pallet::call]
	impl<T: Config> Pallet<T> {
		#[pallet::call_index(0)]
		#[pallet::weight(T::WeightInfo::submit_record())]
		pub fn submit_record(
			origin: OriginFor<T>,
			data: Vec<u8>,
			merkle_root: Vec<u8>,
		) -> DispatchResult {
			let who = ensure_signed(origin)?;
			let height = frame_system::Pallet::<T>::block_number();
			let now = T::TimeProvider::now().as_secs();

			Self::do_submit_record(who, data, merkle_root, height, now)?;
			Ok(())
		}

		#[pallet::call_index(1)]
		#[pallet::weight(T::WeightInfo::verify_record())]
		pub fn verify_record(
			origin: OriginFor<T>,
			record_id: RecordId,
			approved: bool,
		) -> DispatchResult {
			let verifier = ensure_signed(origin)?;
			ensure!(T::Staking::is_bonded(&verifier), Error::<T>::NotValidator);
			let height = frame_system::Pallet::<T>::block_number();

			Self::do_verify_record(verifier, record_id, approved, height)
		}

		#[pallet::call_index(2)]
		#[pallet::weight(T::WeightInfo::update_params())]
		pub fn update_params(origin: OriginFor<T>, params: PosParams) -> DispatchResult {
			let who = ensure_signed(origin)?;
			ensure!(who == T::ParamsAuthority::get(), Error::<T>::InvalidSigner);

			if let Err(reason) = params.validate() {
				log::warn!(target: LOG_TARGET, "rejected params update: {}", reason);
				return Err(Error::<T>::InvalidParams.into());
			}

			Params::<T>::put(&params);
			Self::deposit_event(Event::ParamsUpdated { params });
			Ok(())
		}
	}

	impl<T: Config> Pallet<T> {
		/// Admit a record for `validator`. Returns the new record id and the
		/// timestamp it was stamped with.
		pub fn do_submit_record(
			validator: T::AccountId,
			data: Vec<u8>,
			merkle_root: Vec<u8>,
			height: BlockNumberFor<T>,
			now: u64,
		) -> Result<(RecordId, u64), DispatchError> {
			let params = Params::<T>::get();

			let size = data.len() as u64;
			ensure!(
				size >= params.min_record_size && size <= params.max_record_size,
				Error::<T>::InvalidRecordSize
			);
			ensure!(!merkle_root.is_empty(), Error::<T>::InvalidMerkleRoot);
			ensure!(T::Staking::is_bonded(&validator), Error::<T>::NotValidator);

			let record_id = Self::record_id(&validator, &data, now);
			ensure!(!Records::<T>::contains_key(&record_id), Error::<T>::DuplicateRecord);

			let height_u64: u64 = height.saturated_into();
			let current_epoch = params.epoch_of(height_u64);
			let mut stats = Self::stats_or_default(&validator, now, &params);
			let in_epoch = Self::records_in_epoch(&validator, current_epoch, &params);
			if params.epoch_of(stats.last_record_block) == current_epoch {
				ensure!(in_epoch < params.records_per_epoch, Error::<T>::EpochRecordsExceeded);
			}

			let record = Record {
				id: record_id.clone(),
				validator: validator.clone(),
				data,
				merkle_root: merkle_root.clone(),
				timestamp: now,
				block_height: height,
				status: RecordStatus::Pending,
			};
			Records::<T>::insert(&record_id, record);
			RecordsByValidator::<T>::insert(&validator, &record_id, ());
			EpochRecordCount::<T>::insert(
				&validator,
				EpochQuota {
					epoch: current_epoch,
					epoch_length: params.epoch_length,
					count: in_epoch.saturating_add(1),
				},
			);

			stats.total_records = stats.total_records.saturating_add(1);
			stats.last_record_time = now;
			stats.last_record_block = height_u64;
			ValidatorStats::<T>::insert(&validator, stats);

			Self::deposit_event(Event::RecordCreated {
				record_id: record_id.clone(),
				validator,
				block_height: height,
				merkle_root,
				timestamp: now,
			});

			Ok((record_id, now))
		}

		/// Settle a pending record. A rejection additionally requests a slash of
		/// the submitter; that request never fails the verification.
		pub fn do_verify_record(
			verifier: T::AccountId,
			record_id: RecordId,
			approved: bool,
			height: BlockNumberFor<T>,
		) -> DispatchResult {
			let params = Params::<T>::get();
			let mut record = Records::<T>::get(&record_id).ok_or(Error::<T>::RecordNotFound)?;
			ensure!(record.status == RecordStatus::Pending, Error::<T>::RecordAlreadyVerified);

			record.status =
				if approved { RecordStatus::Verified } else { RecordStatus::Rejected };
			let status = record.status;
			let validator = record.validator.clone();

			let mut stats = Self::stats_or_fail(&validator)?;
			if approved {
				stats.verified_records = stats.verified_records.saturating_add(1);
			} else {
				stats.rejected_records = stats.rejected_records.saturating_add(1);
			}
			stats.is_eligible =
				stats.verified_records >= params.min_verified_records_for_eligibility;

			Records::<T>::insert(&record_id, record);
			ValidatorStats::<T>::insert(&validator, stats);

			if !approved {
				Self::try_slash(
					&validator,
					height.saturated_into(),
					params.slash_fraction_invalid_record,
					SlashReason::InvalidRecord,
					Some(record_id.clone()),
				);
			}

			Self::deposit_event(Event::RecordVerified {
				record_id,
				verifier,
				validator,
				approved,
				status,
			});

			Ok(())
		}

		/// Audit every bonded validator when `n` is an epoch boundary. Runs at
		/// most once per boundary.
		pub fn do_epoch_sweep(n: BlockNumberFor<T>, now: u64) -> Weight {
			let mut reads: u64 = 1;
			let mut writes: u64 = 0;
			let params = Params::<T>::get();
			let height: u64 = n.saturated_into();

			if !Self::is_epoch_boundary(n, &params) {
				return T::DbWeight::get().reads(reads);
			}
			reads += 1;
			if LastSweepHeight::<T>::get() == Some(height) {
				return T::DbWeight::get().reads(reads);
			}

			let validators = match T::Staking::bonded_validators() {
				Ok(validators) => validators,
				Err(e) => {
					log::error!(
						target: LOG_TARGET,
						"❌ Failed to fetch bonded validators at block {}: {:?}",
						height,
						e
					);
					return T::DbWeight::get().reads(reads);
				},
			};

			let epoch = params.epoch_of(height);
			let mut ineligible: u32 = 0;
			for info in validators.iter() {
				reads += 1;
				if Self::check_eligibility(&info.who, now, height, &params) {
					let next_required = Self::deadline_after(now, &params);
					let advanced = ValidatorStats::<T>::mutate(&info.who, |maybe_stats| {
						maybe_stats
							.as_mut()
							.map(|stats| stats.next_required_record_time = next_required)
							.is_some()
					});
					if advanced {
						writes += 1;
					}
					continue;
				}

				ineligible = ineligible.saturating_add(1);
				log::info!(
					target: LOG_TARGET,
					"⚠️ Validator {:?} is not eligible in epoch {}",
					info.who,
					epoch
				);
				Self::try_slash(
					&info.who,
					height,
					params.slash_fraction_missing_record,
					SlashReason::MissingRecords,
					None,
				);
				writes += 1;

				match ValidatorStats::<T>::get(&info.who) {
					Some(mut stats) => {
						stats.is_eligible = false;
						ValidatorStats::<T>::insert(&info.who, stats);
						writes += 1;
						Self::deposit_event(Event::ValidatorMarkedIneligible {
							validator: info.who.clone(),
							epoch,
						});
					},
					None => {
						log::warn!(
							target: LOG_TARGET,
							"No record stats for validator {:?}, skipping eligibility update",
							info.who
						);
					},
				}
			}

			LastSweepHeight::<T>::put(height);
			writes += 1;
			Self::deposit_event(Event::EpochSwept {
				epoch,
				checked: validators.len() as u32,
				ineligible,
			});

			T::DbWeight::get().reads_writes(reads, writes)
		}

		fn is_epoch_boundary(n: BlockNumberFor<T>, params: &PosParams) -> bool {
			let height: u64 = n.saturated_into();
			!n.is_zero() && height.checked_rem(params.epoch_length) == Some(0)
		}

		/// Whether `who` currently satisfies the record obligations.
		pub fn check_eligibility(
			who: &T::AccountId,
			now: u64,
			height: u64,
			params: &PosParams,
		) -> bool {
			let Some(stats) = ValidatorStats::<T>::get(who) else {
				return false;
			};
			if stats.verified_records < params.min_verified_records_for_eligibility {
				return false;
			}
			if now > stats.next_required_record_time &&
				params.epoch_of(stats.last_record_block) < params.epoch_of(height)
			{
				return false;
			}
			stats.is_eligible
		}

		/// Create an eligible accounting row for `who` unless one exists.
		pub fn initialize_validator_stats(who: &T::AccountId) {
			if ValidatorStats::<T>::contains_key(who) {
				return;
			}
			let params = Params::<T>::get();
			let now = T::TimeProvider::now().as_secs();
			ValidatorStats::<T>::insert(
				who,
				ValidatorRecordStats::new(Self::deadline_after(now, &params)),
			);
			Self::deposit_event(Event::ValidatorStatsInitialized { validator: who.clone() });
		}

		pub fn record(record_id: &RecordId) -> Result<RecordOf<T>, Error<T>> {
			Records::<T>::get(record_id).ok_or(Error::<T>::RecordNotFound)
		}

		/// All records, or only the ones submitted by `validator`.
		pub fn records(validator: Option<&T::AccountId>) -> Vec<RecordOf<T>> {
			match validator {
				Some(who) => RecordsByValidator::<T>::iter_key_prefix(who)
					.filter_map(|id| Records::<T>::get(&id))
					.collect(),
				None => Records::<T>::iter_values().collect(),
			}
		}

		pub fn validator_stats(who: &T::AccountId) -> Result<ValidatorRecordStats, Error<T>> {
			ValidatorStats::<T>::get(who).ok_or(Error::<T>::ValidatorStatsNotFound)
		}

		pub fn all_validator_stats() -> Vec<(T::AccountId, ValidatorRecordStats)> {
			ValidatorStats::<T>::iter().collect()
		}

		pub fn is_eligible(who: &T::AccountId) -> bool {
			let height: u64 = frame_system::Pallet::<T>::block_number().saturated_into();
			let now = T::TimeProvider::now().as_secs();
			Self::check_eligibility(who, now, height, &Params::<T>::get())
		}

		/// Stats row of `who`, or the row a new validator would start with. Never
		/// writes.
		pub(crate) fn stats_or_default(
			who: &T::AccountId,
			now: u64,
			params: &PosParams,
		) -> ValidatorRecordStats {
			ValidatorStats::<T>::get(who)
				.unwrap_or_else(|| ValidatorRecordStats::new(Self::deadline_after(now, params)))
		}

		pub(crate) fn stats_or_fail(
			who: &T::AccountId,
		) -> Result<ValidatorRecordStats, DispatchError> {
			ValidatorStats::<T>::get(who).ok_or_else(|| Error::<T>::ValidatorStatsNotFound.into())
		}

		/// Records `who` submitted in `epoch`, as counted by the quota index.
		fn records_in_epoch(who: &T::AccountId, epoch: u64, params: &PosParams) -> u64 {
			match EpochRecordCount::<T>::get(who) {
				Some(quota) if quota.epoch_length == params.epoch_length =>
					if quota.epoch == epoch {
						quota.count
					} else {
						0
					},
				// Counter was taken under another epoch length.
				Some(_) => RecordsByValidator::<T>::iter_key_prefix(who)
					.filter_map(|id| Records::<T>::get(&id))
					.filter(|r| params.epoch_of(r.block_height.saturated_into()) == epoch)
					.count() as u64,
				None => 0,
			}
		}

		fn record_id(who: &T::AccountId, data: &[u8], now: u64) -> RecordId {
			let mut preimage = who.encode();
			preimage.extend_from_slice(data);
			preimage.extend_from_slice(format!("{}", now).as_bytes());
			hex::encode(sha2_256(&preimage)).into_bytes()
		}

		pub(crate) fn deadline_after(now: u64, params: &PosParams) -> u64 {
			now.saturating_add(params.epoch_length.saturating_mul(T::ExpectedBlockTime::get()))
		}

		fn to_perbill(fraction: FixedU128) -> Perbill {
			Perbill::from_rational(fraction.into_inner(), FixedU128::accuracy())
		}

		/// Ask the staking system to slash `who`. Runs in its own storage layer;
		/// failures are logged and reported through an event only.
		fn try_slash(
			who: &T::AccountId,
			height: u64,
			fraction: FixedU128,
			reason: SlashReason,
			record_id: Option<RecordId>,
		) {
			let fraction = Self::to_perbill(fraction);
			let result = with_storage_layer(|| -> Result<u128, DispatchError> {
				let info = T::Staking::validator(who)?;
				T::Staking::request_slash(who, height, info.power, fraction)
			});

			match result {
				Ok(amount) => {
					log::info!(
						target: LOG_TARGET,
						"✅ Slashed validator {:?} by {:?} ({:?}), amount {}",
						who,
						fraction,
						reason,
						amount
					);
					Self::deposit_event(Event::ValidatorSlashed {
						validator: who.clone(),
						reason,
						fraction,
						amount,
						record_id,
					});
				},
				Err(error) => {
					log::error!(
						target: LOG_TARGET,
						"❌ Failed to slash validator {:?} ({:?}): {:?}",
						who,
						reason,
						error
					);
					Self::deposit_event(Event::SlashRequestFailed {
						validator: who.clone(),
						reason,
						error,
					});
				},
			}
		}
	}

	impl<T: Config> ValidatorLifecycle<T::AccountId> for Pallet<T> {
		fn on_validator_created(who: &T::AccountId) {
			Self::initialize_validator_stats(who);
		}

		fn on_validator_bonded(who: &T::AccountId) {
			Self::initialize_validator_stats(who);
		}

		fn on_validator_removed(_who: &T::AccountId) {}
	}
}
