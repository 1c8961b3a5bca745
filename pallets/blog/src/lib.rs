//! # Blog Pallet
//!
//! Accounts publish posts made of a title and a body. Only the creator of a
//! post may edit or delete it. Post ids come from a counter that never goes
//! back, so ids of deleted posts are not reused.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(test)]
mod mock;


pub use pallet::*;

const LOG_TARGET: &str = "runtime::blog";

#[frame_support::pallet]
pub mod pallet {
	use super::*;
	use frame_support::pallet_prelude::*;
	use frame_system::pallet_prelude::*;
	use sp_runtime::{ArithmeticError, RuntimeDebug};
	use sp_std::vec::Vec;

	#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
	pub struct Post<AccountId, BlockNumber> {
		pub id: u64,
		pub creator: AccountId,
		pub title: Vec<u8>,
		pub body: Vec<u8>,
		pub created_at: BlockNumber,
	}

	pub type PostOf<T> = Post<<T as frame_system::Config>::AccountId, BlockNumberFor<T>>;

	#[pallet::pallet]
	#[pallet::without_storage_info]
	pub struct Pallet<T>(_);

	#[pallet::config]
	pub trait Config: frame_system::Config {
		type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

		#[pallet::constant]
		type MaxTitleLength: Get<u32>;

		#[pallet::constant]
		type MaxBodyLength: Get<u32>;
	}

	#[pallet::storage]
	#[pallet::getter(fn post)]
	pub type Posts<T: Config> = StorageMap<_, Blake2_128Concat, u64, PostOf<T>>;

	/// Id handed to the next created post.
	#[pallet::storage]
	#[pallet::getter(fn post_count)]
	pub type PostCount<T> = StorageValue<_, u64, ValueQuery>;

	#[pallet::event]
	#[pallet::generate_deposit(pub(super) fn deposit_event)]
	pub enum Event<T: Config> {
		PostCreated { id: u64, creator: T::AccountId },
		PostUpdated { id: u64, editor: T::AccountId },
		PostDeleted { id: u64, creator: T::AccountId },
	}

	#[pallet::error]
	pub enum Error<T> {
		PostNotFound,
		/// Only the creator may change a post.
		NotPostOwner,
		EmptyTitle,
		TitleTooLong,
		BodyTooLong,
	}

	#[pallet::call]
	impl<T: Config> Pallet<T> {
		#[pallet::call_index(0)]
		#[pallet::weight(T::DbWeight::get().reads_writes(1, 2))]
		pub fn create_post(origin: OriginFor<T>, title: Vec<u8>, body: Vec<u8>) -> DispatchResult {
			let creator = ensure_signed(origin)?;
			Self::ensure_valid(&title, &body)?;

			let id = PostCount::<T>::get();
			let next = id.checked_add(1).ok_or(ArithmeticError::Overflow)?;

			let post = Post {
				id,
				creator: creator.clone(),
				title,
				body,
				created_at: frame_system::Pallet::<T>::block_number(),
			};
			Posts::<T>::insert(id, post);
			PostCount::<T>::put(next);

			Self::deposit_event(Event::PostCreated { id, creator });
			Ok(())
		}

		#[pallet::call_index(1)]
		#[pallet::weight(T::DbWeight::get().reads_writes(1, 1))]
		pub fn update_post(
			origin: OriginFor<T>,
			id: u64,
			title: Vec<u8>,
			body: Vec<u8>,
		) -> DispatchResult {
			let editor = ensure_signed(origin)?;
			Self::ensure_valid(&title, &body)?;

			Posts::<T>::try_mutate(id, |maybe_post| -> DispatchResult {
				let post = maybe_post.as_mut().ok_or(Error::<T>::PostNotFound)?;
				ensure!(post.creator == editor, Error::<T>::NotPostOwner);
				post.title = title;
				post.body = body;
				Ok(())
			})?;

			Self::deposit_event(Event::PostUpdated { id, editor });
			Ok(())
		}

		#[pallet::call_index(2)]
		#[pallet::weight(T::DbWeight::get().reads_writes(1, 1))]
		pub fn delete_post(origin: OriginFor<T>, id: u64) -> DispatchResult {
			let who = ensure_signed(origin)?;
			let post = Posts::<T>::get(id).ok_or(Error::<T>::PostNotFound)?;
			ensure!(post.creator == who, Error::<T>::NotPostOwner);

			Posts::<T>::remove(id);
			log::debug!(target: LOG_TARGET, "post {} removed by {:?}", id, who);

			Self::deposit_event(Event::PostDeleted { id, creator: who });
			Ok(())
		}
	}

	impl<T: Config> Pallet<T> {
		fn ensure_valid(title: &[u8], body: &[u8]) -> DispatchResult {
			ensure!(!title.is_empty(), Error::<T>::EmptyTitle);
			ensure!(title.len() <= T::MaxTitleLength::get() as usize, Error::<T>::TitleTooLong);
			ensure!(body.len() <= T::MaxBodyLength::get() as usize, Error::<T>::BodyTooLong);
			Ok(())
		}

		/// Posts of `creator`, in id order.
		pub fn posts_by(creator: &T::AccountId) -> Vec<PostOf<T>> {
			let mut posts: Vec<_> =
				Posts::<T>::iter_values().filter(|p| &p.creator == creator).collect();
			posts.sort_by_key(|p| p.id);
			posts
		}
	}
}
