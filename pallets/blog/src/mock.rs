use crate as pallet_blog;
use frame_support::{
    derive_impl,
    traits::ConstU32,
};
use sp_runtime::BuildStorage;

pub type AccountId = u64;

pub const MAX_TITLE: u32 = 16;
pub const MAX_BODY: u32 = 64;

// Configure a mock runtime to test the pallet.
frame_support::construct_runtime!(
    pub enum Test {
        System: frame_system,
        Blog: pallet_blog,
    }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
    type Block = frame_system::mocking::MockBlock<Test>;
    type AccountId = AccountId;
}

impl pallet_blog::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type MaxTitleLength = ConstU32<MAX_TITLE>;
    type MaxBodyLength = ConstU32<MAX_BODY>;
}

// Build genesis storage according to the mock runtime.
pub fn new_test_ext() -> sp_io::TestExternalities {
    let t = frame_system::GenesisConfig::<Test>::default()
        .build_storage()
        .unwrap();

    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| System::set_block_number(1));
    ext
}
