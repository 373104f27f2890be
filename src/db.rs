pub mod store;
pub use store::{MenuEntity, MenuStore, ProfileStore, SubscriptionStore};

pub mod menu_repo;
pub use menu_repo::MenuRepository;
pub mod subscription_repo;
pub use subscription_repo::SubscriptionRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;

#[cfg(test)]
pub mod memory;
