pub mod billing;
pub mod menu;
