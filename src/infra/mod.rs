pub mod factory;
pub mod providers;
pub mod repositories;
