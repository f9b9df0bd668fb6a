pub mod alerts;
pub mod audit;
pub mod auth;
pub mod branches;
pub mod dashboard;
pub mod packs;
pub mod products;
pub mod reports;
pub mod users;
pub mod withdrawals;
