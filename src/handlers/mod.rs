pub mod auth;
pub mod entries;
pub mod health;
pub mod priorities;
pub mod questions;
pub mod stats;
pub mod streaks;
