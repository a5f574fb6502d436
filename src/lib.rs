//! Storage layer for a social graph: user accounts, friend requests and
//! friendships, backed by SQLite through sqlx.

pub mod api;
pub mod configs;
pub mod constants;
pub mod modules;
pub mod utils;

#[cfg(test)]
mod test;
