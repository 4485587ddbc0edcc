//! Wire-facing data transfer objects and their validation helpers.

pub mod catalog;
pub mod health;
pub mod room;
pub mod validation;
pub mod ws;
