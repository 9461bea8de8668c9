pub mod card;
pub mod clock;
pub mod common;
pub mod user;
