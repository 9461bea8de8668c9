pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::card;
pub use domain::user;
pub use outbound::repositories;
