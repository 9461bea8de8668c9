pub mod card;
pub mod memory;
mod records;
pub mod user;

pub use card::PostgresCardRepository;
pub use memory::InMemoryRepository;
pub use user::PostgresUserRepository;
