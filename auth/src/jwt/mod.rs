pub mod claims;
pub mod errors;
pub mod handler;
pub mod lifetime;

pub use claims::Claims;
pub use claims::Identity;
pub use claims::RoleFlags;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use lifetime::parse_lifetime;
