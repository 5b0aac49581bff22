// Identity: bearer-token validation and request extractors

pub mod errors;
pub mod jwt;
pub mod middleware;
pub mod models;

pub use errors::AuthError;
pub use jwt::{extract_bearer_token, JwtService};
pub use middleware::{cors_layer, AuthUser, CronCaller};
pub use models::Claims;
