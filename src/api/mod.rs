// API routes and handlers

pub mod automations;
pub mod cron;
pub mod goals;
pub mod health;
pub mod metrics;
pub mod planning;
pub mod routes;
pub mod settings;
pub mod smart_events;
pub mod state;
pub mod stats;
pub mod steps;
pub mod user;
pub mod values;

pub use routes::create_routes;
pub use state::AppState;
