mod agent;
pub use agent::Agent;

mod app;
pub use app::App;

mod correlation;
pub use correlation::Correlation;

mod database;
pub use database::{Database, Relay};

mod notification;
pub use notification::Notification;

mod config;
pub use config::Config;

mod parser;
pub use parser::Parser;
