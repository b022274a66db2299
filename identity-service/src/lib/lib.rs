pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod scheduler;

pub use domain::registration;
pub use domain::user;
pub use outbound::repositories;
