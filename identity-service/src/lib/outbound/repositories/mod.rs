pub mod registration_token;
pub mod role;
pub mod user;

pub use registration_token::PostgresRegistrationTokenRepository;
pub use role::PostgresRoleAssignmentRepository;
pub use role::PostgresRoleRepository;
pub use user::PostgresUserRepository;
