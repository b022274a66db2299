use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::domain::registration::ports::RegistrationTokenRepository;
use crate::domain::registration::service::RegistrationService;
use crate::domain::role::ports::RoleAssignmentRepository;
use crate::domain::role::ports::RoleRepository;
use crate::domain::user::ports::UserRepository;

/// One day between purge runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawn the background task that purges expired registration tokens.
///
/// Runs once per day, starting one full interval after startup. A
/// failed purge is logged and retried at the next tick; it never takes
/// the task down.
pub fn spawn_token_cleanup<TR, UR, RR, AR>(
    registration_service: Arc<RegistrationService<TR, UR, RR, AR>>,
) -> JoinHandle<()>
where
    TR: RegistrationTokenRepository,
    UR: UserRepository,
    RR: RoleRepository,
    AR: RoleAssignmentRepository,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        // The first tick completes immediately; skip it so the initial
        // purge runs a full interval after startup.
        interval.tick().await;

        loop {
            interval.tick().await;
            match registration_service.purge_expired(Utc::now()).await {
                Ok(purged) => {
                    tracing::info!(purged, "Expired registration tokens purged");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Registration token cleanup failed");
                }
            }
        }
    })
}
