pub mod errors;
pub mod internal_api;
pub mod invoice;
pub mod middleware;
pub mod pix;
pub mod report;
pub mod routes;
pub mod server;
pub mod utils;

use std::sync::Arc;

use crate::{api::membership::MembershipCache, repo, services};

pub struct AppState {
    pub repo: repo::ImplAppRepo,
    pub notification_service: services::ImplNotificationService,
    /// Shared by every worker
    pub membership_cache: Arc<MembershipCache>,
    pub internal_api_secret: String,
}
