use std::sync::Arc;

use crate::db::UserRepository;
use crate::engine::{AccountService, AlertEngine, DigestEngine, TrackerService};
use crate::notify::Notifier;
use crate::sources::PriceResolver;
use crate::utils::Config;

/// Shared application state.
///
/// Constructed once at startup and passed explicitly to every job
/// invocation and command handler; nothing in the bot reaches for ambient
/// globals.
pub struct AppContext {
    pub config: Arc<Config>,
    pub db: Arc<dyn UserRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub resolver: Arc<PriceResolver>,
    pub accounts: Arc<AccountService>,
    pub tracker: Arc<TrackerService>,
    pub alert_engine: Arc<AlertEngine>,
    pub digest_engine: Arc<DigestEngine>,
}
