mod accounts;
mod alerts;
mod digest;
mod tracker;

pub use accounts::{AccountService, LoginOutcome, RegisterOutcome};
pub use alerts::AlertEngine;
pub use digest::DigestEngine;
pub use tracker::{TrackOutcome, TrackerService};
