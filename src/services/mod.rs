//! Services
//!
//! I/O around the estimation core: delivery to the mail relay, the relay
//! server itself, and draft autosave. None of these can alter an estimate.

pub mod delivery;
pub mod drafts;
pub mod mailer;
mod rate_limiter;
pub mod relay;

pub use delivery::{DeliveryAck, DeliveryClient, DeliveryError, EstimateSubmission, DEFAULT_DELIVERY_TIMEOUT};
pub use drafts::{DraftAutosaver, DraftError, DraftStore};
pub use mailer::{MailError, Mailer, OutboxMailer, OutgoingMail, SmtpMailer};
pub use rate_limiter::RateLimiter;
pub use relay::{router, run_relay_server, RelayState};
