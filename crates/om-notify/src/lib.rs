//! Role-based notification fan-out.
//!
//! Recipients come from a CSV directory; roles are classified against a
//! configurable executive vocabulary. Executives receive the project-level
//! narrative only, everyone else the combined meeting + participant digest.

mod directory;
mod dispatch;
mod html;
mod mailer;

pub use directory::{Recipient, RoleClass, load_recipients};
pub use dispatch::{DigestContent, NotificationReport, dispatch};
pub use html::{combined_html, to_html};
pub use mailer::{Mailer, RecordingMailer, SentMail, SmtpMailer};
