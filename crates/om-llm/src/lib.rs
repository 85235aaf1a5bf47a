pub mod canned;
mod client;
mod participant;
mod project;
mod response;
mod summary;

pub use canned::CannedClient;
pub use client::{ApiClient, CompletionClient, ModelRotator};
pub use participant::ParticipantAnalyst;
pub use project::ProjectSummaryAgent;
pub use summary::MeetingSummaryAgent;
