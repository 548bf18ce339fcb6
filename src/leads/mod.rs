mod models;
pub mod roster;
pub mod submission;

pub use models::{Lead, NewLead};
pub use roster::LeadRoster;
pub use submission::{LeadForm, LeadSubmission, SubmissionStatus};
