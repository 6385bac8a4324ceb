// Job postings and applications.
// Postings come from two collections and are normalized to one `JobPosting` shape
// (models::job) before anything else sees them.

pub mod handlers;
pub mod store;
