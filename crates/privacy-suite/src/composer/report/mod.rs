mod markdown;
pub mod views;

pub use markdown::render_markdown;
pub use views::{ProfileSummary, SubsystemSummary};
