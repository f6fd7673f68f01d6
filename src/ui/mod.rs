// UI and formatting module

pub mod formatters;
pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_latency, format_naive, format_size, format_status};
pub use prompts::{confirm, success, warn};
