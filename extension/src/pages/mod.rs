//! Page Components

mod not_configured;
mod options;
mod save;

pub use not_configured::NotConfiguredPage;
pub use options::OptionsPage;
pub use save::SavePage;
