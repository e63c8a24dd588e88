pub mod page;
pub mod settings;

pub use page::ListPageConfiguration;
pub use settings::{BundleSettings, EngineSettings, SettingsError};
