mod alert_cleanup;
mod config_saver;
mod convert;
mod input;

pub use alert_cleanup::AlertCleanup;
pub use config_saver::ConfigSaver;
pub use convert::ConvertController;
pub use input::InputController;
