mod mode;
mod settings;

pub use mode::Mode;
pub use settings::{ShadowConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, ENV_PREFIX};
