use clap::ValueEnum;
use kiln_config::{Mode, Target};

/// Build target
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum TargetArg {
    /// Browsers
    Web,
    /// Node.js
    Node,
    #[value(name = "web-worker")]
    WebWorker,
    #[value(name = "service-worker")]
    ServiceWorker,
}

impl From<TargetArg> for Target {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Web => Target::Web,
            TargetArg::Node => Target::Node,
            TargetArg::WebWorker => Target::WebWorker,
            TargetArg::ServiceWorker => Target::ServiceWorker,
        }
    }
}

/// Build mode
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum ModeArg {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "prod")]
    Production,
    None,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Development => Mode::Development,
            ModeArg::Production => Mode::Production,
            ModeArg::None => Mode::None,
        }
    }
}
