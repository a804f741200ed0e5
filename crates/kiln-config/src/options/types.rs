use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Runtime environment a build targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// Browsers (default)
    #[default]
    Web,
    /// Node.js
    Node,
    /// Dedicated web workers
    WebWorker,
    /// Service workers
    ServiceWorker,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Web => "web",
            Target::Node => "node",
            Target::WebWorker => "web-worker",
            Target::ServiceWorker => "service-worker",
        }
    }

    /// Engine `target` value for this environment.
    pub fn engine_target(&self) -> &'static str {
        match self {
            Target::Web => "web",
            Target::Node => "node",
            Target::WebWorker | Target::ServiceWorker => "webworker",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(Target::Web),
            "node" => Ok(Target::Node),
            "web-worker" => Ok(Target::WebWorker),
            "service-worker" => Ok(Target::ServiceWorker),
            other => Err(format!(
                "unknown target '{other}', expected web, node, web-worker or service-worker"
            )),
        }
    }
}

/// Build mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    #[default]
    Production,
    None,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
            Mode::None => "none",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            "none" => Ok(Mode::None),
            other => Err(format!(
                "unknown mode '{other}', expected development, production or none"
            )),
        }
    }
}

/// Environment handed to user `tools` functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookUtils {
    pub target: Target,
    pub mode: Mode,
}

impl HookUtils {
    pub fn new(target: Target, mode: Mode) -> Self {
        Self { target, mode }
    }

    pub fn is_prod(&self) -> bool {
        self.mode == Mode::Production
    }

    pub fn is_dev(&self) -> bool {
        self.mode == Mode::Development
    }
}

/// How polyfills are injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polyfill {
    /// Prepend `core-js` to every entry
    Entry,
    /// Served per user agent, nothing bundled
    Ua,
    #[default]
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    #[default]
    Ascii,
    Utf8,
}

/// Chunk splitting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkSplitStrategy {
    /// Framework, polyfill and library groups (default)
    #[default]
    SplitByExperience,
    /// One chunk per npm package
    SplitByModule,
    /// Everything in one chunk
    AllInOne,
    /// All of node_modules in one vendor chunk
    SingleVendor,
    /// Only `forceSplitting` and user `splitChunks`
    Custom,
}

/// Where generated tags are injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlInject {
    #[default]
    Head,
    Body,
}
