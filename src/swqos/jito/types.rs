//! Jito block-engine regions and bundle status types.
//!
//! 参考：https://docs.jito.wtf/lowlatencytxnsend/

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Block-engine region. Bundles go to the closest engine; the engine
/// forwards them to the current leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JitoRegion {
    Default,
    Amsterdam,
    Dublin,
    Frankfurt,
    London,
    NewYork,
    SLC,
    Singapore,
    /// 日本东京（亚洲用户默认）
    #[default]
    Tokyo,
}

impl JitoRegion {
    pub const ALL: [JitoRegion; 9] = [
        JitoRegion::Default,
        JitoRegion::Amsterdam,
        JitoRegion::Dublin,
        JitoRegion::Frankfurt,
        JitoRegion::London,
        JitoRegion::NewYork,
        JitoRegion::SLC,
        JitoRegion::Singapore,
        JitoRegion::Tokyo,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            JitoRegion::Default => "https://mainnet.block-engine.jito.wtf",
            JitoRegion::Amsterdam => "https://amsterdam.mainnet.block-engine.jito.wtf",
            JitoRegion::Dublin => "https://dublin.mainnet.block-engine.jito.wtf",
            JitoRegion::Frankfurt => "https://frankfurt.mainnet.block-engine.jito.wtf",
            JitoRegion::London => "https://london.mainnet.block-engine.jito.wtf",
            JitoRegion::NewYork => "https://ny.mainnet.block-engine.jito.wtf",
            JitoRegion::SLC => "https://slc.mainnet.block-engine.jito.wtf",
            JitoRegion::Singapore => "https://singapore.mainnet.block-engine.jito.wtf",
            JitoRegion::Tokyo => "https://tokyo.mainnet.block-engine.jito.wtf",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            JitoRegion::Default => "default",
            JitoRegion::Amsterdam => "amsterdam",
            JitoRegion::Dublin => "dublin",
            JitoRegion::Frankfurt => "frankfurt",
            JitoRegion::London => "london",
            JitoRegion::NewYork => "ny",
            JitoRegion::SLC => "slc",
            JitoRegion::Singapore => "singapore",
            JitoRegion::Tokyo => "tokyo",
        }
    }
}

impl FromStr for JitoRegion {
    type Err = anyhow::Error;

    /// Case-insensitive, accepts the usual abbreviations (`ny`, `tyo`, `ams`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" | "mainnet" => Ok(JitoRegion::Default),
            "amsterdam" | "ams" => Ok(JitoRegion::Amsterdam),
            "dublin" | "dub" => Ok(JitoRegion::Dublin),
            "frankfurt" | "fra" => Ok(JitoRegion::Frankfurt),
            "london" | "lon" => Ok(JitoRegion::London),
            "newyork" | "ny" => Ok(JitoRegion::NewYork),
            "slc" | "saltlakecity" => Ok(JitoRegion::SLC),
            "singapore" | "sg" => Ok(JitoRegion::Singapore),
            "tokyo" | "tyo" => Ok(JitoRegion::Tokyo),
            _ => Err(anyhow::anyhow!("unknown Jito region: {}", s)),
        }
    }
}

impl Display for JitoRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Relay view of a submitted bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleStatus {
    Landed,
    Pending,
    Rejected,
}

impl BundleStatus {
    /// Map a `getInflightBundleStatuses` status string.
    ///
    /// `Invalid` means the engine has not seen the bundle (yet) and is kept
    /// pending; only an explicit `Failed` is a rejection.
    pub fn from_inflight(status: &str) -> Self {
        match status {
            "Landed" => BundleStatus::Landed,
            "Failed" => BundleStatus::Rejected,
            _ => BundleStatus::Pending,
        }
    }
}
