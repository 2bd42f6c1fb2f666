// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::types::quota::UNLIMITED;
use crate::types::quota_class::BandwidthClass;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Name of the per-project QoS policy carrying the bandwidth limits.
pub const POLICY_NAME: &str = "bw-limiter";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Egress,
    Ingress,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Egress, Direction::Ingress];
}

/// Rate and burst of one direction, in kbps. [`UNLIMITED`] means no limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    pub max_kbps: i64,
    pub max_burst_kbps: i64,
}

impl RateLimit {
    pub const NONE: RateLimit = RateLimit {
        max_kbps: UNLIMITED,
        max_burst_kbps: UNLIMITED,
    };

    pub fn is_unlimited(&self) -> bool {
        *self == Self::NONE
    }
}

/// Desired limits for both directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandwidthLimits {
    pub egress: RateLimit,
    pub ingress: RateLimit,
}

impl BandwidthLimits {
    pub fn from_class(class: Option<&BandwidthClass>) -> Self {
        let class = class.cloned().unwrap_or_default();
        Self {
            egress: RateLimit {
                max_kbps: class.egress.unwrap_or(UNLIMITED),
                max_burst_kbps: class.egress_burst.unwrap_or(UNLIMITED),
            },
            ingress: RateLimit {
                max_kbps: class.ingress.unwrap_or(UNLIMITED),
                max_burst_kbps: class.ingress_burst.unwrap_or(UNLIMITED),
            },
        }
    }

    pub fn get(&self, direction: Direction) -> RateLimit {
        match direction {
            Direction::Egress => self.egress,
            Direction::Ingress => self.ingress,
        }
    }

    /// No direction is limited; the policy should not exist at all.
    pub fn is_unlimited(&self) -> bool {
        self.egress.is_unlimited() && self.ingress.is_unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_default_to_unlimited() {
        let limits = BandwidthLimits::from_class(None);
        assert!(limits.is_unlimited());
        assert_eq!(limits.get(Direction::Ingress), RateLimit::NONE);
    }

    // Test: a single limited number keeps the policy alive
    #[test]
    fn test_partial_limits() {
        let class = BandwidthClass {
            egress: Some(1000),
            ..Default::default()
        };
        let limits = BandwidthLimits::from_class(Some(&class));

        assert!(!limits.is_unlimited());
        assert_eq!(limits.egress.max_kbps, 1000);
        assert_eq!(limits.egress.max_burst_kbps, UNLIMITED);
        assert!(limits.ingress.is_unlimited());
    }

    #[test]
    fn test_direction_names() {
        assert_eq!(Direction::Egress.to_string(), "egress");
        assert_eq!("ingress".parse::<Direction>().ok(), Some(Direction::Ingress));
    }
}
