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

pub const CACHE_VOLUME_PREFIX: &str = "cache-";
pub const MEMBER_ACCEPTED: &str = "accepted";

const GIB: u64 = 1024 * 1024 * 1024;

pub fn cache_volume_name(image_id: &str) -> String {
    format!("{CACHE_VOLUME_PREFIX}{image_id}")
}

/// Image id a cache volume was created for, if the name follows the scheme.
pub fn cached_image_id(volume_name: &str) -> Option<&str> {
    volume_name
        .strip_prefix(CACHE_VOLUME_PREFIX)
        .filter(|id| !id.is_empty())
}

/// Size in GiB of a volume holding an image of `size_bytes`: rounded up and
/// never below the image's minimum disk.
pub fn cache_volume_size(size_bytes: u64, min_disk: u64) -> u64 {
    size_bytes.div_ceil(GIB).max(min_disk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(4_402_341_478, 5, 5 ; "4.1 GiB with min disk 5")]
    #[test_case(4_402_341_478, 6, 6 ; "min disk wins")]
    #[test_case(GIB, 0, 1 ; "exact GiB")]
    #[test_case(GIB + 1, 0, 2 ; "one byte over")]
    fn test_cache_volume_size(size: u64, min_disk: u64, expected: u64) {
        assert_eq!(cache_volume_size(size, min_disk), expected);
    }

    #[test]
    fn test_cache_names() {
        assert_eq!(cache_volume_name("abc"), "cache-abc");
        assert_eq!(cached_image_id("cache-abc"), Some("abc"));
        assert_eq!(cached_image_id("cache-"), None);
        assert_eq!(cached_image_id("data"), None);
    }
}
