// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("read configuration file {}: {}", path.display(), source))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("parse configuration file {}: {}", path.display(), source))]
    ParseConfig {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },

    #[snafu(display("quota class '{}' is malformed: {}", name, source))]
    MalformedClass {
        name: String,
        source: serde_yaml_ng::Error,
    },

    #[snafu(display("attribute '{}' has invalid value '{}'", key, value))]
    InvalidAttribute { key: String, value: String },

    #[snafu(display("serde_yaml error: {}", source))]
    SerdeYaml { source: serde_yaml_ng::Error },
}

impl From<serde_yaml_ng::Error> for Error {
    fn from(source: serde_yaml_ng::Error) -> Self {
        Error::SerdeYaml { source }
    }
}
