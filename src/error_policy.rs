// Copyright 2024 RustFS Team
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

use crate::client::Error;

/// How a failed remote call relates to the state a pass wants to reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// The desired state already holds (409).
    Satisfied,
    /// The object is gone (404).
    Absent,
    Fault,
}

pub fn classify(error: &Error) -> Disposition {
    if error.is_conflict() {
        Disposition::Satisfied
    } else if error.is_not_found() {
        Disposition::Absent
    } else {
        Disposition::Fault
    }
}

/// Treats a conflict as success; `None` means the object already existed.
pub fn tolerate_conflict<T>(result: Result<T, Error>) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if classify(&err) == Disposition::Satisfied => Ok(None),
        Err(err) => Err(err),
    }
}

/// Treats a missing object as success; `None` means it was already gone.
pub fn tolerate_absent<T>(result: Result<T, Error>) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if classify(&err) == Disposition::Absent => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn status(status: u16) -> Error {
        Error::Status {
            method: "POST".into(),
            url: "http://neutron/v2.0/rbac-policies".into(),
            status,
            message: String::new(),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&status(409)), Disposition::Satisfied);
        assert_eq!(
            classify(&Error::Conflict {
                message: "exists".into()
            }),
            Disposition::Satisfied
        );
        assert_eq!(classify(&status(404)), Disposition::Absent);
        assert_eq!(classify(&status(500)), Disposition::Fault);
        assert_eq!(
            classify(&Error::ProfileNotFound {
                profile: "p".into()
            }),
            Disposition::Fault
        );
    }

    // Test: only conflicts are swallowed
    #[test]
    fn test_tolerate_conflict() {
        assert_eq!(tolerate_conflict(Ok::<_, Error>(1)).unwrap(), Some(1));
        assert_eq!(tolerate_conflict::<i32>(Err(status(409))).unwrap(), None);
        assert!(tolerate_conflict::<i32>(Err(status(404))).is_err());
    }

    #[test]
    fn test_tolerate_absent() {
        assert_eq!(tolerate_absent(Ok::<_, Error>(1)).unwrap(), Some(1));
        assert_eq!(tolerate_absent::<i32>(Err(status(404))).unwrap(), None);
        assert!(tolerate_absent::<i32>(Err(status(409))).is_err());
        assert!(tolerate_absent::<i32>(Err(status(500))).is_err());
    }
}
