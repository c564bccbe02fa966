// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Provisioning states reported by Azure Resource Manager services.

/// The lifecycle status of a resource undergoing a long running operation.
///
/// Services report this in the `status` field of an operation resource, or in
/// `properties.provisioningState` of the resource itself. The set of strings
/// is open ended: states this crate does not recognize pass through as
/// [Other][ProvisioningState::Other] and are treated as still in progress.
/// Comparisons are case-sensitive, matching the service contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProvisioningState {
    NotStarted,
    InProgress,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Updating,
    Accepted,
    Creating,
    Deleting,
    /// A state string this crate does not recognize.
    Other(String),
}

impl ProvisioningState {
    /// Returns true if the operation will make no further progress.
    ///
    /// `Succeeded` and `Canceled` terminate the operation successfully,
    /// `Failed` terminates it with an error. Everything else, including
    /// unrecognized states, keeps the polling loop going.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// Returns true if the operation terminated with a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// The service's string for this state.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::InProgress => "InProgress",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
            Self::Updating => "Updating",
            Self::Accepted => "Accepted",
            Self::Creating => "Creating",
            Self::Deleting => "Deleting",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for ProvisioningState {
    fn from(value: &str) -> Self {
        match value {
            "NotStarted" => Self::NotStarted,
            "InProgress" => Self::InProgress,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Canceled" => Self::Canceled,
            "Updating" => Self::Updating,
            "Accepted" => Self::Accepted,
            "Creating" => Self::Creating,
            "Deleting" => Self::Deleting,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Succeeded", true, false)]
    #[test_case("Canceled", true, false)]
    #[test_case("Failed", true, true)]
    #[test_case("NotStarted", false, false)]
    #[test_case("InProgress", false, false)]
    #[test_case("Running", false, false)]
    #[test_case("Updating", false, false)]
    #[test_case("Accepted", false, false)]
    #[test_case("Creating", false, false)]
    #[test_case("Deleting", false, false)]
    fn terminal_states(input: &str, terminal: bool, failure: bool) {
        let state = ProvisioningState::from(input);
        assert_eq!(state.is_terminal(), terminal, "{state:?}");
        assert_eq!(state.is_failure(), failure, "{state:?}");
        assert_eq!(state.as_str(), input);
    }

    #[test]
    fn case_sensitive() {
        let state = ProvisioningState::from("succeeded");
        assert_eq!(state, ProvisioningState::Other("succeeded".to_string()));
        assert!(!state.is_terminal(), "{state:?}");
    }

    #[test]
    fn unrecognized_passes_through() {
        let state = ProvisioningState::from("Migrating");
        assert_eq!(state, ProvisioningState::Other("Migrating".to_string()));
        assert!(!state.is_terminal(), "{state:?}");
        assert_eq!(format!("{state}"), "Migrating");
    }
}
