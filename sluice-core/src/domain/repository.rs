//! Source repository references

use serde::{Deserialize, Serialize};

/// A source-control checkout instruction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    /// Code host kind (e.g. "gitlab", "github")
    pub source: String,
    pub repo_owner: String,
    /// Namespace the repository lives in; falls back to the owner when empty
    pub repo_namespace: String,
    pub repo_name: String,
    pub remote_name: String,
    pub branch: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prs: Vec<u64>,
    pub commit_id: String,
    pub checkout_path: String,
    pub codehost_id: u64,
}

impl Repository {
    /// Namespace used for identity, falling back to the owner
    pub fn namespace(&self) -> &str {
        if self.repo_namespace.is_empty() {
            &self.repo_owner
        } else {
            &self.repo_namespace
        }
    }

    /// Stable identity key: `source/namespace/repo_name`
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.source, self.namespace(), self.repo_name)
    }

    /// Directory the repository is checked out into
    pub fn checkout_dir(&self) -> &str {
        if self.checkout_path.is_empty() {
            &self.repo_name
        } else {
            &self.checkout_path
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_falls_back_to_owner() {
        let repo = Repository {
            source: "gitlab".to_string(),
            repo_owner: "platform".to_string(),
            repo_name: "billing".to_string(),
            ..Default::default()
        };
        assert_eq!(repo.key(), "gitlab/platform/billing");

        let namespaced = Repository {
            repo_namespace: "platform/backend".to_string(),
            ..repo
        };
        assert_eq!(namespaced.key(), "gitlab/platform/backend/billing");
    }

    #[test]
    fn test_checkout_dir() {
        let mut repo = Repository {
            repo_name: "billing".to_string(),
            ..Default::default()
        };
        assert_eq!(repo.checkout_dir(), "billing");
        repo.checkout_path = "src/billing".to_string();
        assert_eq!(repo.checkout_dir(), "src/billing");
    }
}
