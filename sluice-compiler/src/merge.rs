//! Identity-keyed merging
//!
//! Repositories match on [`Repository::key`]; parameters match on name.
//! Every job kind that accepts overrides goes through these functions.

use sluice_core::domain::job::JenkinsParameter;
use sluice_core::domain::repository::Repository;
use std::collections::HashMap;

/// Merges an override repository list into a base list
///
/// Base order is preserved. A matching override replaces the base entry's
/// checkout fields wherever the override sets them; override-only entries are
/// appended in their own order.
pub fn merge_repos(base: &[Repository], overrides: &[Repository]) -> Vec<Repository> {
    let mut merged: Vec<Repository> = base.to_vec();
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, repo)| (repo.key(), i))
        .collect();

    for repo in overrides {
        match index.get(&repo.key()) {
            Some(&i) => overlay(&mut merged[i], repo),
            None => {
                index.insert(repo.key(), merged.len());
                merged.push(repo.clone());
            }
        }
    }

    merged
}

/// Copies the checkout fields an override sets onto a base entry
fn overlay(base: &mut Repository, patch: &Repository) {
    fn take(field: &mut String, value: &str) {
        if !value.is_empty() {
            *field = value.to_string();
        }
    }

    take(&mut base.branch, &patch.branch);
    take(&mut base.tag, &patch.tag);
    take(&mut base.commit_id, &patch.commit_id);
    take(&mut base.checkout_path, &patch.checkout_path);
    take(&mut base.remote_name, &patch.remote_name);
    if patch.pr.is_some() {
        base.pr = patch.pr;
    }
    if !patch.prs.is_empty() {
        base.prs = patch.prs.clone();
    }
}

/// Applies override values to base parameters with the same name
///
/// The base set is authoritative on identity: override-only parameters are
/// ignored.
pub fn merge_parameters(base: &mut [JenkinsParameter], overrides: &[JenkinsParameter]) {
    let values: HashMap<&str, &str> = overrides
        .iter()
        .map(|param| (param.name.as_str(), param.value.as_str()))
        .collect();

    for param in base.iter_mut() {
        if let Some(value) = values.get(param.name.as_str()) {
            param.value = value.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, branch: &str) -> Repository {
        Repository {
            source: "gitlab".to_string(),
            repo_owner: "platform".to_string(),
            repo_name: name.to_string(),
            branch: branch.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_with_itself_is_identity() {
        let repos = vec![repo("billing", "main"), repo("ledger", "develop")];
        assert_eq!(merge_repos(&repos, &repos), repos);
    }

    #[test]
    fn test_merge_with_empty_override() {
        let repos = vec![repo("billing", "main")];
        assert_eq!(merge_repos(&repos, &[]), repos);
        assert!(merge_repos(&[], &[]).is_empty());
    }

    #[test]
    fn test_branch_override_changes_only_branch() {
        let base = vec![repo("billing", "main"), repo("ledger", "develop")];
        let mut patched = base.clone();
        patched[1].branch = "feature/fx".to_string();

        let merged = merge_repos(&base, &patched);
        assert_eq!(merged[0], base[0]);
        assert_eq!(
            merged[1],
            Repository {
                branch: "feature/fx".to_string(),
                ..base[1].clone()
            }
        );
    }

    #[test]
    fn test_override_only_entries_are_appended() {
        let base = vec![repo("billing", "main")];
        let overrides = vec![repo("audit", "main"), repo("billing", "hotfix")];

        let merged = merge_repos(&base, &overrides);
        let names: Vec<&str> = merged.iter().map(|r| r.repo_name.as_str()).collect();
        assert_eq!(names, vec!["billing", "audit"]);
        assert_eq!(merged[0].branch, "hotfix");
    }

    #[test]
    fn test_empty_override_fields_keep_base_values() {
        let mut base = repo("billing", "main");
        base.pr = Some(12);
        let patch = Repository {
            tag: "v1.2.0".to_string(),
            ..repo("billing", "")
        };

        let merged = merge_repos(&[base], &[patch]);
        assert_eq!(merged[0].branch, "main");
        assert_eq!(merged[0].tag, "v1.2.0");
        assert_eq!(merged[0].pr, Some(12));
    }

    #[test]
    fn test_namespace_and_owner_identify_the_same_repo() {
        let base = repo("billing", "main");
        let patch = Repository {
            repo_owner: String::new(),
            repo_namespace: "platform".to_string(),
            ..repo("billing", "release")
        };

        let merged = merge_repos(&[base], &[patch]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].branch, "release");
    }

    #[test]
    fn test_merge_parameters_by_name() {
        let mut base = vec![
            JenkinsParameter {
                name: "BRANCH".to_string(),
                value: "main".to_string(),
                ..Default::default()
            },
            JenkinsParameter {
                name: "ENV".to_string(),
                value: "dev".to_string(),
                ..Default::default()
            },
        ];
        let overrides = vec![
            JenkinsParameter {
                name: "ENV".to_string(),
                value: "prod".to_string(),
                ..Default::default()
            },
            JenkinsParameter {
                name: "UNKNOWN".to_string(),
                value: "x".to_string(),
                ..Default::default()
            },
        ];

        merge_parameters(&mut base, &overrides);
        assert_eq!(base.len(), 2);
        assert_eq!(base[0].value, "main");
        assert_eq!(base[1].value, "prod");
    }
}
