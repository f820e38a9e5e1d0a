//! Environment variables derived from the run context

use sluice_core::domain::env::{Envs, KeyVal};
use sluice_core::domain::repository::Repository;
use sluice_core::domain::workflow::Workflow;

/// Variables every task of a workflow run receives
pub(crate) fn workflow_variables(workflow: &Workflow, task_id: u64, portal_url: &str) -> Envs {
    let task_url = format!(
        "{}/projects/{}/workflows/{}/tasks/{}",
        portal_url.trim_end_matches('/'),
        workflow.project,
        workflow.name,
        task_id
    );

    [
        KeyVal::new("CI", "true"),
        KeyVal::new("SLUICE", "true"),
        KeyVal::new("PROJECT", &workflow.project),
        KeyVal::new("WORKFLOW", &workflow.name),
        KeyVal::new("WORKFLOW_DISPLAY_NAME", &workflow.display_name),
        KeyVal::new("TASK_ID", task_id.to_string()),
        KeyVal::new("TASK_URL", task_url),
    ]
    .into_iter()
    .collect()
}

/// Variables describing each checked-out repository, by position
pub(crate) fn repo_variables(repos: &[Repository]) -> Envs {
    let mut envs = Envs::new();

    for (index, repo) in repos.iter().enumerate() {
        let var_name = repo.repo_name.replace('-', "_");
        envs.push(KeyVal::new(format!("REPONAME_{}", index), &repo.repo_name));
        envs.push(KeyVal::new(format!("REPO_{}", index), &var_name));

        if !repo.branch.is_empty() {
            envs.push(KeyVal::new(format!("{}_BRANCH", var_name), &repo.branch));
        }
        if !repo.tag.is_empty() {
            envs.push(KeyVal::new(format!("{}_TAG", var_name), &repo.tag));
        }
        if let Some(pr) = repo.pr {
            envs.push(KeyVal::new(format!("{}_PR", var_name), pr.to_string()));
        }
        if !repo.prs.is_empty() {
            let prs: Vec<String> = repo.prs.iter().map(u64::to_string).collect();
            envs.push(KeyVal::new(format!("{}_PRS", var_name), prs.join(",")));
        }
        if !repo.commit_id.is_empty() {
            envs.push(KeyVal::new(format!("{}_COMMIT_ID", var_name), &repo.commit_id));
        }
    }

    envs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_variables() {
        let workflow = Workflow {
            project: "shop".to_string(),
            name: "nightly".to_string(),
            display_name: "Nightly".to_string(),
            share_storages: vec![],
        };

        let envs = workflow_variables(&workflow, 12, "https://ci.example.com/");
        assert_eq!(envs.value("PROJECT"), Some("shop"));
        assert_eq!(envs.value("TASK_ID"), Some("12"));
        assert_eq!(
            envs.value("TASK_URL"),
            Some("https://ci.example.com/projects/shop/workflows/nightly/tasks/12")
        );
    }

    #[test]
    fn test_repo_variables() {
        let repos = vec![
            Repository {
                repo_name: "billing-api".to_string(),
                branch: "main".to_string(),
                pr: Some(7),
                ..Default::default()
            },
            Repository {
                repo_name: "ledger".to_string(),
                prs: vec![3, 4],
                commit_id: "abc123".to_string(),
                ..Default::default()
            },
        ];

        let envs = repo_variables(&repos);
        assert_eq!(envs.value("REPONAME_0"), Some("billing-api"));
        assert_eq!(envs.value("REPO_0"), Some("billing_api"));
        assert_eq!(envs.value("billing_api_BRANCH"), Some("main"));
        assert_eq!(envs.value("billing_api_PR"), Some("7"));
        assert_eq!(envs.value("ledger_PRS"), Some("3,4"));
        assert_eq!(envs.value("ledger_COMMIT_ID"), Some("abc123"));
        assert_eq!(envs.value("ledger_BRANCH"), None);
    }
}
