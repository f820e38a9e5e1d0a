//! Task and step rendering helpers shared by job kinds

use regex::Regex;
use sluice_core::domain::env::Envs;
use sluice_core::domain::job::ShareStorageInfo;
use sluice_core::domain::repository::Repository;
use sluice_core::domain::store::Output;
use sluice_core::domain::task::ShareStorageDetail;
use sluice_core::domain::workflow::ShareStorage;

/// Kubernetes label length limit
const MAX_TASK_NAME_LEN: usize = 63;

const VAR_REF: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)";

/// Name of the task compiled for one sub-target of a job
pub(crate) fn task_name(sub_target: &str, job: &str) -> String {
    format_task_name(&format!("{}-{}", sub_target, job))
}

/// Composite `job.sub-target` key
pub(crate) fn task_key(job: &str, sub_target: &str) -> String {
    format!("{}.{}", job, sub_target)
}

/// Formats a name as a label: lowercase, `[a-z0-9-]` only, at most 63 chars
pub(crate) fn format_task_name(name: &str) -> String {
    let sanitized: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .take(MAX_TASK_NAME_LEN)
        .collect();
    sanitized.trim_matches('-').to_string()
}

/// Key under which later jobs reference an output
pub(crate) fn output_key(job_key: &str, output: &str) -> String {
    format!("{{{{.job.{}.output.{}}}}}", job_key, output)
}

/// Lines that capture declared outputs into the output directory
pub(crate) fn output_script(outputs: &[Output], output_dir: &str) -> Vec<String> {
    let dir = output_dir.trim_end_matches('/');
    std::iter::once("set +ex".to_string())
        .chain(
            outputs
                .iter()
                .map(|output| format!("echo ${} > {}/{}", output.name, dir, output.name)),
        )
        .collect()
}

/// Splits a stored script into lines
pub(crate) fn script_lines(script: &str) -> Vec<String> {
    script
        .replace("\r\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Details of the shared storages a sub-target mounts
///
/// Only storages the workflow declares are mounted; each run gets its own
/// `<workflow>/<task_id>/<storage>` sub path.
pub(crate) fn share_storage_details(
    declared: &[ShareStorage],
    info: Option<&ShareStorageInfo>,
    workflow_name: &str,
    task_id: u64,
) -> Vec<ShareStorageDetail> {
    let Some(info) = info.filter(|info| info.enabled) else {
        return Vec::new();
    };

    info.share_storages
        .iter()
        .filter_map(|selected| declared.iter().find(|s| s.name == selected.name))
        .map(|storage| ShareStorageDetail {
            name: storage.name.clone(),
            mount_path: storage.path.clone(),
            sub_path: format!("{}/{}/{}", workflow_name, task_id, storage.name),
        })
        .collect()
}

/// Expands variable references in the checkout fields of each repository
pub(crate) fn render_repos(repos: &[Repository], envs: &Envs) -> Vec<Repository> {
    repos
        .iter()
        .map(|repo| Repository {
            branch: expand_vars(&repo.branch, envs),
            tag: expand_vars(&repo.tag, envs),
            checkout_path: expand_vars(&repo.checkout_path, envs),
            ..repo.clone()
        })
        .collect()
}

/// Expands `$VAR` and `${VAR}`; unknown references are kept verbatim
pub(crate) fn expand_vars(input: &str, envs: &Envs) -> String {
    if !input.contains('$') {
        return input.to_string();
    }
    let Some(pattern) = Regex::new(VAR_REF).ok() else {
        return input.to_string();
    };

    pattern
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            match envs.value(name) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::domain::env::KeyVal;

    #[test]
    fn test_task_name_format() {
        assert_eq!(task_name("lint-svc", "Scan"), "lint-svc-scan");
        assert_eq!(task_name("backend/build", "trigger"), "backend-build-trigger");
        assert_eq!(format_task_name("-Deploy-"), "deploy");

        let long = "a".repeat(80);
        assert_eq!(format_task_name(&long).len(), MAX_TASK_NAME_LEN);
    }

    #[test]
    fn test_output_key() {
        assert_eq!(
            output_key("scan.lint-svc", "REPORT"),
            "{{.job.scan.lint-svc.output.REPORT}}"
        );
    }

    #[test]
    fn test_output_script() {
        let outputs = vec![Output {
            name: "REPORT".to_string(),
            description: String::new(),
        }];
        assert_eq!(
            output_script(&outputs, "/workspace/outputs/"),
            vec!["set +ex", "echo $REPORT > /workspace/outputs/REPORT"]
        );
        assert_eq!(output_script(&[], "/out"), vec!["set +ex"]);
    }

    #[test]
    fn test_script_lines_normalises_line_endings() {
        assert_eq!(script_lines("make\r\nmake test"), vec!["make", "make test"]);
        assert_eq!(script_lines("go vet ./..."), vec!["go vet ./..."]);
    }

    #[test]
    fn test_share_storage_details() {
        let declared = vec![ShareStorage {
            name: "cache".to_string(),
            path: "/cache".to_string(),
        }];
        let info = ShareStorageInfo {
            enabled: true,
            share_storages: vec![
                ShareStorage {
                    name: "cache".to_string(),
                    path: String::new(),
                },
                ShareStorage {
                    name: "undeclared".to_string(),
                    path: String::new(),
                },
            ],
        };

        let details = share_storage_details(&declared, Some(&info), "nightly", 42);
        assert_eq!(
            details,
            vec![ShareStorageDetail {
                name: "cache".to_string(),
                mount_path: "/cache".to_string(),
                sub_path: "nightly/42/cache".to_string(),
            }]
        );

        let disabled = ShareStorageInfo {
            enabled: false,
            ..info
        };
        assert!(share_storage_details(&declared, Some(&disabled), "nightly", 42).is_empty());
        assert!(share_storage_details(&declared, None, "nightly", 42).is_empty());
    }

    #[test]
    fn test_expand_vars() {
        let mut envs = Envs::new();
        envs.push(KeyVal::new("BRANCH", "main"));
        envs.push(KeyVal::new("BRANCH", "release"));
        envs.push(KeyVal::new("TASK_ID", "7"));

        assert_eq!(expand_vars("$BRANCH", &envs), "release");
        assert_eq!(expand_vars("build-${TASK_ID}", &envs), "build-7");
        assert_eq!(expand_vars("$UNKNOWN/x", &envs), "$UNKNOWN/x");
        assert_eq!(expand_vars("plain", &envs), "plain");
    }
}
