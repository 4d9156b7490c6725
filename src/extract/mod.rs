//! Pipeline definition parsing and test-matrix extraction
//!
//! [`extract`] is a pure function of file content: identical bytes always
//! yield identical entries in identical (source-document) order. Parsing goes
//! through a typed intermediate representation so the flattening logic works
//! on validated structure, not loosely-typed maps. Unknown keys are ignored;
//! a missing matrix section yields an empty matrix; only unparseable syntax
//! is an [`ExtractionError`].
//!
//! Two job forms are recognized and flattened into one matrix:
//!
//! - an inline `strategy.matrix` mapping entry names to variable maps
//! - the shared `templates/matrix.yml` template, whose `targets` × `groups`
//!   parameters are expanded through `testFormat` into test path strings

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::core::models::{
    ContainerReference, PipelineMatrixEntry, RepositoryRef, TestMatrix, VersionNumber,
};
use crate::error::ExtractionError;

/// Matrix variables recognized as the platform axis, in priority order.
const PLATFORM_KEYS: &[&str] = &["platform", "os", "image", "distro"];

/// Matrix variables recognized as the language-version axis, in priority order.
const VERSION_KEYS: &[&str] = &["python", "python_version", "pythonVersion"];

/// Test types that carry no platform/version pair worth comparing.
const SKIPPED_TEST_TYPES: &[&str] =
    &["sanity", "units", "aws", "cloud", "hcloud", "windows", "galaxy", "generic", "i"];

const MATRIX_TEMPLATE: &str = "templates/matrix.yml";

#[derive(Debug, Deserialize)]
struct PipelineDoc {
    #[serde(default)]
    stages: Vec<StageNode>,
    #[serde(default)]
    jobs: Vec<JobNode>,
    resources: Option<ResourcesNode>,
}

#[derive(Debug, Deserialize)]
struct StageNode {
    stage: Option<String>,
    #[serde(default)]
    jobs: Vec<JobNode>,
}

#[derive(Debug, Deserialize)]
struct JobNode {
    job: Option<String>,
    template: Option<String>,
    parameters: Option<TemplateParameters>,
    strategy: Option<StrategyNode>,
}

#[derive(Debug, Deserialize)]
struct StrategyNode {
    matrix: Option<serde_yaml::Mapping>,
}

#[derive(Debug, Deserialize)]
struct TemplateParameters {
    #[serde(rename = "testFormat")]
    test_format: Option<String>,
    #[serde(default)]
    targets: Vec<TargetNode>,
    #[serde(default)]
    groups: Vec<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct TargetNode {
    name: Option<String>,
    test: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourcesNode {
    #[serde(default)]
    containers: Vec<ContainerNode>,
}

#[derive(Debug, Deserialize)]
struct ContainerNode {
    image: Option<String>,
}

/// Extract the test matrix a pipeline definition declares.
///
/// Flattens every matrix block in the file, tagging each entry with its
/// originating job under the `job` extra axis. Duplicate rows are dropped,
/// first occurrence wins.
pub fn extract(
    bytes: &[u8],
    repository: RepositoryRef,
    source: &str,
) -> Result<TestMatrix, ExtractionError> {
    let doc = parse_doc(bytes)?;

    let mut entries = Vec::new();
    let mut seen = BTreeSet::new();

    for job in &doc.jobs {
        collect_job(job, None, &mut entries, &mut seen);
    }
    for stage in &doc.stages {
        for job in &stage.jobs {
            collect_job(job, stage.stage.as_deref(), &mut entries, &mut seen);
        }
    }

    Ok(TestMatrix {
        repository,
        source: source.to_string(),
        entries,
    })
}

/// Extract the container pins a pipeline definition declares.
pub fn extract_containers(bytes: &[u8]) -> Result<Vec<ContainerReference>, ExtractionError> {
    let doc = parse_doc(bytes)?;
    Ok(doc
        .resources
        .into_iter()
        .flat_map(|r| r.containers)
        .filter_map(|c| c.image)
        .map(|image| ContainerReference::parse(&image))
        .collect())
}

fn parse_doc(bytes: &[u8]) -> Result<PipelineDoc, ExtractionError> {
    serde_yaml::from_slice(bytes).map_err(|e| ExtractionError::new(e.to_string()))
}

fn collect_job(
    job: &JobNode,
    stage: Option<&str>,
    entries: &mut Vec<PipelineMatrixEntry>,
    seen: &mut BTreeSet<PipelineMatrixEntry>,
) {
    if let Some(matrix) = job.strategy.as_ref().and_then(|s| s.matrix.as_ref()) {
        collect_strategy_matrix(matrix, job.job.as_deref(), entries, seen);
        return;
    }

    // Shared-template jobs carry their matrix in `parameters`; any other
    // template (coverage, deploy, ...) declares no tests to compare.
    if job.template.as_deref() == Some(MATRIX_TEMPLATE) {
        if let Some(parameters) = &job.parameters {
            let label = job.job.as_deref().or(stage).unwrap_or("matrix");
            collect_template_matrix(parameters, label, entries, seen);
        }
    }
}

fn collect_strategy_matrix(
    matrix: &serde_yaml::Mapping,
    job_name: Option<&str>,
    entries: &mut Vec<PipelineMatrixEntry>,
    seen: &mut BTreeSet<PipelineMatrixEntry>,
) {
    for (key, value) in matrix {
        let Some(entry_name) = scalar_to_string(key) else {
            continue;
        };
        let serde_yaml::Value::Mapping(vars) = value else {
            continue;
        };

        let mut axes: BTreeMap<String, String> = BTreeMap::new();
        for (k, v) in vars {
            if let (Some(k), Some(v)) = (scalar_to_string(k), scalar_to_string(v)) {
                axes.insert(k, v);
            }
        }

        let platform = pick_axis(&axes, PLATFORM_KEYS).unwrap_or_else(|| entry_name.clone());
        let language_version = pick_axis(&axes, VERSION_KEYS).unwrap_or_default();

        let mut extra_axes: BTreeMap<String, String> = axes
            .into_iter()
            .filter(|(k, _)| {
                !PLATFORM_KEYS.contains(&k.as_str()) && !VERSION_KEYS.contains(&k.as_str())
            })
            .collect();
        extra_axes.insert(
            "job".to_string(),
            job_name.map_or_else(|| entry_name.clone(), ToString::to_string),
        );

        push_unique(
            PipelineMatrixEntry {
                platform,
                language_version,
                extra_axes,
            },
            entries,
            seen,
        );
    }
}

fn collect_template_matrix(
    parameters: &TemplateParameters,
    job_label: &str,
    entries: &mut Vec<PipelineMatrixEntry>,
    seen: &mut BTreeSet<PipelineMatrixEntry>,
) {
    let format = parameters.test_format.as_deref().unwrap_or("{0}");
    let groups: Vec<Option<String>> = if parameters.groups.is_empty() {
        vec![None]
    } else {
        parameters.groups.iter().map(scalar_to_string).collect()
    };

    for group in &groups {
        for target in &parameters.targets {
            let Some(raw) = target.test.as_deref().or(target.name.as_deref()) else {
                continue;
            };
            let test = format
                .replace("{0}", raw)
                .replace("{1}", group.as_deref().unwrap_or(""));
            if let Some(entry) = entry_from_test_path(&test, job_label, group.as_deref()) {
                push_unique(entry, entries, seen);
            }
        }
    }
}

/// Turn one expanded test path like `devel/fedora/38/1` into a matrix row.
///
/// A leading core-branch segment selects whether the entry counts at all:
/// only devel-targeting tests track the reference matrix. A trailing segment
/// equal to the test group is shorthand, not an axis, and is dropped.
fn entry_from_test_path(
    test: &str,
    job_label: &str,
    group: Option<&str>,
) -> Option<PipelineMatrixEntry> {
    let mut parts: Vec<&str> = test.split('/').filter(|p| !p.is_empty()).collect();

    if parts.first().copied().is_some_and(is_core_branch) {
        if parts[0] != "devel" {
            return None;
        }
        parts.remove(0);
    }

    if let Some(g) = group {
        if parts.last() == Some(&g) {
            parts.pop();
        }
    }

    let test_type = *parts.first()?;
    if SKIPPED_TEST_TYPES.contains(&test_type) {
        return None;
    }

    let mut extra_axes = BTreeMap::new();
    extra_axes.insert("job".to_string(), job_label.to_string());
    if let Some(g) = group {
        extra_axes.insert("group".to_string(), g.to_string());
    }

    Some(PipelineMatrixEntry {
        platform: test_type.to_string(),
        language_version: parts.get(1).copied().unwrap_or("").to_string(),
        extra_axes,
    })
}

/// Whether a path segment names a core branch (`devel`, `milestone`,
/// `stable-2.16`, or a bare `2.10`-style version).
fn is_core_branch(segment: &str) -> bool {
    if segment == "devel" || segment == "milestone" {
        return true;
    }
    let version = segment.strip_prefix("stable-").unwrap_or(segment);
    (segment.starts_with("stable-") || segment.contains('.'))
        && VersionNumber::parse(version).is_some()
}

fn pick_axis(axes: &BTreeMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| axes.get(*k).cloned())
}

fn push_unique(
    entry: PipelineMatrixEntry,
    entries: &mut Vec<PipelineMatrixEntry>,
    seen: &mut BTreeSet<PipelineMatrixEntry>,
) {
    if seen.insert(entry.clone()) {
        entries.push(entry);
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
