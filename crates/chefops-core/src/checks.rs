//! Convention checks run against a local chef repository checkout.

use crate::types::{CheckResult, Verdict};

/// Package every chef depends on.
pub const FRAMEWORK_PACKAGE: &str = "ricecooker";

/// Expected chef entrypoint script.
pub const ENTRYPOINT_FILE: &str = "sushichef.py";

/// A single line of a pip requirements file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Package name as written
    pub name: String,
    /// Version specifiers, e.g. `("==", "0.6.2")`
    pub specs: Vec<(String, String)>,
}

const OPERATORS: &[&str] = &["===", "==", "!=", "~=", ">=", "<=", ">", "<"];

/// Parse the package lines of a requirements file.
///
/// Comments, blank lines and pip options are skipped, except `-e`/`--editable`
/// whose target is read as a requirement. For URL requirements the name comes
/// from the `#egg=` fragment.
#[must_use]
pub fn parse_requirements(text: &str) -> Vec<Requirement> {
    text.lines().filter_map(parse_requirement_line).collect()
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    // pip only treats `#` as a comment when preceded by whitespace
    line.find(" #")
        .or_else(|| line.find("\t#"))
        .map_or(line, |idx| &line[..idx])
}

/// Target of an editable install line, e.g. `-e git+https://...#egg=name`.
fn editable_target(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix("--editable")
        .or_else(|| line.strip_prefix("-e"))?;
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    Some(rest.trim_start())
}

fn egg_requirement(line: &str) -> Option<Requirement> {
    let (_, fragment) = line.split_once("#egg=")?;
    let name = fragment.split(['&', ' ']).next()?.trim();
    (!name.is_empty()).then(|| Requirement {
        name: name.to_string(),
        specs: Vec::new(),
    })
}

fn parse_requirement_line(line: &str) -> Option<Requirement> {
    let line = strip_comment(line).trim();
    if let Some(target) = editable_target(line) {
        // local paths without an egg name carry no package name
        return egg_requirement(target);
    }
    if line.is_empty() || line.starts_with('-') {
        return None;
    }

    if line.contains("://") {
        return egg_requirement(line);
    }

    // drop environment markers
    let line = line.split(';').next().unwrap_or(line).trim();

    let name_end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(line.len());
    let name = &line[..name_end];
    if name.is_empty() {
        return None;
    }

    let mut rest = line[name_end..].trim_start();
    if rest.starts_with('[') {
        rest = rest.find(']').map_or("", |idx| &rest[idx + 1..]);
    }

    let specs = rest
        .split(',')
        .filter_map(|spec| {
            let spec = spec.trim().trim_start_matches('(').trim_end_matches(')').trim();
            let op = OPERATORS.iter().find(|op| spec.starts_with(**op))?;
            let version = spec[op.len()..].trim();
            (!version.is_empty()).then(|| ((*op).to_string(), version.to_string()))
        })
        .collect();

    Some(Requirement {
        name: name.to_string(),
        specs,
    })
}

/// Check that `requirements.txt` exists and pins an up-to-date framework.
///
/// `contents` is `None` when the file does not exist. Only the first version
/// specifier is considered.
#[must_use]
pub fn check_requirements(contents: Option<&str>, latest_version: &str) -> CheckResult {
    let Some(contents) = contents else {
        return CheckResult::new(Verdict::Missing);
    };

    let Some(req) = parse_requirements(contents)
        .into_iter()
        .find(|r| r.name.eq_ignore_ascii_case(FRAMEWORK_PACKAGE))
    else {
        return CheckResult::new(Verdict::Missing);
    };

    match req.specs.first() {
        None => CheckResult::new(Verdict::PassUnpinned),
        Some((op, version)) if op == "==" => {
            if version == latest_version {
                CheckResult::new(Verdict::Pass)
            } else {
                CheckResult::new(Verdict::NeedsUpgrade {
                    pinned: version.clone(),
                })
                .with_comment("Ricecooker needs to be updated")
            }
        }
        Some(_) => CheckResult::new(Verdict::PassMinimum),
    }
}

/// Check for the entrypoint script among the repository's top-level files.
///
/// Any other python files are listed in the comment.
#[must_use]
pub fn check_entrypoint<S: AsRef<str>>(files: &[S]) -> CheckResult {
    let mut py_files: Vec<&str> = files
        .iter()
        .map(AsRef::as_ref)
        .filter(|f| f.ends_with(".py"))
        .collect();
    py_files.sort_unstable();

    let verdict = if let Some(pos) = py_files.iter().position(|f| *f == ENTRYPOINT_FILE) {
        py_files.remove(pos);
        Verdict::Pass
    } else {
        Verdict::Missing
    };

    let result = CheckResult::new(verdict);
    if py_files.is_empty() {
        result
    } else {
        result.with_comment(format!("Python files: {}", py_files.join(", ")))
    }
}
