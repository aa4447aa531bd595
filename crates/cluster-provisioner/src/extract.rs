//! Extraction of `KEY=VALUE` assignments from command output.

/// A key/value pair scraped from command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentAssignment {
    pub key: String,
    pub value: String,
}

/// Find the first `KEY=VALUE` assignment for `key` in line-oriented output.
///
/// A line matches when it contains `" KEY="`, e.g.
/// `export KUBECONFIG=/home/u/.bluemix/.../kube-config.yml`. The matching
/// line is split on whitespace to isolate the assignment token, which is then
/// split on its first `=`. Later matching lines are ignored.
///
/// Returns `None` when no line matches.
#[must_use]
pub fn extract_assignment(text: &str, key: &str) -> Option<EnvironmentAssignment> {
    let marker = format!(" {key}=");
    let prefix = &marker[1..];

    let line = text.lines().find(|line| line.contains(&marker))?;
    let token = line
        .split_whitespace()
        .find(|token| token.starts_with(prefix))?;
    let (key, value) = token.split_once('=')?;

    Some(EnvironmentAssignment {
        key: key.to_string(),
        value: value.to_string(),
    })
}
