//! Parser for the beans file.
//!
//! Format: one group per line, `bean#attr1,attr2,...` or `bean#*`. The first
//! `#` separates the bean from the attribute list; there is no escaping.

use std::path::Path;

use tracing::debug;

use crate::error::{MonitorError, Result};
use crate::model::{AttributeSpec, MonitorGroup, Selector};

/// Parses a single `bean#attrs` token.
///
/// Shared by the beans file and the one-shot dump's command line.
pub fn parse_group_token(token: &str) -> Result<MonitorGroup> {
    let token = token.trim();
    let (bean, attrs) = token.split_once('#').ok_or_else(|| {
        MonitorError::InvalidArgument(format!("missing '#' in {:?}", token))
    })?;

    let bean = bean.trim();
    if bean.is_empty() {
        return Err(MonitorError::InvalidArgument(format!(
            "empty bean name in {:?}",
            token
        )));
    }

    let selector = Selector::parse_csv(attrs).ok_or_else(|| {
        MonitorError::InvalidArgument(format!("no attributes given in {:?}", token))
    })?;

    Ok(AttributeSpec::new(bean, selector))
}

/// Parses the full contents of a beans file.
///
/// Every line must be a valid group; blank or malformed lines fail with the
/// 1-based line number.
pub fn parse_groups(content: &str) -> Result<Vec<MonitorGroup>> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            if line.trim().is_empty() {
                return Err(MonitorError::Config(format!("line {}: blank line", idx + 1)));
            }
            parse_group_token(line)
                .map_err(|e| MonitorError::Config(format!("line {}: {}", idx + 1, e)))
        })
        .collect()
}

/// Reads and parses a beans file.
pub fn load_groups(path: impl AsRef<Path>) -> Result<Vec<MonitorGroup>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| MonitorError::Config(format!("cannot read {}: {}", path.display(), e)))?;

    let groups = parse_groups(&content).map_err(|e| match e {
        MonitorError::Config(msg) => MonitorError::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    debug!("Loaded {} groups from {}", groups.len(), path.display());
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_group_token() {
        let group = parse_group_token("java.lang:type=Memory#HeapMemoryUsage,Verbose").unwrap();
        assert_eq!(group.bean, "java.lang:type=Memory");
        assert_eq!(
            group.selector,
            Selector::Names(vec!["HeapMemoryUsage".into(), "Verbose".into()])
        );
    }

    #[test]
    fn test_parse_group_token_wildcard() {
        let group = parse_group_token("java.lang:type=Threading#*").unwrap();
        assert!(group.selector.is_wildcard());
    }

    #[test]
    fn test_parse_group_token_splits_at_first_hash() {
        let group = parse_group_token("app:type=A#x#y").unwrap();
        assert_eq!(group.bean, "app:type=A");
        assert_eq!(group.selector, Selector::Names(vec!["x#y".into()]));
    }

    #[test]
    fn test_parse_group_token_malformed() {
        for bad in ["java.lang:type=Memory", "#HeapMemoryUsage", "java.lang:type=Memory#", "a#,,"] {
            assert!(
                matches!(parse_group_token(bad), Err(MonitorError::InvalidArgument(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_groups_keeps_order() {
        let groups = parse_groups(
            "java.lang:type=Threading#ThreadCount\r\njava.lang:type=Memory#*\n",
        )
        .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].bean, "java.lang:type=Threading");
        assert_eq!(groups[1].bean, "java.lang:type=Memory");
    }

    #[test]
    fn test_parse_groups_blank_line_fails() {
        let err = parse_groups("java.lang:type=Memory#*\n\njava.lang:type=Threading#*\n")
            .unwrap_err();
        assert!(matches!(err, MonitorError::Config(ref msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_parse_groups_malformed_line_fails() {
        let err = parse_groups("java.lang:type=Memory#*\nnonsense\n").unwrap_err();
        assert!(matches!(err, MonitorError::Config(ref msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_load_groups_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "java.lang:type=Memory#HeapMemoryUsage").unwrap();
        writeln!(file, "java.lang:type=OperatingSystem#SystemLoadAverage,ProcessCpuLoad").unwrap();

        let groups = load_groups(file.path()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].to_string(), "java.lang:type=OperatingSystem#SystemLoadAverage,ProcessCpuLoad");
    }

    #[test]
    fn test_load_groups_missing_file() {
        let result = load_groups("/nonexistent/path/beans");
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }
}
