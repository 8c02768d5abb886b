//! Turns an attribute spec into the set of attributes to read from a bean.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{MonitorError, Result};
use crate::model::{AttributeDescriptor, AttributeSpec, Selector};
use crate::target::TargetConnection;

/// Resolves `spec` against the bean's live metadata.
///
/// Performs exactly one metadata round trip. Requested names missing from the
/// metadata are dropped without error. The result is unique by name and sorted
/// by name, so the order the target lists attributes in never matters.
pub fn resolve<C>(conn: &mut C, spec: &AttributeSpec) -> Result<Vec<AttributeDescriptor>>
where
    C: TargetConnection + ?Sized,
{
    if spec.bean.trim().is_empty() {
        return Err(MonitorError::InvalidArgument(
            "please specify a valid bean name".to_string(),
        ));
    }
    if matches!(&spec.selector, Selector::Names(names) if names.is_empty()) {
        return Err(MonitorError::InvalidArgument(
            "please specify at least one attribute".to_string(),
        ));
    }

    let infos = conn.attribute_infos(&spec.bean)?;
    let mut selected: BTreeMap<String, AttributeDescriptor> = BTreeMap::new();

    match &spec.selector {
        Selector::Wildcard => {
            for info in infos {
                selected.insert(info.name.clone(), info);
            }
        }
        Selector::Names(names) => {
            for name in names {
                match infos.iter().find(|info| &info.name == name) {
                    Some(info) => {
                        selected.insert(name.clone(), info.clone());
                    }
                    None => trace!("{}: no attribute named {}", spec.bean, name),
                }
            }
        }
    }

    Ok(selected.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::MockTarget;

    fn open_jvm() -> MockTarget {
        let mut target = MockTarget::typical_jvm();
        target.open().unwrap();
        target
    }

    fn names(descriptors: &[AttributeDescriptor]) -> Vec<&str> {
        descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_wildcard_returns_every_attribute_sorted() {
        let mut target = open_jvm();
        let spec = AttributeSpec::new("java.lang:type=Memory", Selector::Wildcard);

        let resolved = resolve(&mut target, &spec).unwrap();

        assert_eq!(
            names(&resolved),
            vec![
                "HeapMemoryUsage",
                "NonHeapMemoryUsage",
                "ObjectPendingFinalizationCount",
                "Verbose"
            ]
        );
        assert_eq!(target.metadata_calls(), 1);
    }

    #[test]
    fn test_wildcard_includes_unreadable_descriptors() {
        let mut target = open_jvm();
        let spec = AttributeSpec::new("java.lang:type=Threading", Selector::Wildcard);

        let resolved = resolve(&mut target, &spec).unwrap();

        assert_eq!(resolved.len(), 3);
        let cpu = resolved
            .iter()
            .find(|d| d.name == "ThreadCpuTimeEnabled")
            .unwrap();
        assert!(!cpu.readable);
        assert_eq!(cpu.bean, "java.lang:type=Threading");
    }

    #[test]
    fn test_explicit_names_missing_are_dropped() {
        let mut target = open_jvm();
        let spec = AttributeSpec::new(
            "java.lang:type=Threading",
            Selector::parse_csv("PeakThreadCount,DoesNotExist,ThreadCount").unwrap(),
        );

        let resolved = resolve(&mut target, &spec).unwrap();

        assert_eq!(names(&resolved), vec!["PeakThreadCount", "ThreadCount"]);
    }

    #[test]
    fn test_explicit_duplicates_collapse() {
        let mut target = open_jvm();
        let spec = AttributeSpec::new(
            "java.lang:type=Threading",
            Selector::parse_csv("ThreadCount,ThreadCount").unwrap(),
        );

        let resolved = resolve(&mut target, &spec).unwrap();
        assert_eq!(names(&resolved), vec!["ThreadCount"]);
    }

    #[test]
    fn test_explicit_all_missing_is_empty_not_error() {
        let mut target = open_jvm();
        let spec = AttributeSpec::new(
            "java.lang:type=Memory",
            Selector::parse_csv("Nope,AlsoNope").unwrap(),
        );

        assert!(resolve(&mut target, &spec).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_arguments() {
        let mut target = open_jvm();

        let empty_bean = AttributeSpec::new("  ", Selector::Wildcard);
        assert!(matches!(
            resolve(&mut target, &empty_bean),
            Err(MonitorError::InvalidArgument(_))
        ));

        let empty_names = AttributeSpec::new("java.lang:type=Memory", Selector::Names(vec![]));
        assert!(matches!(
            resolve(&mut target, &empty_names),
            Err(MonitorError::InvalidArgument(_))
        ));

        // Argument checks happen before any round trip.
        assert_eq!(target.metadata_calls(), 0);
    }

    #[test]
    fn test_unknown_bean_is_not_found() {
        let mut target = open_jvm();
        let spec = AttributeSpec::new("java.lang:type=Missing", Selector::Wildcard);

        assert!(matches!(
            resolve(&mut target, &spec),
            Err(MonitorError::NotFound(_))
        ));
    }

    #[test]
    fn test_closed_connection_is_connection_error() {
        let mut target = MockTarget::typical_jvm();
        let spec = AttributeSpec::new("java.lang:type=Memory", Selector::Wildcard);

        assert!(matches!(
            resolve(&mut target, &spec),
            Err(MonitorError::Connection(_))
        ));
    }

    #[test]
    fn test_re_resolves_every_call() {
        let mut target = open_jvm();
        let spec = AttributeSpec::new("java.lang:type=Memory", Selector::Wildcard);

        assert_eq!(resolve(&mut target, &spec).unwrap().len(), 4);
        target.remove_attribute("java.lang:type=Memory", "Verbose");
        assert_eq!(resolve(&mut target, &spec).unwrap().len(), 3);
        assert_eq!(target.metadata_calls(), 2);
    }
}
