//! In-memory target for testing the resolver, collector and sampling loop
//! without a live JVM.

use std::collections::{BTreeMap, HashSet};

use super::TargetConnection;
use crate::error::{MonitorError, Result};
use crate::model::{AttributeDescriptor, AttributeValue};

#[derive(Debug, Clone)]
struct MockAttribute {
    name: String,
    readable: bool,
    value: AttributeValue,
}

/// Simulated management endpoint.
///
/// Beans keep their attributes in insertion order, which is the order
/// `attribute_infos` reports them in.
#[derive(Debug, Clone, Default)]
pub struct MockTarget {
    beans: BTreeMap<String, Vec<MockAttribute>>,
    open: bool,
    fail_open: bool,
    failing_reads: HashSet<(String, String)>,
    /// Number of successful reads allowed before every read fails. `None` means unlimited.
    reads_before_failure: Option<usize>,
    metadata_calls: usize,
    reads: Vec<(String, String)>,
    close_calls: usize,
}

impl MockTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a readable attribute.
    pub fn add_attribute(
        &mut self,
        bean: impl Into<String>,
        name: impl Into<String>,
        value: AttributeValue,
    ) -> &mut Self {
        self.put(bean.into(), name.into(), true, value);
        self
    }

    /// Adds an attribute that metadata marks as not readable.
    pub fn add_unreadable(&mut self, bean: impl Into<String>, name: impl Into<String>) -> &mut Self {
        self.put(
            bean.into(),
            name.into(),
            false,
            AttributeValue::Scalar(crate::model::ScalarValue::Null),
        );
        self
    }

    /// Removes an attribute from the bean's metadata.
    pub fn remove_attribute(&mut self, bean: &str, name: &str) {
        if let Some(attrs) = self.beans.get_mut(bean) {
            attrs.retain(|a| a.name != name);
        }
    }

    /// Makes reads of one attribute fail with a connection error.
    pub fn fail_read(&mut self, bean: impl Into<String>, name: impl Into<String>) -> &mut Self {
        self.failing_reads.insert((bean.into(), name.into()));
        self
    }

    /// Lets `count` reads succeed, then fails every later read (simulates a dropped channel).
    pub fn drop_after_reads(&mut self, count: usize) -> &mut Self {
        self.reads_before_failure = Some(count);
        self
    }

    /// Makes `open` fail.
    pub fn refuse_open(&mut self) -> &mut Self {
        self.fail_open = true;
        self
    }

    /// Number of metadata round trips performed so far.
    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls
    }

    /// Every successful `(bean, attribute)` read, in call order.
    pub fn reads(&self) -> &[(String, String)] {
        &self.reads
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls
    }

    fn put(&mut self, bean: String, name: String, readable: bool, value: AttributeValue) {
        let attrs = self.beans.entry(bean).or_default();
        if let Some(existing) = attrs.iter_mut().find(|a| a.name == name) {
            existing.readable = readable;
            existing.value = value;
        } else {
            attrs.push(MockAttribute {
                name,
                readable,
                value,
            });
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(MonitorError::Connection("connection is not open".to_string()))
        }
    }

    fn bean(&self, bean: &str) -> Result<&Vec<MockAttribute>> {
        // ObjectName syntax needs a domain and at least one key property.
        if !bean.contains(':') {
            return Err(MonitorError::NotFound(format!("malformed bean name: {}", bean)));
        }
        self.beans
            .get(bean)
            .ok_or_else(|| MonitorError::NotFound(bean.to_string()))
    }
}

impl TargetConnection for MockTarget {
    fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(MonitorError::Connection("connection refused".to_string()));
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.close_calls += 1;
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn attribute_infos(&mut self, bean: &str) -> Result<Vec<AttributeDescriptor>> {
        self.ensure_open()?;
        self.metadata_calls += 1;
        let attrs = self.bean(bean)?;
        Ok(attrs
            .iter()
            .map(|a| AttributeDescriptor::new(bean, a.name.clone(), a.readable))
            .collect())
    }

    fn read_attribute(&mut self, bean: &str, attribute: &str) -> Result<AttributeValue> {
        self.ensure_open()?;

        if let Some(remaining) = self.reads_before_failure {
            if remaining == 0 {
                return Err(MonitorError::Connection("connection reset by peer".to_string()));
            }
            self.reads_before_failure = Some(remaining - 1);
        }
        if self
            .failing_reads
            .contains(&(bean.to_string(), attribute.to_string()))
        {
            return Err(MonitorError::Connection(format!(
                "failed to read {}#{}",
                bean, attribute
            )));
        }

        let value = self
            .bean(bean)?
            .iter()
            .find(|a| a.name == attribute)
            .map(|a| a.value.clone())
            .ok_or_else(|| {
                MonitorError::NotFound(format!("attribute {} not found on {}", attribute, bean))
            })?;

        self.reads.push((bean.to_string(), attribute.to_string()));
        Ok(value)
    }
}

impl MockTarget {
    /// A JVM exposing the usual `java.lang` platform beans.
    pub fn typical_jvm() -> Self {
        let mut target = Self::new();
        target
            .add_attribute(
                "java.lang:type=Memory",
                "HeapMemoryUsage",
                AttributeValue::structured([
                    ("committed", 268_435_456_i64),
                    ("init", 268_435_456),
                    ("max", 4_294_967_296),
                    ("used", 52_428_800),
                ]),
            )
            .add_attribute(
                "java.lang:type=Memory",
                "NonHeapMemoryUsage",
                AttributeValue::structured([
                    ("committed", 41_943_040_i64),
                    ("init", 7_667_712),
                    ("max", -1),
                    ("used", 39_845_888),
                ]),
            )
            .add_attribute(
                "java.lang:type=Memory",
                "ObjectPendingFinalizationCount",
                AttributeValue::scalar(0_i64),
            )
            .add_attribute("java.lang:type=Memory", "Verbose", AttributeValue::scalar(false))
            .add_attribute(
                "java.lang:type=Threading",
                "ThreadCount",
                AttributeValue::scalar(42_i64),
            )
            .add_attribute(
                "java.lang:type=Threading",
                "PeakThreadCount",
                AttributeValue::scalar(57_i64),
            )
            .add_unreadable("java.lang:type=Threading", "ThreadCpuTimeEnabled")
            .add_attribute(
                "java.lang:type=OperatingSystem",
                "SystemLoadAverage",
                AttributeValue::scalar(0.4567),
            )
            .add_attribute(
                "java.lang:type=OperatingSystem",
                "ProcessCpuLoad",
                AttributeValue::scalar(0.0125),
            )
            .add_attribute(
                "java.lang:type=Runtime",
                "VmName",
                AttributeValue::scalar("OpenJDK 64-Bit Server VM"),
            );
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScalarValue;

    #[test]
    fn test_mock_requires_open() {
        let mut target = MockTarget::typical_jvm();
        let result = target.attribute_infos("java.lang:type=Memory");
        assert!(matches!(result, Err(MonitorError::Connection(_))));
    }

    #[test]
    fn test_mock_metadata_in_insertion_order() {
        let mut target = MockTarget::typical_jvm();
        target.open().unwrap();

        let names: Vec<String> = target
            .attribute_infos("java.lang:type=Threading")
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            vec!["ThreadCount", "PeakThreadCount", "ThreadCpuTimeEnabled"]
        );
        assert_eq!(target.metadata_calls(), 1);
    }

    #[test]
    fn test_mock_unknown_and_malformed_beans() {
        let mut target = MockTarget::typical_jvm();
        target.open().unwrap();

        assert!(matches!(
            target.attribute_infos("java.lang:type=Nope"),
            Err(MonitorError::NotFound(_))
        ));
        assert!(matches!(
            target.attribute_infos("not-an-object-name"),
            Err(MonitorError::NotFound(_))
        ));
    }

    #[test]
    fn test_mock_drop_after_reads() {
        let mut target = MockTarget::typical_jvm();
        target.drop_after_reads(1);
        target.open().unwrap();

        let first = target.read_attribute("java.lang:type=Threading", "ThreadCount");
        assert_eq!(first.unwrap(), AttributeValue::Scalar(ScalarValue::Integer(42)));

        let second = target.read_attribute("java.lang:type=Threading", "ThreadCount");
        assert!(matches!(second, Err(MonitorError::Connection(_))));
        assert_eq!(target.reads().len(), 1);
    }

    #[test]
    fn test_mock_refuse_open() {
        let mut target = MockTarget::new();
        target.refuse_open();
        assert!(target.open().is_err());
        assert!(!target.is_open());
    }
}
