//! One-shot `key: value` dump of selected attributes.

use std::io::Write;

use crate::collector::collect;
use crate::error::Result;
use crate::fmt::format_entries;
use crate::model::MonitorGroup;
use crate::target::TargetConnection;

/// Writes every readable attribute of each group, one group at a time.
///
/// Lines of a group are sorted by key; groups keep their given order. The
/// first failing group aborts the dump and nothing further is written.
/// Returns the number of lines written.
pub fn dump<C, W>(conn: &mut C, groups: &[MonitorGroup], out: &mut W) -> Result<usize>
where
    C: TargetConnection + ?Sized,
    W: Write,
{
    let mut written = 0;
    for group in groups {
        let record = collect(conn, std::slice::from_ref(group))?;
        for line in format_entries(&record) {
            writeln!(out, "{}", line)?;
            written += 1;
        }
    }
    out.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_group_token;
    use crate::error::MonitorError;
    use crate::target::MockTarget;

    fn groups(tokens: &[&str]) -> Vec<MonitorGroup> {
        tokens.iter().map(|t| parse_group_token(t).unwrap()).collect()
    }

    fn opened_jvm() -> MockTarget {
        let mut target = MockTarget::typical_jvm();
        target.open().unwrap();
        target
    }

    #[test]
    fn test_dump_keeps_token_order() {
        let mut target = opened_jvm();
        let mut out = Vec::new();

        let written = dump(
            &mut target,
            &groups(&[
                "java.lang:type=Threading#ThreadCount",
                "java.lang:type=Memory#HeapMemoryUsage",
            ]),
            &mut out,
        )
        .unwrap();

        assert_eq!(written, 5);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "java.lang:type=Threading#ThreadCount: 42\n\
             java.lang:type=Memory#HeapMemoryUsage-committed: 268435456\n\
             java.lang:type=Memory#HeapMemoryUsage-init: 268435456\n\
             java.lang:type=Memory#HeapMemoryUsage-max: 4294967296\n\
             java.lang:type=Memory#HeapMemoryUsage-used: 52428800\n"
        );
    }

    #[test]
    fn test_dump_omits_unreadable() {
        let mut target = opened_jvm();
        let mut out = Vec::new();

        dump(&mut target, &groups(&["java.lang:type=Threading#*"]), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "java.lang:type=Threading#PeakThreadCount: 57\n\
             java.lang:type=Threading#ThreadCount: 42\n"
        );
        assert!(!text.contains("ThreadCpuTimeEnabled"));
    }

    #[test]
    fn test_dump_failing_bean_aborts() {
        let mut target = opened_jvm();
        let mut out = Vec::new();

        let result = dump(
            &mut target,
            &groups(&[
                "app:type=Missing#*",
                "java.lang:type=Threading#ThreadCount",
            ]),
            &mut out,
        );

        assert!(matches!(result, Err(MonitorError::NotFound(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn test_dump_floats_use_three_decimals() {
        let mut target = opened_jvm();
        let mut out = Vec::new();

        dump(
            &mut target,
            &groups(&["java.lang:type=OperatingSystem#SystemLoadAverage"]),
            &mut out,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "java.lang:type=OperatingSystem#SystemLoadAverage: 0.457\n"
        );
    }
}
