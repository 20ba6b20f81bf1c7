//! Turns a parsed `testsuite` into the qTest automation request: classifies
//! each testcase outcome, derives the normalized per-test fields, and
//! assembles the ordered request document ready for upload or JSON output.

use crate::error::UploadError;
use crate::model::{TestCase, TestSuite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Suite property that names the module (release branch) a run belongs to.
const MODULE_PROPERTY: &str = "GIT_BRANCH";
const UNKNOWN_MODULE: &str = "Unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// One qTest test log, mirroring the manager API's
/// `AutomationTestLogResource`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestLog {
    pub name: String,
    pub status: TestStatus,
    pub module_names: Vec<String>,
    pub exe_start_date: String,
    pub exe_end_date: String,
    pub automation_content: String,
}

/// The full request body for a qTest automation submission. `test_logs`
/// keeps the document order of the source testcases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutomationRequest {
    pub test_cycle: String,
    pub execution_date: String,
    pub test_logs: Vec<TestLog>,
}

/// Current instant in the fixed Zulu format qTest expects.
fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Strip a trailing bracketed parametrization suffix from a test name:
/// `test_login[chrome-3]` becomes `test_login`. A name without the
/// `<word chars>[<suffix>]` shape is returned unchanged.
fn base_name(raw: &str) -> &str {
    if let Some(open) = raw.find('[') {
        let (base, suffix) = raw.split_at(open);
        let base_is_word = !base.is_empty()
            && base.chars().all(|c| c.is_alphanumeric() || c == '_');
        if base_is_word && suffix.len() > 2 && suffix.ends_with(']') {
            return base;
        }
    }
    raw
}

fn classify(testcase: &TestCase) -> TestStatus {
    // failure/error outranks skipped if a degenerate case carries both
    if testcase.failure.is_some() || testcase.error.is_some() {
        TestStatus::Failed
    } else if testcase.skipped.is_some() {
        TestStatus::Skipped
    } else {
        TestStatus::Passed
    }
}

fn test_log(testcase: &TestCase, props: &HashMap<String, String>) -> TestLog {
    let name = base_name(&testcase.name).to_string();
    let module = props
        .get(MODULE_PROPERTY)
        .map(String::as_str)
        .unwrap_or(UNKNOWN_MODULE);

    TestLog {
        automation_content: format!("{module}#{name}"),
        name,
        status: classify(testcase),
        module_names: vec![module.to_string()],
        exe_start_date: utc_timestamp(),
        exe_end_date: utc_timestamp(),
    }
}

/// Walk the suite once, producing the property map alongside the test logs
/// in source document order.
pub fn extract(suite: &TestSuite) -> (HashMap<String, String>, Vec<TestLog>) {
    let props = suite.property_map();
    let logs = suite.testcases.iter().map(|tc| test_log(tc, &props)).collect();
    (props, logs)
}

/// Build the complete request for `test_cycle`, which is passed through
/// verbatim. `execution_date` is stamped once for the whole document.
pub fn assemble(suite: &TestSuite, test_cycle: &str) -> AutomationRequest {
    let (_, test_logs) = extract(suite);
    AutomationRequest {
        test_cycle: test_cycle.to_string(),
        execution_date: utc_timestamp(),
        test_logs,
    }
}

/// Serialize the request as 2-space-indented JSON.
pub fn serialize(request: &AutomationRequest) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(request)
}

pub fn write_to_path(bytes: &[u8], path: &Path) -> Result<(), UploadError> {
    fs::write(path, bytes).map_err(|source| UploadError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Properties, Property, Skipped, TestFailure};

    fn passing(name: &str) -> TestCase {
        TestCase {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn failing(name: &str) -> TestCase {
        TestCase {
            failure: Some(TestFailure::default()),
            ..passing(name)
        }
    }

    fn erroring(name: &str) -> TestCase {
        TestCase {
            error: Some(TestFailure::default()),
            ..passing(name)
        }
    }

    fn skipping(name: &str) -> TestCase {
        TestCase {
            skipped: Some(Skipped::default()),
            ..passing(name)
        }
    }

    fn suite_with(testcases: Vec<TestCase>) -> TestSuite {
        TestSuite {
            testcases,
            ..Default::default()
        }
    }

    fn branch_property(value: &str) -> Properties {
        Properties {
            properties: vec![Property {
                name: "GIT_BRANCH".to_string(),
                value: value.to_string(),
            }],
        }
    }

    const ZULU: &str = "%Y-%m-%dT%H:%M:%SZ";

    #[test]
    fn passing_testcase_without_branch_property() {
        let suite = suite_with(vec![passing("test_pass")]);
        let (_, logs) = extract(&suite);

        assert_eq!(logs.len(), 1);
        let log = &logs[0];
        assert_eq!(log.name, "test_pass");
        assert_eq!(log.status, TestStatus::Passed);
        assert_eq!(log.module_names, vec!["Unknown".to_string()]);
        assert_eq!(log.automation_content, "Unknown#test_pass");
        assert!(chrono::NaiveDateTime::parse_from_str(&log.exe_start_date, ZULU).is_ok());
        assert!(chrono::NaiveDateTime::parse_from_str(&log.exe_end_date, ZULU).is_ok());
    }

    #[test]
    fn failure_child_means_failed() {
        let suite = suite_with(vec![failing("test_fail")]);
        let (_, logs) = extract(&suite);
        assert_eq!(logs[0].status, TestStatus::Failed);
    }

    #[test]
    fn branch_property_becomes_the_module_name() {
        let mut suite = suite_with(vec![passing("test_pass")]);
        suite.properties = branch_property("release-5");
        let (props, logs) = extract(&suite);

        assert_eq!(props["GIT_BRANCH"], "release-5");
        assert_eq!(logs[0].module_names, vec!["release-5".to_string()]);
        assert_eq!(logs[0].automation_content, "release-5#test_pass");
    }

    #[test]
    fn logs_keep_document_order_and_statuses() {
        let suite = suite_with(vec![
            passing("test_pass"),
            failing("test_fail"),
            erroring("test_error"),
            skipping("test_skip"),
        ]);
        let (_, logs) = extract(&suite);

        let got: Vec<(&str, TestStatus)> =
            logs.iter().map(|l| (l.name.as_str(), l.status)).collect();
        assert_eq!(
            got,
            vec![
                ("test_pass", TestStatus::Passed),
                ("test_fail", TestStatus::Failed),
                ("test_error", TestStatus::Failed),
                ("test_skip", TestStatus::Skipped),
            ]
        );
    }

    #[test]
    fn failure_outranks_skipped() {
        let testcase = TestCase {
            skipped: Some(Skipped::default()),
            ..failing("test_both")
        };
        assert_eq!(classify(&testcase), TestStatus::Failed);
    }

    #[test]
    fn parametrized_names_are_stripped() {
        assert_eq!(base_name("test_login[chrome-3]"), "test_login");
        assert_eq!(base_name("test_ids[1][2]"), "test_ids");
    }

    #[test]
    fn plain_names_pass_through_unchanged() {
        assert_eq!(base_name("test_pass"), "test_pass");
        assert_eq!(base_name("test.with.dots[x]"), "test.with.dots[x]");
        assert_eq!(base_name("test_open["), "test_open[");
        assert_eq!(base_name("test_empty[]"), "test_empty[]");
        assert_eq!(base_name(""), "");
    }

    #[test]
    fn assemble_passes_the_cycle_through_verbatim() {
        let suite = suite_with(vec![passing("test_pass")]);
        let request = assemble(&suite, "  CL-7 (nightly) ");
        assert_eq!(request.test_cycle, "  CL-7 (nightly) ");
        assert_eq!(request.test_logs.len(), 1);
        assert!(chrono::NaiveDateTime::parse_from_str(&request.execution_date, ZULU).is_ok());
    }

    #[test]
    fn serialized_json_round_trips() {
        let mut suite = suite_with(vec![passing("test_pass[a]"), failing("test_fail")]);
        suite.properties = branch_property("release-5");
        let request = assemble(&suite, "CL-1");

        let bytes = serialize(&request).unwrap();
        let parsed: AutomationRequest = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn serialized_json_uses_the_documented_field_names() {
        let suite = suite_with(vec![skipping("test_skip")]);
        let bytes = serialize(&assemble(&suite, "CL-1")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["test_cycle"], "CL-1");
        let log = &value["test_logs"][0];
        assert_eq!(log["status"], "SKIPPED");
        assert_eq!(log["module_names"][0], "Unknown");
        assert!(log["exe_start_date"].is_string());
        assert!(log["exe_end_date"].is_string());
        assert!(log["automation_content"].is_string());
    }

    #[test]
    fn unwritable_destination_is_a_write_failure() {
        let err = write_to_path(b"{}", Path::new("/no/such/dir/request.json")).unwrap_err();
        assert!(matches!(err, UploadError::WriteFailure { .. }), "{err}");
    }
}
