//! Report Loader: reads a JUnitXML results file into the typed model,
//! rejecting unreadable paths, malformed XML, and documents whose root is not
//! the expected `testsuite` element.

use crate::error::UploadError;
use crate::model::TestSuite;
use std::fs;
use std::path::Path;
use xml::reader::{EventReader, XmlEvent};

const ROOT_ELEMENT: &str = "testsuite";

/// Read and validate the results file at `path`.
///
/// The returned suite is positioned at the `testsuite` root, ready for
/// extraction. The three failure kinds are kept distinct so the CLI can name
/// exactly which precondition broke: the read itself, XML well-formedness, or
/// the root element.
pub fn load_report(path: &Path) -> Result<TestSuite, UploadError> {
    let bytes = fs::read(path).map_err(|source| UploadError::InvalidPath {
        path: path.to_path_buf(),
        source,
    })?;

    // undecodable bytes are a content problem, not a read problem
    let raw = String::from_utf8(bytes).map_err(|e| UploadError::MalformedXml {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let root = root_element(&raw).map_err(|reason| UploadError::MalformedXml {
        path: path.to_path_buf(),
        reason,
    })?;

    if root != ROOT_ELEMENT {
        return Err(UploadError::WrongRootElement {
            path: path.to_path_buf(),
            found: root,
        });
    }

    yaserde::de::from_str(&raw).map_err(|reason| UploadError::MalformedXml {
        path: path.to_path_buf(),
        reason,
    })
}

/// Name of the document's root element, or the first well-formedness error
/// hit while looking for it.
fn root_element(raw: &str) -> Result<String, String> {
    for event in EventReader::from_str(raw) {
        if let XmlEvent::StartElement { name, .. } = event.map_err(|e| e.to_string())? {
            return Ok(name.local_name);
        }
    }
    Err("the document has no root element".to_string())
}
