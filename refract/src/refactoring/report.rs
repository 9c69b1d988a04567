//! Serialisable form of refactoring records.

use super::{Refactoring, RefactoringRecord};
use crate::error::DiffError;
use crate::location::CodeRange;
use facet::Facet;

/// One code range, flattened for output.
#[derive(Facet, Debug, Clone, PartialEq)]
pub struct LocationReport {
    #[facet(rename = "filePath")]
    pub file_path: String,
    #[facet(rename = "startLine")]
    pub start_line: u32,
    #[facet(rename = "endLine")]
    pub end_line: u32,
    #[facet(rename = "startColumn")]
    pub start_column: u32,
    #[facet(rename = "endColumn")]
    pub end_column: u32,
    #[facet(rename = "codeElementType")]
    pub code_element_type: String,
    pub description: String,
    #[facet(rename = "codeElement")]
    pub code_element: Option<String>,
}

impl LocationReport {
    fn of(range: &CodeRange) -> Self {
        Self {
            file_path: range.file.clone(),
            start_line: range.range.start_line,
            end_line: range.range.end_line,
            start_column: range.range.start_column,
            end_column: range.range.end_column,
            code_element_type: range.element_type.name().to_string(),
            description: range.description.clone(),
            code_element: range.code_element.clone(),
        }
    }
}

/// One refactoring, flattened for output.
#[derive(Facet, Debug, Clone, PartialEq)]
pub struct RefactoringReport {
    #[facet(rename = "type")]
    pub ty: String,
    pub description: String,
    #[facet(rename = "leftSideLocations")]
    pub left_side_locations: Vec<LocationReport>,
    #[facet(rename = "rightSideLocations")]
    pub right_side_locations: Vec<LocationReport>,
}

impl RefactoringReport {
    pub(crate) fn of(refactoring: &Refactoring) -> Self {
        Self {
            ty: refactoring.refactoring_type().tag().to_string(),
            description: refactoring.description(),
            left_side_locations: refactoring.left_side().iter().map(LocationReport::of).collect(),
            right_side_locations: refactoring
                .right_side()
                .iter()
                .map(LocationReport::of)
                .collect(),
        }
    }
}

/// Serialise refactorings as a JSON array of reports.
pub fn reports_to_json(refactorings: &[Refactoring]) -> Result<String, DiffError> {
    let reports: Vec<RefactoringReport> = refactorings.iter().map(Refactoring::to_report).collect();
    facet_json::to_string(&reports).map_err(|e| DiffError::Serialization {
        message: e.to_string(),
    })
}
