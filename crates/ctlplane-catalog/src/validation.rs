//! Collected validation results, grounded on the teacher's
//! `skillsrs-skillstore::ValidationResult` (errors always collect; callers
//! choose whether to surface them as BadRequest).

use ctlplane_core::error::ValidationIssue;

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn with_error(issue: ValidationIssue) -> Self {
        let mut result = Self::default();
        result.add_error(issue);
        result
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.errors.extend(issues);
    }
}
