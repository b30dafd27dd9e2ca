//! Conversion of validation failures into diagnostics.

use crate::error::{ValidationError, ValidationErrors};
use crate::validator::offending_value;
use prefab_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use prefab_value::Value;

const MAX_VALUE_LEN: usize = 60;

impl ValidationError {
    /// The error line, followed by a `got <value>` line when the offending
    /// value can be found in `data` (the value that was validated).
    ///
    /// For an invalid key the key itself is shown.
    pub fn describe(&self, data: &Value) -> String {
        if self.instance_path.is_empty() {
            return self.to_string();
        }
        match offending_value(&self.instance_path, data, self.is_key_error(), MAX_VALUE_LEN) {
            Some(got) => format!("{}\ngot {}", self, got),
            None => self.to_string(),
        }
    }
}

impl ValidationErrors {
    /// Build a diagnostic listing every error as a detail.
    ///
    /// The code is taken from the first error's kind. When the validated
    /// `data` is given, each detail also shows the offending value.
    pub fn to_diagnostic(&self, title: &str, data: Option<&Value>) -> DiagnosticMessage {
        let mut builder = DiagnosticMessageBuilder::error(title);
        if let Some(first) = self.first() {
            builder = builder.with_code(first.error_code());
        }
        for error in self {
            builder = match data {
                Some(data) => builder.add_detail(error.describe(data)),
                None => builder.add_detail(error.to_string()),
            };
        }
        builder.build()
    }
}
