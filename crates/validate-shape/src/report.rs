//! Plain-text rendering of validation errors.

use shape_validation::{ValidationError, ValidationErrors};
use std::fmt;

/// One line per error; union sub-errors are nested under `first:` and `second:`.
pub struct TextReport<'a>(pub &'a ValidationErrors);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in self.0 {
            write_error(f, error, 0)?;
        }
        Ok(())
    }
}

fn write_error(f: &mut fmt::Formatter<'_>, error: &ValidationError, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    writeln!(f, "{}error at {}: {}", indent, error.path, error.message)?;
    if let Some(sub) = &error.sub_errors {
        for (label, branch) in [("first", &sub.first), ("second", &sub.second)] {
            writeln!(f, "{}  {}:", indent, label)?;
            for nested in branch {
                write_error(f, nested, depth + 2)?;
            }
        }
    }
    Ok(())
}
