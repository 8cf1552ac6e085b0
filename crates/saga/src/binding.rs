//! Step-argument binding.

use crate::error::BindingError;
use crate::step::{Arg, Step, StepResult};

/// Resolves the argument template of the step at `index` against the results
/// recorded so far.
///
/// Literals pass through untouched; placeholders are replaced by the value of
/// the step they reference. Values are opaque strings, nothing is coerced.
pub fn bind(index: usize, step: &Step, results: &[StepResult]) -> Result<Vec<String>, BindingError> {
    step.template()
        .iter()
        .map(|arg| match arg {
            Arg::Literal(value) => Ok(value.clone()),
            Arg::ResultOf { result_of } => resolve(index, *result_of, results),
        })
        .collect()
}

fn resolve(index: usize, referenced: usize, results: &[StepResult]) -> Result<String, BindingError> {
    if referenced >= index {
        return Err(BindingError::ForwardReference {
            step: index,
            referenced,
        });
    }

    let result = results.get(referenced).ok_or(BindingError::ForwardReference {
        step: index,
        referenced,
    })?;

    result
        .value()
        .filter(|_| result.succeeded())
        .map(str::to_string)
        .ok_or(BindingError::MissingValue {
            step: index,
            referenced,
        })
}

/// Checks a whole step list for placeholders that point at the same or a
/// later step. Used to reject malformed scenarios before running them.
pub fn check_references(steps: &[Step]) -> Result<(), BindingError> {
    for (index, step) in steps.iter().enumerate() {
        for arg in step.template() {
            if let Arg::ResultOf { result_of } = arg
                && *result_of >= index
            {
                return Err(BindingError::ForwardReference {
                    step: index,
                    referenced: *result_of,
                });
            }
        }
    }
    Ok(())
}
