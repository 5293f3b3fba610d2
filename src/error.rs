//! Errors surfaced while folding constant operators.

use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// Reasons why folding an operator failed.
///
/// A pattern that simply does not apply (eg. because an operand is not a
/// constant) is not an error; patterns report that case by returning `None`
/// and the rewrite driver moves on. A `FoldError` means the operator *was*
/// foldable in principle but its operands or attributes are malformed, and
/// the pass must fail with a diagnostic.
#[derive(Debug, Eq, PartialEq)]
pub enum FoldError {
    /// Operand shapes are not compatible with each other, with operator
    /// attributes, or with the declared result shape.
    ShapeMismatch(&'static str),

    /// A configuration that is valid ONNX but that the folder does not
    /// evaluate, such as an empty reduction with no identity or a split
    /// with dynamic sizes.
    UnsupportedConfiguration(&'static str),

    /// A gather/scatter index or slice parameter selects elements outside
    /// the operand.
    IndexOutOfRange(&'static str),

    /// An attribute or operand has a value that is structurally invalid.
    InvalidValue(&'static str),
}

impl Display for FoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldError::ShapeMismatch(details) => {
                write!(f, "incompatible shapes: {}", details)
            }
            FoldError::UnsupportedConfiguration(details) => {
                write!(f, "unsupported configuration: {}", details)
            }
            FoldError::IndexOutOfRange(details) => {
                write!(f, "index out of range: {}", details)
            }
            FoldError::InvalidValue(details) => {
                write!(f, "invalid attribute or operand value: {}", details)
            }
        }
    }
}

impl Error for FoldError {}
