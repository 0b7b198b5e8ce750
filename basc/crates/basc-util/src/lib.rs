//! basc-util - Shared infrastructure for the basc compiler.
//!
//! This crate holds the pieces every pipeline stage needs: source
//! positions, the diagnostic collector, the value-type enumeration and
//! the variable-name canonicalization/decoration rules.

pub mod diagnostic;
pub mod names;
pub mod position;
pub mod value;

pub use diagnostic::{Diagnostic, Handler};
pub use names::{canonical_name, decorated_name, name_value_type};
pub use position::Pos;
pub use value::ValueType;

/// Largest line number accepted in source programs.
///
/// The label `L65536` (one past this) serves as the universal
/// "after the end of the program" jump target.
pub const MAX_LINE_NUMBER: u32 = 65535;
