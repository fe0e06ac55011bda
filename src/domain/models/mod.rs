pub mod variable;

pub use variable::{DisplayHints, UpdateId, VariableId, VariableUpdate, VariableValue};
