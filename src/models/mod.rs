// Theme Validator Models
// Data structures shared by parsers, validator and formatter

mod contract;
mod theme;
mod validation;

pub use contract::*;
pub use theme::*;
pub use validation::*;
