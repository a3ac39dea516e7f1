// Theme Validator Commands
// Entry points invoked by the command-line binary

mod validate;

pub use validate::*;
