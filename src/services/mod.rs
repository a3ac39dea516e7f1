// Theme Validator Services
// Detection, parsing, contract checks and reporting

mod text_scan;
mod parse_error;
mod format_detector;
mod css_parser;
mod json_parser;
mod source_lexer;
mod source_parser;
mod contract_registry;
mod validator;
mod run_coordinator;
mod output_formatter;

pub use text_scan::strip_jsonc_comments;
pub use parse_error::*;
pub use format_detector::*;
pub use css_parser::*;
pub use json_parser::*;
pub use source_parser::*;
pub use contract_registry::*;
pub use validator::*;
pub use run_coordinator::*;
pub use output_formatter::*;
