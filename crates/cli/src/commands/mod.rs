pub mod check;
pub mod rules;

pub use check::check_command;
pub use rules::rules_command;
