//! Command handlers - kept out of main.rs for testability

pub mod check;
pub mod plan;

pub use check::{check_chart, execute_check, CheckSummary};
pub use plan::{build_skip, execute_plan, load_chart, plan_chart};
