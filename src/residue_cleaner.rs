mod classify;
mod deletion;
mod error;
mod evaluate;
mod probe;
mod rule_source;
mod types;


pub use classify::classify;
pub use deletion::{
    commit, delete_selected, request_deletion, selected_count, DeletionPlan, DeletionReport,
};
pub use error::{DeletionError, ParseError, RuleDocumentError};
pub use evaluate::{partition, RuleEvaluator};
pub use probe::{path_is_writable, DesktopSchemeRegistry, SchemeRegistry, StaticSchemeRegistry};
pub use rule_source::{default_rules, read_rule_document, write_rule_document, RuleSource};
pub use types::{EvaluatedRule, LoadedRules, Rule, RuleKind, RuleOrigin, RulePartition};
