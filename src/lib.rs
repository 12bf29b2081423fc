mod config;
mod residue_cleaner;
mod session;

pub use config::{
    CleanerConfig, DISABLE_SCHEME_QUERY_ENV, HINT_FILE_NAME, INSTALL_PROBE_PATH, RULE_FILE_NAME,
    STORAGE_DIR_ENV,
};
pub use residue_cleaner::{
    classify, commit, default_rules, delete_selected, partition, path_is_writable,
    read_rule_document, request_deletion, selected_count, write_rule_document, DeletionError,
    DeletionPlan, DeletionReport, DesktopSchemeRegistry, EvaluatedRule, LoadedRules, ParseError,
    Rule, RuleDocumentError, RuleEvaluator, RuleKind, RuleOrigin, RulePartition, RuleSource,
    SchemeRegistry, StaticSchemeRegistry,
};
pub use session::{CleanerSession, SessionError, SessionSnapshot};
