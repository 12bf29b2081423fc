use serde::Serialize;
use thiserror::Error;

use crate::config::CleanerConfig;
use crate::residue_cleaner::{
    commit, partition, request_deletion, selected_count, DeletionError, DeletionPlan,
    DeletionReport, DesktopSchemeRegistry, EvaluatedRule, ParseError, RuleDocumentError,
    RuleEvaluator, RuleOrigin, RuleSource, SchemeRegistry,
};

/// Why a deletion plan was refused before any confirmation is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no rules are selected for deletion")]
    NothingSelected,
    #[error("this install cannot modify files outside its sandbox")]
    MissingInstallPermission,
}

/// Everything the GUI needs to render one frame of the rule lists.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub origin: RuleOrigin,
    pub install_permission: bool,
    pub selected_count: usize,
    pub scheme_rules: Vec<EvaluatedRule>,
    pub path_rules: Vec<EvaluatedRule>,
}

/// Working rule set for one screen of the app.
///
/// Load, evaluate and partition happen on [`reload`](Self::reload); the GUI
/// toggles selection on path rules and drives deletion through
/// [`request_deletion`](Self::request_deletion) and [`commit`](Self::commit).
/// `commit` takes `&mut self`, so only one deletion can be in flight per session.
pub struct CleanerSession<R: SchemeRegistry = DesktopSchemeRegistry> {
    source: RuleSource,
    evaluator: RuleEvaluator<R>,
    origin: RuleOrigin,
    scheme_rules: Vec<EvaluatedRule>,
    path_rules: Vec<EvaluatedRule>,
    load_error: Option<ParseError>,
    install_permission: bool,
}

impl CleanerSession<DesktopSchemeRegistry> {
    pub fn open(config: &CleanerConfig) -> Self {
        Self::with_registry(config, DesktopSchemeRegistry::new())
    }
}

impl<R: SchemeRegistry> CleanerSession<R> {
    pub fn with_registry(config: &CleanerConfig, registry: R) -> Self {
        let evaluator = RuleEvaluator::new(registry)
            .with_install_probe_path(config.install_probe_path.clone());
        let install_permission = evaluator.has_install_permission();
        let mut session = CleanerSession {
            source: RuleSource::new(config),
            evaluator,
            origin: RuleOrigin::Default,
            scheme_rules: Vec::new(),
            path_rules: Vec::new(),
            load_error: None,
            install_permission,
        };
        session.reload();
        session
    }

    /// Rebuild the working set from disk. Selections reset to each rule's default.
    pub fn reload(&mut self) {
        let (loaded, err) = self.source.load_or_default();
        self.origin = loaded.origin;
        if err.is_some() {
            self.load_error = err;
        }

        let split = partition(self.evaluator.evaluate(loaded.rules));
        self.scheme_rules = split.scheme_rules;
        self.path_rules = split.path_rules;
    }

    pub fn origin(&self) -> RuleOrigin {
        self.origin
    }

    pub fn has_install_permission(&self) -> bool {
        self.install_permission
    }

    pub fn scheme_rules(&self) -> &[EvaluatedRule] {
        &self.scheme_rules
    }

    pub fn path_rules(&self) -> &[EvaluatedRule] {
        &self.path_rules
    }

    pub fn rule_source(&self) -> &RuleSource {
        &self.source
    }

    /// Pending load failure, handed out once.
    pub fn take_load_error(&mut self) -> Option<ParseError> {
        self.load_error.take()
    }

    /// Flip selection of the path rule at `index`; `None` if out of range.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        self.path_rules.get_mut(index).map(EvaluatedRule::toggle_selected)
    }

    pub fn set_selected(&mut self, index: usize, selected: bool) -> bool {
        match self.path_rules.get_mut(index) {
            Some(rule) => {
                rule.set_selected(selected);
                true
            }
            None => false,
        }
    }

    pub fn selected_count(&self) -> usize {
        selected_count(&self.path_rules)
    }

    /// Plan the deletion for the confirmation dialog. Pure.
    pub fn request_deletion(&self) -> Result<DeletionPlan, SessionError> {
        if !self.install_permission {
            return Err(SessionError::MissingInstallPermission);
        }
        let plan = request_deletion(&self.path_rules);
        if plan.is_empty() {
            return Err(SessionError::NothingSelected);
        }
        Ok(plan)
    }

    /// Execute a confirmed plan, then reload so the lists show the new disk state.
    pub fn commit(&mut self, plan: DeletionPlan) -> Result<DeletionReport, DeletionError> {
        let result = commit(plan);
        self.reload();
        result
    }

    /// Persist the current path and scheme rules as the user's rule document.
    /// `lookup` is the GUI's localization function; keys are saved as its output.
    pub fn save_rules<F>(&self, lookup: F) -> Result<(), RuleDocumentError>
    where
        F: Fn(&str) -> String,
    {
        let all: Vec<EvaluatedRule> = self
            .scheme_rules
            .iter()
            .chain(self.path_rules.iter())
            .cloned()
            .collect();
        self.source.save(&all, lookup)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            origin: self.origin,
            install_permission: self.install_permission,
            selected_count: self.selected_count(),
            scheme_rules: self.scheme_rules.clone(),
            path_rules: self.path_rules.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residue_cleaner::StaticSchemeRegistry;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> CleanerConfig {
        let mut config = CleanerConfig::with_storage_dir(dir.path().join("Documents"));
        // Any writable directory stands in for the system preferences folder.
        config.install_probe_path = dir.path().to_path_buf();
        config
    }

    fn write_rules(config: &CleanerConfig, json: &str) {
        fs::create_dir_all(&config.storage_dir).unwrap();
        fs::write(config.rule_file_path(), json).unwrap();
    }

    #[test]
    fn default_session_splits_builtin_rules() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        let session = CleanerSession::with_registry(&config, StaticSchemeRegistry::default());

        assert_eq!(session.origin(), RuleOrigin::Default);
        assert_eq!(session.scheme_rules().len(), 1);
        assert_eq!(session.path_rules().len(), 7);
        assert_eq!(session.selected_count(), 5);
        assert!(config.hint_file_path().exists());
    }

    #[test]
    fn broken_document_reports_once_and_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        write_rules(&config, "not json at all");

        let mut session = CleanerSession::with_registry(&config, StaticSchemeRegistry::default());
        assert_eq!(session.origin(), RuleOrigin::Default);
        assert!(matches!(
            session.take_load_error(),
            Some(ParseError::Decode { .. })
        ));
        assert!(session.take_load_error().is_none());
    }

    #[test]
    fn nothing_selected_is_refused_before_confirmation() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        write_rules(
            &config,
            r#"[{"path": "/tmp/x", "description": "x", "isSelected": false}]"#,
        );

        let mut session = CleanerSession::with_registry(&config, StaticSchemeRegistry::default());
        assert_eq!(session.request_deletion(), Err(SessionError::NothingSelected));

        assert_eq!(session.toggle(0), Some(true));
        assert_eq!(session.selected_count(), 1);
        assert_eq!(session.toggle(5), None);
    }

    #[test]
    fn missing_install_permission_blocks_planning() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(&temp_dir);
        config.install_probe_path = temp_dir.path().join("no-such-dir");

        let session = CleanerSession::with_registry(&config, StaticSchemeRegistry::default());
        assert!(!session.has_install_permission());
        assert_eq!(
            session.request_deletion(),
            Err(SessionError::MissingInstallPermission)
        );
    }

    #[test]
    fn commit_deletes_and_reloads_fresh_state() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        let residue = temp_dir.path().join("residue");
        fs::create_dir_all(residue.join("sub")).unwrap();
        let kept = temp_dir.path().join("kept");
        fs::write(&kept, b"k").unwrap();
        write_rules(
            &config,
            &format!(
                r#"[
                    {{"path": "Filza://", "description": "scheme", "isSelected": true}},
                    {{"path": "{}", "description": "residue", "isSelected": true}},
                    {{"path": "{}", "description": "kept", "isSelected": false}}
                ]"#,
                residue.display(),
                kept.display()
            ),
        );

        let mut session =
            CleanerSession::with_registry(&config, StaticSchemeRegistry::new(["filza"]));
        assert_eq!(session.origin(), RuleOrigin::User);
        assert!(session.scheme_rules()[0].exists());
        assert!(session.path_rules()[0].exists());

        // user also ticks the second entry, then changes their mind
        session.set_selected(1, true);
        session.set_selected(1, false);

        let plan = session.request_deletion().unwrap();
        assert_eq!(plan.len(), 1);
        let report = session.commit(plan).unwrap();

        assert_eq!(report.removed, vec![residue.clone()]);
        assert!(!residue.exists());
        assert!(kept.exists());
        assert!(!session.path_rules()[0].exists());
        assert!(session.path_rules()[1].exists());
    }

    #[test]
    fn snapshot_mirrors_session_state() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        let mut session = CleanerSession::with_registry(&config, StaticSchemeRegistry::default());
        session.toggle(0);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.selected_count, 4);
        assert_eq!(snapshot.path_rules.len(), 7);
        assert!(snapshot.install_permission);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["origin"], "default");
    }

    #[test]
    fn saved_rules_reload_as_user_rules_with_selection() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        let mut session = CleanerSession::with_registry(&config, StaticSchemeRegistry::default());
        session.set_selected(6, true);
        session
            .save_rules(|key| format!("label for {}", key))
            .unwrap();

        session.reload();
        assert_eq!(session.origin(), RuleOrigin::User);
        assert_eq!(session.selected_count(), 6);
        assert!(session
            .path_rules()
            .iter()
            .all(|r| !r.rule().description_is_key()));
        assert_eq!(session.path_rules()[0].rule().description(), "label for Rule_1");
        assert_eq!(session.scheme_rules()[0].rule().description(), "Filza URL Scheme");
    }
}
