use std::path::{Path, PathBuf};

use super::classify::classify;
use super::probe::{path_is_writable, probe, SchemeRegistry};
use super::types::{EvaluatedRule, Rule, RulePartition};
use crate::config::INSTALL_PROBE_PATH;

/// Classifies and probes rules against the live system.
pub struct RuleEvaluator<R> {
    registry: R,
    install_probe_path: PathBuf,
}

impl<R: SchemeRegistry> RuleEvaluator<R> {
    pub fn new(registry: R) -> Self {
        RuleEvaluator {
            registry,
            install_probe_path: PathBuf::from(INSTALL_PROBE_PATH),
        }
    }

    pub fn with_install_probe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.install_probe_path = path.into();
        self
    }

    pub fn install_probe_path(&self) -> &Path {
        &self.install_probe_path
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Whether this install can write outside its sandbox. Without it
    /// deletion should not be offered at all.
    pub fn has_install_permission(&self) -> bool {
        path_is_writable(&self.install_probe_path)
    }

    pub fn evaluate_rule(&self, rule: Rule) -> EvaluatedRule {
        let kind = classify(rule.path());
        let exists = probe(rule.path(), kind, &self.registry);
        log::debug!("Probed {} as {:?}: exists={}", rule.path(), kind, exists);
        EvaluatedRule::new(rule, kind, exists)
    }

    /// Evaluate every rule; order is preserved and selection comes from each rule.
    pub fn evaluate(&self, rules: Vec<Rule>) -> Vec<EvaluatedRule> {
        rules
            .into_iter()
            .map(|rule| self.evaluate_rule(rule))
            .collect()
    }

    /// Re-probe already evaluated rules in place, keeping the user's selection.
    pub fn refresh(&self, rules: &mut [EvaluatedRule]) {
        for rule in rules.iter_mut() {
            let kind = classify(rule.path());
            let exists = probe(rule.path(), kind, &self.registry);
            rule.reprobe(kind, exists);
        }
    }
}

/// Split evaluated rules into scheme rules and path rules.
pub fn partition(rules: Vec<EvaluatedRule>) -> RulePartition {
    let (scheme_rules, path_rules): (Vec<_>, Vec<_>) =
        rules.into_iter().partition(EvaluatedRule::is_scheme);
    RulePartition {
        scheme_rules,
        path_rules,
    }
}
