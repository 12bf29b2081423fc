use serde::{Deserialize, Serialize};

/// Where a rule set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOrigin {
    /// Built-in table shipped with the app.
    Default,
    /// `Rule.json` supplied by the user.
    User,
}

/// What a rule string denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    FilePath,
    UrlScheme,
    /// Neither an absolute path nor a well-formed `scheme://` URL.
    Unclassifiable,
}

impl RuleKind {
    /// Anything that is not a file path is listed with the schemes and is never deletable.
    ///
    /// `Unclassifiable` sits in the scheme list so the two lists still cover
    /// every rule, yet it is never handed to the scheme registry: the string
    /// is not a URL, so asking whether it opens would be meaningless. It
    /// always shows as not present.
    pub fn is_scheme(self) -> bool {
        !matches!(self, RuleKind::FilePath)
    }
}

// -------- Rule document (wire format) --------

/// One entry of the rule document as it appears on disk.
///
/// Optional flags stay `Option` here; defaults are applied when the record
/// is turned into a [`Rule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RuleRecord {
    pub(crate) path: String,
    pub(crate) description: String,
    #[serde(
        rename = "isLocalizedKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) is_localized_key: Option<bool>,
    #[serde(rename = "isSelected")]
    pub(crate) is_selected: bool,
    #[serde(rename = "isURLScheme", default, skip_serializing_if = "Option::is_none")]
    pub(crate) is_url_scheme: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) exists: Option<bool>,
}

// -------- Rule values --------

/// A single cleanup candidate: a filesystem path or a URL scheme.
///
/// Immutable once built. Classification, existence and the user's current
/// selection live on [`EvaluatedRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    path: String,
    description: String,
    description_is_key: bool,
    selected: bool,
}

impl Rule {
    /// Build a rule with a literal description. Returns `None` for an empty path.
    pub fn new(
        path: impl Into<String>,
        description: impl Into<String>,
        selected: bool,
    ) -> Option<Self> {
        let path = path.into();
        if path.is_empty() {
            return None;
        }
        Some(Rule {
            path,
            description: description.into(),
            description_is_key: false,
            selected,
        })
    }

    /// Built-in rule whose description is a localization key.
    pub(crate) fn localized(path: &str, key: &str, selected: bool) -> Self {
        Rule {
            path: path.to_string(),
            description: key.to_string(),
            description_is_key: true,
            selected,
        }
    }

    /// Built-in rule with a literal description.
    pub(crate) fn literal(path: &str, description: &str, selected: bool) -> Self {
        Rule {
            path: path.to_string(),
            description: description.to_string(),
            description_is_key: false,
            selected,
        }
    }

    /// Decode a user-supplied record. Localization keys in imported documents are
    /// never trusted, and the document's `exists`/`isURLScheme` hints are dropped
    /// because both are derived by evaluation.
    pub(crate) fn from_user_record(record: RuleRecord) -> Option<Self> {
        let RuleRecord {
            path,
            description,
            is_selected,
            ..
        } = record;
        Rule::new(path, description, is_selected)
    }

    /// Record for the user document. Keys are resolved through `lookup` and
    /// written as literal text, since loading never trusts localized keys.
    pub(crate) fn to_record<F>(&self, selected: bool, lookup: F) -> RuleRecord
    where
        F: FnOnce(&str) -> String,
    {
        RuleRecord {
            path: self.path.clone(),
            description: self.display_description(lookup),
            is_localized_key: Some(false),
            is_selected: selected,
            is_url_scheme: None,
            exists: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// True when `description` is a key the presentation layer must localize.
    pub fn description_is_key(&self) -> bool {
        self.description_is_key
    }

    /// Initial selection for this rule.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Description as shown to the user. `lookup` is only called for keys.
    pub fn display_description<F>(&self, lookup: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        if self.description_is_key {
            lookup(&self.description)
        } else {
            self.description.clone()
        }
    }
}

/// A rule after classification and probing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluatedRule {
    rule: Rule,
    kind: RuleKind,
    exists: bool,
    selected: bool,
}

impl EvaluatedRule {
    pub(crate) fn new(rule: Rule, kind: RuleKind, exists: bool) -> Self {
        let selected = rule.selected;
        EvaluatedRule {
            rule,
            kind,
            exists,
            selected,
        }
    }

    /// Replace the derived state; selection is kept.
    pub(crate) fn reprobe(&mut self, kind: RuleKind, exists: bool) {
        self.kind = kind;
        self.exists = exists;
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn path(&self) -> &str {
        self.rule.path()
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn is_scheme(&self) -> bool {
        self.kind.is_scheme()
    }

    /// Paths: exists and is writable. Schemes: a handler is registered.
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Flip the selection and return the new value.
    pub fn toggle_selected(&mut self) -> bool {
        self.selected = !self.selected;
        self.selected
    }

    /// Only selected path rules are ever handed to the deletion engine.
    pub fn is_deletion_candidate(&self) -> bool {
        self.selected && !self.is_scheme()
    }

    pub(crate) fn to_record<F>(&self, lookup: F) -> RuleRecord
    where
        F: FnOnce(&str) -> String,
    {
        let mut record = self.rule.to_record(self.selected, lookup);
        record.is_url_scheme = Some(self.is_scheme());
        record.exists = Some(self.exists);
        record
    }
}

/// Evaluated rules split by kind, input order preserved on both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RulePartition {
    pub scheme_rules: Vec<EvaluatedRule>,
    pub path_rules: Vec<EvaluatedRule>,
}

/// Output of a load cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRules {
    pub rules: Vec<Rule>,
    pub origin: RuleOrigin,
}
