//! Classify RESTCONF responses as transient (retry) or permanent.

use crate::config::TransientRuleConfig;
use crate::response::{ErrorRecord, ResponseEnvelope};
use regex::Regex;

/// How a rule field is compared against an error field.
#[derive(Debug, Clone)]
pub enum FieldPattern {
    /// Literal substring.
    Contains(String),
    /// Regular expression, matched anywhere in the field.
    Regex(Regex),
}

impl FieldPattern {
    fn matches(&self, value: Option<&str>) -> bool {
        let value = value.unwrap_or("");
        match self {
            FieldPattern::Contains(s) => value.contains(s.as_str()),
            FieldPattern::Regex(re) => re.is_match(value),
        }
    }
}

/// Partial pattern over an error record plus an optional exact status.
/// Unset fields are wildcards.
#[derive(Debug, Clone, Default)]
pub struct TransientRule {
    pub status: Option<u16>,
    pub error_type: Option<FieldPattern>,
    pub error_tag: Option<FieldPattern>,
    pub error_app_tag: Option<FieldPattern>,
    pub error_path: Option<FieldPattern>,
    pub error_message: Option<FieldPattern>,
    pub error_info: Option<FieldPattern>,
}

impl TransientRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn error_tag(mut self, tag: &str) -> Self {
        self.error_tag = Some(FieldPattern::Contains(tag.to_string()));
        self
    }

    pub fn error_message(mut self, message: &str) -> Self {
        self.error_message = Some(FieldPattern::Contains(message.to_string()));
        self
    }

    /// True when the rule constrains nothing but the status code, so it can
    /// apply to responses that carry no structured errors.
    pub fn is_status_only(&self) -> bool {
        self.fields().iter().all(|(p, _)| p.is_none())
    }

    fn matches_status(&self, status: u16) -> bool {
        self.status.map_or(true, |s| s == status)
    }

    /// Every set field matches the corresponding response field.
    pub fn matches(&self, status: u16, error: &ErrorRecord) -> bool {
        self.matches_status(status)
            && self.fields().iter().all(|(pattern, extract)| match pattern {
                Some(p) => p.matches(extract(error)),
                None => true,
            })
    }

    #[allow(clippy::type_complexity)]
    fn fields(&self) -> [(&Option<FieldPattern>, fn(&ErrorRecord) -> Option<&str>); 6] {
        [
            (&self.error_type, |e| e.error_type.as_deref()),
            (&self.error_tag, |e| e.error_tag.as_deref()),
            (&self.error_app_tag, |e| e.error_app_tag.as_deref()),
            (&self.error_path, |e| e.error_path.as_deref()),
            (&self.error_message, |e| e.error_message.as_deref()),
            (&self.error_info, |e| e.error_info.as_deref()),
        ]
    }
}

impl TryFrom<&TransientRuleConfig> for TransientRule {
    type Error = regex::Error;

    fn try_from(cfg: &TransientRuleConfig) -> Result<Self, Self::Error> {
        let compile = |p: &Option<String>| -> Result<Option<FieldPattern>, regex::Error> {
            p.as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| Regex::new(s).map(FieldPattern::Regex))
                .transpose()
        };
        Ok(Self {
            status: cfg.status,
            error_type: compile(&cfg.error_type)?,
            error_tag: compile(&cfg.error_tag)?,
            error_app_tag: compile(&cfg.error_app_tag)?,
            error_path: compile(&cfg.error_path)?,
            error_message: compile(&cfg.error_message)?,
            error_info: compile(&cfg.error_info)?,
        })
    }
}

/// Built-in table: inconsistent-value validation errors on 400, lock
/// contention at any status, and bare 500-504.
pub fn default_rules() -> Vec<TransientRule> {
    let mut rules = vec![
        TransientRule::new()
            .status(400)
            .error_tag("invalid-value")
            .error_message("inconsistent value"),
        TransientRule::new().error_tag("lock-denied"),
        TransientRule::new().error_tag("in-use"),
    ];
    rules.extend((500..=504).map(|s| TransientRule::new().status(s)));
    rules
}

/// Ordered rule table; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    rules: Vec<TransientRule>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl ErrorClassifier {
    pub fn new(rules: Vec<TransientRule>) -> Self {
        Self { rules }
    }

    /// Compile a configured rule table.
    pub fn from_config(rules: &[TransientRuleConfig]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(TransientRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[TransientRule] {
        &self.rules
    }

    /// Index of the first rule matching the envelope.
    ///
    /// Candidates are the top-level errors followed by per-edit errors of a
    /// patch status. A response without any structured error is only
    /// checked against status-only rules.
    pub fn find_match(&self, envelope: &ResponseEnvelope) -> Option<usize> {
        let errors: Vec<&ErrorRecord> = envelope.all_errors().collect();
        if errors.is_empty() {
            return self
                .rules
                .iter()
                .position(|r| r.is_status_only() && r.matches_status(envelope.status));
        }
        errors.iter().find_map(|e| {
            self.rules
                .iter()
                .position(|r| r.matches(envelope.status, e))
        })
    }

    pub fn is_transient(&self, envelope: &ResponseEnvelope) -> bool {
        match self.find_match(envelope) {
            Some(idx) => {
                tracing::debug!(rule = idx, status = envelope.status, "transient rule matched");
                true
            }
            None => false,
        }
    }
}
