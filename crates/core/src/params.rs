//! Strategy parameter sets and templates.
//!
//! Optimized parameters are passed explicitly into fixed-parameter runs as
//! an immutable [`ParameterSet`]; nothing here mutates shared strategy
//! state, which keeps parallel batch execution safe.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An immutable mapping from parameter name to scalar value.
///
/// Keys are kept sorted so that [`ParameterSet::signature`] is deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSet {
    values: BTreeMap<String, f64>,
}

impl ParameterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Deterministic `"k1=v1,k2=v2"` rendering used for trade provenance.
    #[must_use]
    pub fn signature(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<(String, f64)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A strategy identity plus its default parameters.
///
/// The template never carries optimized values; those travel separately as a
/// [`ParameterSet`] chosen per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTemplate {
    pub name: String,
    pub defaults: ParameterSet,
}

impl StrategyTemplate {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: ParameterSet::new(),
        }
    }

    /// Sets the default parameters used by unconstrained runs.
    #[must_use]
    pub fn with_defaults(mut self, defaults: ParameterSet) -> Self {
        self.defaults = defaults;
        self
    }

    /// `"name(k1=v1,k2=v2)"` provenance string for a concrete run.
    #[must_use]
    pub fn signature(&self, params: &ParameterSet) -> String {
        format!("{}({})", self.name, params.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_sorted_and_deterministic() {
        let a = ParameterSet::new().with("n2", 20.0).with("n1", 5.0);
        let b = ParameterSet::new().with("n1", 5.0).with("n2", 20.0);

        assert_eq!(a.signature(), "n1=5,n2=20");
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn signature_of_empty_set_is_empty() {
        assert_eq!(ParameterSet::new().signature(), "");
    }

    #[test]
    fn get_returns_inserted_value() {
        let params = ParameterSet::new().with("n1", 5.0);
        assert_eq!(params.get("n1"), Some(5.0));
        assert_eq!(params.get("n2"), None);
    }

    #[test]
    fn template_signature_wraps_params() {
        let strategy = StrategyTemplate::new("sma_cross");
        let params = ParameterSet::new().with("n1", 5.0).with("n2", 20.0);
        assert_eq!(strategy.signature(&params), "sma_cross(n1=5,n2=20)");
    }

    #[test]
    fn serde_roundtrip() {
        let params = ParameterSet::new().with("n1", 5.0).with("n2", 20.0);
        let json = serde_json::to_string(&params).unwrap();
        let back: ParameterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
