//! Constrained parameter grids for optimization.
//!
//! A grid is the Cartesian product of candidate values per parameter,
//! filtered by an optional constraint. The constraint is a data-driven rule
//! rather than a closure so it serializes and can cross a process boundary.

use serde::{Deserialize, Serialize};
use walkforward_core::ParameterSet;

/// A pure, serializable predicate over a candidate parameter set.
///
/// A rule referencing a parameter missing from the candidate rejects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// `left < right`, e.g. "fast period < slow period".
    LessThan { left: String, right: String },
    /// `left <= right`.
    LessOrEqual { left: String, right: String },
    /// Every inner constraint must hold.
    All(Vec<Constraint>),
}

impl Constraint {
    /// Evaluates the rule against a candidate.
    #[must_use]
    pub fn accepts(&self, params: &ParameterSet) -> bool {
        match self {
            Self::LessThan { left, right } => match (params.get(left), params.get(right)) {
                (Some(l), Some(r)) => l < r,
                _ => false,
            },
            Self::LessOrEqual { left, right } => match (params.get(left), params.get(right)) {
                (Some(l), Some(r)) => l <= r,
                _ => false,
            },
            Self::All(rules) => rules.iter().all(|rule| rule.accepts(params)),
        }
    }
}

/// Candidate values per parameter plus an optional constraint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterGrid {
    axes: Vec<(String, Vec<f64>)>,
    constraint: Option<Constraint>,
}

impl ParameterGrid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one parameter axis, builder style.
    #[must_use]
    pub fn with_axis(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.axes.push((name.into(), values));
        self
    }

    /// Sets the constraint filtering invalid combinations.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Names of the grid's parameters, in axis order.
    #[must_use]
    pub fn parameter_names(&self) -> Vec<&str> {
        self.axes.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Expands the constrained Cartesian product, axis-major.
    ///
    /// An empty grid expands to nothing; so does a grid whose constraint
    /// rejects every combination. Callers decide whether that is an error.
    #[must_use]
    pub fn expand(&self) -> Vec<ParameterSet> {
        if self.axes.is_empty() || self.axes.iter().any(|(_, values)| values.is_empty()) {
            return Vec::new();
        }

        let mut combos = vec![ParameterSet::new()];
        for (name, values) in &self.axes {
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for &value in values {
                    next.push(combo.clone().with(name.clone(), value));
                }
            }
            combos = next;
        }

        match &self.constraint {
            Some(rule) => combos.into_iter().filter(|c| rule.accepts(c)).collect(),
            None => combos,
        }
    }
}
