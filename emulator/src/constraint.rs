use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintResult {
    Satisfied,
    Violated,
}

/// Evaluates `require` assertions. Once a check fails the enforcer stays
/// violated for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct ConstraintEnforcer {
    checked: usize,
    violated_at: Option<usize>,
}

impl ConstraintEnforcer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, condition: bool) -> ConstraintResult {
        let site = self.checked;
        self.checked += 1;

        if condition {
            ConstraintResult::Satisfied
        } else {
            self.violated_at.get_or_insert(site);
            ConstraintResult::Violated
        }
    }

    /// Number of `require` calls seen, satisfied or not.
    pub fn checked(&self) -> usize {
        self.checked
    }

    pub fn violated_at(&self) -> Option<usize> {
        self.violated_at
    }
}
