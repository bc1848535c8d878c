use std::fmt;

/// Soft limit shown next to the input box
pub const MAX_INPUT_CHARS: usize = 4000;

const WARNING_ABOVE: usize = 3500;
const CRITICAL_ABOVE: usize = 3800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLevel {
    Normal,
    Warning,
    Critical,
}

/// Character usage of the message being typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputBudget {
    pub used: usize,
    pub level: BudgetLevel,
}

impl InputBudget {
    pub fn measure(input: &str) -> Self {
        let used = input.chars().count();
        let level = if used > CRITICAL_ABOVE {
            BudgetLevel::Critical
        } else if used > WARNING_ABOVE {
            BudgetLevel::Warning
        } else {
            BudgetLevel::Normal
        };

        Self { used, level }
    }
}

impl fmt::Display for InputBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.used, MAX_INPUT_CHARS)
    }
}
