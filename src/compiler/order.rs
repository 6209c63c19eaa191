use serde::{Deserialize, Serialize};

/// Precedence of a generated fragment. Stronger binds tighter:
/// `Atomic < Sequence < None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Order {
    /// One self-delimited datum, never wrapped.
    Atomic,
    /// Several forms in a row.
    Sequence,
    /// Weakest order, returned by statement rules.
    None,
}

/// Code generated for one block, with the order it binds at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub code: String,
    pub order: Order,
}

impl Fragment {
    pub fn new(code: impl Into<String>, order: Order) -> Self {
        Fragment {
            code: code.into(),
            order,
        }
    }

    pub fn atomic(code: impl Into<String>) -> Self {
        Self::new(code, Order::Atomic)
    }

    pub fn statement(code: impl Into<String>) -> Self {
        Self::new(code, Order::None)
    }

    /// Whether embedding this fragment where `required` is expected needs
    /// a `(begin …)` wrapper.
    pub fn needs_wrap(&self, required: Order) -> bool {
        self.order > required
    }
}
