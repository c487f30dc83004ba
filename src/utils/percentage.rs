use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    pub const fn zero() -> Percentage {
        Percentage(0.)
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `value` in `whole`, both in milliseconds. An empty whole yields zero.
pub fn duration_percentage(value_ms: i64, whole_ms: i64) -> Percentage {
    if whole_ms <= 0 {
        return Percentage::zero();
    }
    Percentage::new_opt(value_ms as f64 / whole_ms as f64 * 100.).unwrap_or(Percentage::zero())
}
