//! Missing-value filling.
//!
//! Each column with missing cells gets the strategy named in the
//! [`FillPlan`](crate::types::FillPlan): median, mean, mode, a constant,
//! or leave-as-missing.

mod statistical;

pub use statistical::{FillRecord, MODE_FALLBACK, MissingValueFiller};
