use core::fmt;

use crate::{DecodedId, LayoutConfig};

/// A minimal interface for generating IDs from a [`LayoutConfig`].
///
/// Both algorithms implement it; [`AnyGenerator`] picks one at construction
/// time from [`LayoutConfig::method`].
///
/// [`AnyGenerator`]: crate::AnyGenerator
pub trait IdGenerator {
    /// The error type returned by [`IdGenerator::try_next_id`].
    type Err: fmt::Debug;

    /// The layout IDs are minted with.
    fn config(&self) -> &LayoutConfig;

    /// Generates the next available ID with fallible error handling.
    ///
    /// # Errors
    ///
    /// Implementation defined. The strict generator fails when the clock
    /// moves backwards.
    fn try_next_id(&self) -> Result<i64, Self::Err>;

    /// Generates the next available ID.
    ///
    /// This is the infallible counterpart to [`IdGenerator::try_next_id`],
    /// available for generators that can never fail.
    fn next_id(&self) -> i64
    where
        Self::Err: Into<core::convert::Infallible>,
    {
        match self.try_next_id() {
            Ok(id) => id,
            Err(e) => {
                #[allow(unreachable_code)]
                // `into()` satisfies the trait bound at compile time.
                match e.into() {}
            }
        }
    }

    /// Splits an ID minted by this generator into its fields.
    fn decode(&self, id: i64) -> DecodedId {
        self.config().codec().decode(id)
    }
}
