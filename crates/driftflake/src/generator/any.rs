use crate::{
    DriftingGenerator, Error, GeneratorMethod, LayoutConfig, LayoutOptions, Result,
    StrictGenerator, WallClock,
    generator::IdGenerator,
    time::ClockSource,
};

/// A generator whose algorithm is chosen by [`LayoutConfig::method`].
///
/// Use this when the algorithm is a deployment decision rather than a
/// compile-time one.
///
/// # Example
/// ```
/// use driftflake::{AnyGenerator, GeneratorMethod, IdGenerator, LayoutOptions};
///
/// let generator = AnyGenerator::from_options(LayoutOptions {
///     worker_id: 2,
///     method: GeneratorMethod::Strict,
///     ..LayoutOptions::default()
/// })
/// .unwrap();
///
/// let id = generator.try_next_id().unwrap();
/// assert_eq!(generator.decode(id).worker_id, 2);
/// ```
pub enum AnyGenerator<C>
where
    C: ClockSource,
{
    Drifting(DriftingGenerator<C>),
    Strict(StrictGenerator<C>),
}

impl<C> AnyGenerator<C>
where
    C: ClockSource,
{
    /// Builds the generator selected by `config.method()`.
    pub fn new(config: LayoutConfig, clock: C) -> Self {
        match config.method() {
            GeneratorMethod::Drifting => Self::Drifting(DriftingGenerator::new(config, clock)),
            GeneratorMethod::Strict => Self::Strict(StrictGenerator::new(config, clock)),
        }
    }

    pub const fn method(&self) -> GeneratorMethod {
        match self {
            Self::Drifting(_) => GeneratorMethod::Drifting,
            Self::Strict(_) => GeneratorMethod::Strict,
        }
    }

    /// Generates the next ID with the selected algorithm.
    ///
    /// # Errors
    ///
    /// Only the strict algorithm fails, with
    /// [`Error::ClockMovedBackwards`].
    pub fn try_next_id(&self) -> Result<i64> {
        match self {
            Self::Drifting(generator) => Ok(generator.next_id()),
            Self::Strict(generator) => Ok(generator.try_next_id()?),
        }
    }
}

impl AnyGenerator<WallClock> {
    /// Validates `options` and builds the selected generator on a
    /// [`WallClock`] anchored at the configured base epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `options` are invalid.
    pub fn from_options(options: LayoutOptions) -> Result<Self> {
        let config = LayoutConfig::try_new(options)?;
        Ok(Self::new(config, WallClock::from_config(&config)))
    }
}

impl<C> IdGenerator for AnyGenerator<C>
where
    C: ClockSource,
{
    type Err = Error;

    fn config(&self) -> &LayoutConfig {
        match self {
            Self::Drifting(generator) => generator.config(),
            Self::Strict(generator) => generator.config(),
        }
    }

    fn try_next_id(&self) -> Result<i64, Self::Err> {
        self.try_next_id()
    }
}
