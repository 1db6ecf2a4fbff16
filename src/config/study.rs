//! Longitudinal grouping and split configuration

use std::fmt;

use crate::error::{DatasetError, Result};

/// How the baseline acquisition of a subject is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselinePolicy {
    /// The subject's first acquisition in dataset order
    #[default]
    FirstAcquisition,
    /// The first acquisition whose ADNI-GO/2 visit code is a baseline code,
    /// falling back to the first acquisition
    BaselineVisitCode,
}

/// Acquisition-count window for longitudinal grouping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongitudinalConfig {
    /// Minimum number of acquisitions per subject (inclusive)
    pub min_acquisitions: usize,
    /// Maximum number of acquisitions per subject (inclusive)
    pub max_acquisitions: usize,
    /// Baseline selection
    pub baseline_policy: BaselinePolicy,
}

impl Default for LongitudinalConfig {
    fn default() -> Self {
        Self {
            min_acquisitions: 3,
            max_acquisitions: 5,
            baseline_policy: BaselinePolicy::FirstAcquisition,
        }
    }
}

impl LongitudinalConfig {
    /// Create a configuration for the window `[min, max]`
    #[must_use]
    pub const fn new(min_acquisitions: usize, max_acquisitions: usize) -> Self {
        Self {
            min_acquisitions,
            max_acquisitions,
            baseline_policy: BaselinePolicy::FirstAcquisition,
        }
    }

    /// Set the baseline policy
    #[must_use]
    pub const fn with_baseline_policy(mut self, policy: BaselinePolicy) -> Self {
        self.baseline_policy = policy;
        self
    }

    /// Check that the window is not empty
    pub fn validate(&self) -> Result<()> {
        if self.min_acquisitions > self.max_acquisitions {
            return Err(DatasetError::InvalidWindow {
                min: self.min_acquisitions,
                max: self.max_acquisitions,
            });
        }
        Ok(())
    }

    /// Whether a subject with `count` acquisitions is retained
    #[must_use]
    pub const fn accepts(&self, count: usize) -> bool {
        count >= self.min_acquisitions && count <= self.max_acquisitions
    }
}

impl fmt::Display for LongitudinalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Longitudinal Configuration:")?;
        writeln!(
            f,
            "  Acquisitions: [{}, {}]",
            self.min_acquisitions, self.max_acquisitions
        )?;
        writeln!(f, "  Baseline: {:?}", self.baseline_policy)
    }
}

/// Subject-aware shuffle split parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    /// Number of train/test partitions to draw
    pub n_iter: usize,
    /// Fraction of subjects assigned to the test side
    pub test_size: f64,
    /// Seed of the permutation generator; `None` draws from OS entropy
    pub random_seed: Option<u64>,
    /// Keep only the first acquisition of each test subject
    pub single_test_acquisition: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            n_iter: 100,
            test_size: 0.3,
            random_seed: Some(42),
            single_test_acquisition: false,
        }
    }
}

impl SplitConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder
    #[must_use]
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder::new()
    }

    /// Number of test subjects out of `n_subjects`, rounded up
    ///
    /// Fails when either side would be empty.
    pub fn test_count(&self, n_subjects: usize) -> Result<usize> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(DatasetError::InvalidSplit(format!(
                "test_size must lie in (0, 1), got {}",
                self.test_size
            )));
        }

        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let n_test = (self.test_size * n_subjects as f64).ceil() as usize;

        if n_test == 0 || n_test >= n_subjects {
            return Err(DatasetError::InvalidSplit(format!(
                "{n_subjects} subjects cannot be split with test_size {}",
                self.test_size
            )));
        }
        Ok(n_test)
    }
}

impl fmt::Display for SplitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Split Configuration:")?;
        writeln!(f, "  Iterations: {}", self.n_iter)?;
        writeln!(f, "  Test Size: {}", self.test_size)?;
        if let Some(seed) = self.random_seed {
            writeln!(f, "  Random Seed: {seed}")?;
        }
        writeln!(
            f,
            "  Single Test Acquisition: {}",
            self.single_test_acquisition
        )
    }
}

/// Builder for [`SplitConfig`]
#[derive(Debug, Clone, Default)]
pub struct SplitConfigBuilder {
    config: SplitConfig,
}

impl SplitConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SplitConfig::default(),
        }
    }

    /// Set the number of partitions
    #[must_use]
    pub const fn n_iter(mut self, n_iter: usize) -> Self {
        self.config.n_iter = n_iter;
        self
    }

    /// Set the test fraction
    #[must_use]
    pub const fn test_size(mut self, test_size: f64) -> Self {
        self.config.test_size = test_size;
        self
    }

    /// Set the random seed
    #[must_use]
    pub const fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = Some(seed);
        self
    }

    /// Draw permutations from OS entropy
    #[must_use]
    pub const fn unseeded(mut self) -> Self {
        self.config.random_seed = None;
        self
    }

    /// Keep only one acquisition per test subject
    #[must_use]
    pub const fn single_test_acquisition(mut self, single: bool) -> Self {
        self.config.single_test_acquisition = single;
        self
    }

    /// Build the configuration
    #[must_use]
    pub const fn build(self) -> SplitConfig {
        self.config
    }
}
