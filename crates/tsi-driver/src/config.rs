//! Driver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DriverError, DriverResult};

/// Timing, polarity and pin assignment for one TSI link.
///
/// Built once at startup and never changed while the driver runs. Every field
/// has a default, so a JSON config file only needs the values it overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Wait before each clock edge, in microseconds.
    ///
    /// Default: 5000µs.
    pub period_us: u64,

    /// Settling time after each clock edge before the data line is sampled,
    /// in microseconds.
    ///
    /// Default: 100µs.
    pub propagation_us: u64,

    /// Backoff after a rejected frame, in microseconds.
    ///
    /// Default: 3000000µs (3s).
    pub timeout_us: u64,

    /// Treat the data line as active-low.
    ///
    /// Default: true.
    pub invert: bool,

    /// GPIO number of the host-driven clock line.
    ///
    /// Default: 26.
    pub clock_pin: u32,

    /// GPIO number of the peripheral-driven data line.
    ///
    /// Default: 27.
    pub data_pin: u32,

    /// Offset added to both pin numbers to get the kernel's GPIO number.
    ///
    /// Default: 0.
    pub gpio_base: u32,
}

impl DriverConfig {
    /// Create a configuration with the given clock period.
    ///
    /// # Errors
    ///
    /// Returns an error if `period_us` is 0.
    pub fn new(period_us: u64) -> DriverResult<Self> {
        let config = Self {
            period_us,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> DriverConfigBuilder {
        DriverConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the period or timeout is 0, or if the clock and
    /// data lines share a pin.
    pub fn validate(&self) -> DriverResult<()> {
        if self.period_us == 0 {
            return Err(DriverError::invalid_configuration(
                "period_us must be greater than 0",
            ));
        }
        if self.timeout_us == 0 {
            return Err(DriverError::invalid_configuration(
                "timeout_us must be greater than 0",
            ));
        }
        if self.clock_pin == self.data_pin {
            return Err(DriverError::invalid_configuration(
                "clock_pin and data_pin must differ",
            ));
        }
        if self.gpio_line(self.clock_pin).is_none() || self.gpio_line(self.data_pin).is_none() {
            return Err(DriverError::invalid_configuration(
                "gpio_base plus pin number overflows",
            ));
        }
        Ok(())
    }

    /// Wait before each clock edge.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_micros(self.period_us)
    }

    /// Settling time after each clock edge.
    #[must_use]
    pub fn propagation(&self) -> Duration {
        Duration::from_micros(self.propagation_us)
    }

    /// Backoff after a rejected frame.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_micros(self.timeout_us)
    }

    /// Kernel GPIO number of the clock line.
    #[must_use]
    pub fn clock_line(&self) -> Option<u32> {
        self.gpio_line(self.clock_pin)
    }

    /// Kernel GPIO number of the data line.
    #[must_use]
    pub fn data_line(&self) -> Option<u32> {
        self.gpio_line(self.data_pin)
    }

    fn gpio_line(&self, pin: u32) -> Option<u32> {
        self.gpio_base.checked_add(pin)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            period_us: 5000,
            propagation_us: 100,
            timeout_us: 3_000_000,
            invert: true,
            clock_pin: 26,
            data_pin: 27,
            gpio_base: 0,
        }
    }
}

/// Builder for `DriverConfig`.
#[derive(Debug, Default)]
pub struct DriverConfigBuilder {
    config: DriverConfig,
}

impl DriverConfigBuilder {
    /// Set the clock period in microseconds.
    #[must_use]
    pub fn period_us(mut self, us: u64) -> Self {
        self.config.period_us = us;
        self
    }

    /// Set the propagation delay in microseconds.
    #[must_use]
    pub fn propagation_us(mut self, us: u64) -> Self {
        self.config.propagation_us = us;
        self
    }

    /// Set the error backoff in microseconds.
    #[must_use]
    pub fn timeout_us(mut self, us: u64) -> Self {
        self.config.timeout_us = us;
        self
    }

    /// Set data line polarity inversion.
    #[must_use]
    pub fn invert(mut self, invert: bool) -> Self {
        self.config.invert = invert;
        self
    }

    /// Set the clock pin.
    #[must_use]
    pub fn clock_pin(mut self, pin: u32) -> Self {
        self.config.clock_pin = pin;
        self
    }

    /// Set the data pin.
    #[must_use]
    pub fn data_pin(mut self, pin: u32) -> Self {
        self.config.data_pin = pin;
        self
    }

    /// Set the GPIO numbering offset.
    #[must_use]
    pub fn gpio_base(mut self, base: u32) -> Self {
        self.config.gpio_base = base;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> DriverResult<DriverConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
