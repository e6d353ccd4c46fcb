//! Snapshot tests for user-facing text: error messages and the JSON config
//! format read by the daemon.

use std::io;

use insta::assert_snapshot;
use tsi_driver::prelude::*;

#[test]
fn test_snapshot_line_errors() {
    assert_snapshot!(
        LineError::unavailable("gpio26", io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied")).to_string(),
        @"line gpio26 unavailable: Permission denied"
    );
    assert_snapshot!(
        LineError::invalid_value("gpio27", "2").to_string(),
        @r#"line gpio27 returned unexpected value "2""#
    );
}

#[test]
fn test_snapshot_driver_errors() {
    assert_snapshot!(
        DriverError::from(PointerError::Unavailable(io::Error::other("no such device"))).to_string(),
        @"pointer device unavailable: no such device"
    );
    assert_snapshot!(
        DriverError::invalid_configuration("clock_pin and data_pin must differ").to_string(),
        @"invalid configuration: clock_pin and data_pin must differ"
    );
}

#[test]
fn test_snapshot_default_config_json() -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(&DriverConfig::default())?;
    assert_snapshot!(json, @r#"
    {
      "period_us": 5000,
      "propagation_us": 100,
      "timeout_us": 3000000,
      "invert": true,
      "clock_pin": 26,
      "data_pin": 27,
      "gpio_base": 0
    }
    "#);
    Ok(())
}
