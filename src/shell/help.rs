// src/shell/help.rs

use core::time::Duration;

pub fn help_text(long_timeout: Duration) -> String {
    let secs = long_timeout.as_secs_f32();
    format!(
        r#"
>> Atlas Scientific EZO I2C shell
>> Commands are passed to the target device over I2C, except:
  - Help
      shows this text
  - List
      lists the EZO circuits found on the bus
      --> marks the target device that receives plain commands
  - xxx:[command]
      sends the command to the device at I2C address xxx
      and makes it the target for later commands
      Ex: "102:status" sends "status" to address 102
  - All:[command]
      sends the command to every device
  - Poll[,x.xx]
      polls every device continuously and uploads the readings
      the optional x.xx sets the polling time in seconds; it must be
      at least the {secs:.2} second read timeout, which is also the default
  - Calinfo
      shows the calibration commands
  - Exit
      quits the shell

>> Press ctrl-c to stop polling
"#
    )
}

pub const CALIBRATION_TEXT: &str = r#"
>> Calibration

Select the right circuit first. "List" shows every circuit with its address.

>> pH circuit:
    - cal,mid,n  : single point calibration at the midpoint (do this first)
    - cal,low,n  : two point calibration at the low point
    - cal,high,n : three point calibration at the high point
    - cal,?      : shows how many points are calibrated
    - cal,clear  : deletes the calibration
    Ex: "99:cal,mid,7.00"

>> ORP circuit:
    - cal,n      : single point calibration to n mV
    - cal,clear  : deletes the calibration
    Ex: "98:cal,225"
"#;
