//! Reset line sequencing
//!
//! The Si4702/03 samples its bus mode when RST rises. The reset line is held
//! low, released, and the chip is given time to settle before the first
//! register access.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::config::{RESET_HOLD, RESET_SETTLE};

/// Pulse the reset line low, then high
pub async fn hardware_reset<P, D>(pin: &mut P, delay: &mut D) -> Result<(), P::Error>
where
    P: OutputPin,
    D: DelayNs,
{
    let hold_ms = u32::try_from(RESET_HOLD.as_millis()).unwrap_or(u32::MAX);
    let settle_ms = u32::try_from(RESET_SETTLE.as_millis()).unwrap_or(u32::MAX);
    debug!("resetting tuner");
    pin.set_low()?;
    delay.delay_ms(hold_ms).await;
    pin.set_high()?;
    delay.delay_ms(settle_ms).await;
    Ok(())
}
