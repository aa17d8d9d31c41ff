//! [`ServoDriver`] implementation for the PCA9685 driver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use pwm_pca9685::{Address, Channel, Pca9685};
use embedded_hal::blocking::i2c::{Write, WriteRead};
use log::info;

use super::{ServoDriver, ServoError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const MAX_PWM: u16 = 4096;

/// Frequency of the PCA9685's internal oscillator.
///
/// Units: hertz
const OSC_CLOCK_HZ: f64 = 25_000_000.0;

/// Prescale limits accepted by the chip.
const MIN_PRESCALE: f64 = 3.0;
const MAX_PRESCALE: f64 = 255.0;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Open and enable a PCA9685 board at the given I2C address, running at `pwm_freq_hz`.
pub fn open_board<I2C, E>(
    i2c: I2C,
    address: u8,
    pwm_freq_hz: f64
) -> Result<Pca9685<I2C>, ServoError>
where
    I2C: Write<Error = E> + WriteRead<Error = E>
{
    let mut board = Pca9685::new(i2c, Address::from(address))
        .map_err(map_err)?;

    board.set_prescale(prescale(pwm_freq_hz)?).map_err(map_err)?;
    board.enable().map_err(map_err)?;

    info!("PCA9685 at {:#04x} enabled at {} Hz", address, pwm_freq_hz);

    Ok(board)
}

/// Compute the prescale register value for a PWM frequency.
pub fn prescale(pwm_freq_hz: f64) -> Result<u8, ServoError> {
    let p = (OSC_CLOCK_HZ / (MAX_PWM as f64 * pwm_freq_hz)).round() - 1.0;

    if !(MIN_PRESCALE..=MAX_PRESCALE).contains(&p) {
        return Err(ServoError::InvalidConfig(format!(
            "PWM frequency of {} Hz is outside the PCA9685's range", pwm_freq_hz
        )));
    }

    Ok(p as u8)
}

/// Get the board channel with the given index.
pub fn channel_from_index(index: u8) -> Option<Channel> {
    Some(match index {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return None,
    })
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<I2C, E> ServoDriver for Pca9685<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>
{
    type Channel = Channel;

    fn set_duty_cycle(
        &mut self,
        channel: Self::Channel,
        duty_cycle: f64
    ) -> Result<(), ServoError> {

        // If the duty cycle is out of range return an error
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(ServoError::InvalidDutyCycle)
        }

        // The off count register is 12 bits wide
        let off = ((duty_cycle * MAX_PWM as f64).round() as u16).min(MAX_PWM - 1);

        self.set_channel_on_off(channel, 0, off).map_err(map_err)
    }

    fn set_off(&mut self, channel: Self::Channel) -> Result<(), ServoError> {
        self.set_channel_full_off(channel).map_err(map_err)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn map_err<E>(e: pwm_pca9685::Error<E>) -> ServoError {
    match e {
        pwm_pca9685::Error::I2C(_) => ServoError::I2c,
        pwm_pca9685::Error::InvalidInputData => ServoError::InvalidDutyCycle,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prescale() {
        // Datasheet value for 50 Hz servo PWM
        assert_eq!(prescale(50.0).unwrap(), 121);
        assert!(prescale(1.0).is_err());
        assert!(prescale(5000.0).is_err());
    }

    #[test]
    fn test_channel_from_index() {
        assert!(matches!(channel_from_index(0), Some(Channel::C0)));
        assert!(matches!(channel_from_index(15), Some(Channel::C15)));
        assert!(channel_from_index(16).is_none());
    }
}
