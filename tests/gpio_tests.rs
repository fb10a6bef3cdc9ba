//! GPIO bank tests: masking, caching and single-pin helpers.

mod common;

use common::{init_logger, Call, MockTransport};
use mpsse_session::{Error, GpioConfig, GpioDirection, GpioLevel, GpioPin, Mpsse, Status};

#[test]
fn test_write_masks_input_pins_exhaustive() {
    init_logger();
    let mut mock = MockTransport::ft232h_pair();
    let mut mpsse = Mpsse::open(&mut mock).unwrap();
    for direction in 0..=255u8 {
        for value in 0..=255u8 {
            mpsse.gpio().write(direction, value).unwrap();
            let expected = GpioConfig {
                direction,
                value: value & direction,
            };
            assert_eq!(mpsse.gpio().config(), expected);
            assert_eq!(
                mpsse.transport().last_call(),
                Some(&Call::GpioWrite {
                    direction,
                    value: value & direction
                })
            );
        }
    }
}

#[test]
fn test_failed_write_keeps_cache() {
    init_logger();
    let mut mock = MockTransport::ft232h_pair();
    let mut mpsse = Mpsse::open(&mut mock).unwrap();
    mpsse.gpio().write(0x0F, 0x0F).unwrap();

    mpsse.transport().fail("gpio_write", Status::IoError);
    let err = mpsse.gpio().write(0xF0, 0xF0).unwrap_err();
    assert!(matches!(
        err,
        Error::Transport {
            operation: "gpio_write",
            status: Status::IoError
        }
    ));
    let pin = GpioPin::new(7).unwrap();
    assert!(mpsse.gpio().set_pin(pin, GpioLevel::High).is_err());
    assert_eq!(mpsse.gpio().config(), GpioConfig::masked(0x0F, 0x0F));

    mpsse.transport().clear_failure("gpio_write");
    mpsse.gpio().set_pin(pin, GpioLevel::High).unwrap();
    assert_eq!(mpsse.gpio().config(), GpioConfig::masked(0x8F, 0x8F));
}

#[test]
fn test_set_pin_makes_output_and_keeps_others() {
    init_logger();
    let mut mock = MockTransport::ft232h_pair();
    {
        let mut mpsse = Mpsse::open(&mut mock).unwrap();
        let mut gpio = mpsse.gpio();
        gpio.write(0x00, 0x00).unwrap();

        let p3 = GpioPin::new(3).unwrap();
        let p5 = GpioPin::new(5).unwrap();
        gpio.set_pin(p3, GpioLevel::High).unwrap();
        gpio.set_pin(p5, GpioLevel::Low).unwrap();

        let config = gpio.config();
        assert_eq!(config.direction_of(p3), GpioDirection::Output);
        assert_eq!(config.direction_of(p5), GpioDirection::Output);
        assert_eq!(config.level_of(p3), GpioLevel::High);
        assert_eq!(config.level_of(p5), GpioLevel::Low);
        assert_eq!(config.direction_of(GpioPin::new(0).unwrap()), GpioDirection::Input);
    }
    let writes = mock.gpio_writes();
    assert_eq!(writes[writes.len() - 2..], [(0x08, 0x08), (0x28, 0x08)]);
}

#[test]
fn test_read_and_get_pin() {
    init_logger();
    let mut mock = MockTransport::ft232h_pair();
    mock.gpio_input.set(0xA5);
    let mut mpsse = Mpsse::open(&mut mock).unwrap();

    assert_eq!(mpsse.gpio().read().unwrap(), 0xA5);
    assert_eq!(mpsse.gpio().config().value, 0xA5);
    assert_eq!(mpsse.gpio().get_pin(GpioPin::new(0).unwrap()).unwrap(), GpioLevel::High);
    assert_eq!(mpsse.gpio().get_pin(GpioPin::new(1).unwrap()).unwrap(), GpioLevel::Low);

    mpsse.transport().fail("gpio_read", Status::IoError);
    assert!(matches!(
        mpsse.gpio().read(),
        Err(Error::Transport {
            operation: "gpio_read",
            ..
        })
    ));
    assert_eq!(mpsse.gpio().config().value, 0xA5);
}

#[test]
fn test_read_caches_output_levels_only() {
    init_logger();
    let mut mock = MockTransport::ft232h_pair();
    mock.gpio_input.set(0xF5);
    let mut mpsse = Mpsse::open(&mut mock).unwrap();
    mpsse.gpio().write(0x0F, 0x00).unwrap();

    // The caller still sees every line, input pins included.
    assert_eq!(mpsse.gpio().read().unwrap(), 0xF5);
    assert_eq!(mpsse.gpio().config(), GpioConfig::masked(0x0F, 0x05));
    assert_eq!(mpsse.gpio().config().value & !0x0F, 0);
    assert_eq!(mpsse.gpio().get_pin(GpioPin::new(7).unwrap()).unwrap(), GpioLevel::High);
}

#[test]
fn test_gpio_init_drives_cached_state() {
    init_logger();
    let mut mock = MockTransport::ft232h_pair();
    {
        let mut mpsse = Mpsse::open(&mut mock).unwrap();
        mpsse.gpio().write(0x3C, 0x24).unwrap();
        mpsse.gpio().init().unwrap();
        // Re-claiming GPIO mode is allowed.
        mpsse.gpio().init().unwrap();
    }
    let writes = mock.gpio_writes();
    assert_eq!(writes[1..], [(0x3C, 0x24), (0x3C, 0x24), (0x3C, 0x24)]);
}

#[test]
fn test_gpio_available_in_i2c_mode() {
    init_logger();
    let mut mock = MockTransport::ft232h_pair();
    let mut mpsse = Mpsse::open(&mut mock).unwrap();
    mpsse.i2c().init().unwrap();
    mpsse.gpio().write(0x01, 0x01).unwrap();
    assert_eq!(mpsse.gpio().read().unwrap(), 0x00);
}
