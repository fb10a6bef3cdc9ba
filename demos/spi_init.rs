use mpsse_session::{ffi::LibMpsse, pins::Line, Mpsse, OpenFilter, Result};

// Adapters of the two common FT232H breakouts, by USB description.
const DESCRIPTIONS: [&str; 2] = ["FT232H", "FT232H-C"];

fn main() -> Result<()> {
    env_logger::init();

    let mut transport = LibMpsse::new();
    for device in mpsse_session::device::enumerate(&mut transport)? {
        println!("  {}", device);
    }

    for desc in DESCRIPTIONS {
        let filter = OpenFilter::new().description(desc);
        let mut mpsse = match Mpsse::open_with_filter(LibMpsse::new(), &filter) {
            Ok(mpsse) => mpsse,
            Err(e) => {
                eprintln!("Skipping {}: {}", desc, e);
                continue;
            }
        };
        println!("Opened {}", mpsse.device());

        let mut spi = mpsse.spi();
        spi.config_mut().set_clock_and_latency(30_000_000, 2)?;
        spi.config_mut().set_mode(Line::D3, true, 0)?;
        spi.init()?;
        println!(
            "SPI ready on {}: {} Hz, mode {}, CS {}",
            desc,
            spi.config().clock_rate_hz(),
            spi.config().mode().number(),
            spi.config().chip_select()
        );

        mpsse.close()?;
    }
    Ok(())
}
