use tsplify::command::bitmap::{Bitmap, DEFAULT_THRESHOLD};
use tsplify::command::{ClearBuffer, MeasurementSystem, Print, Size};
use tsplify::connection::{Connection, TcpConnection, DEFAULT_PORT};
use tsplify::Label;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let host = std::env::args().nth(1).unwrap_or_else(|| "192.168.1.50".to_string());

    let logo = image::open("rust.png")?.resize(256, 256, image::imageops::Lanczos3);

    let label = Label::new()
        .element(Size::new(50.0, 40.0, MeasurementSystem::Metric))
        .element(ClearBuffer)
        .element(Bitmap::from_image(40, 20, &logo, DEFAULT_THRESHOLD))
        .element(Print::new(1));

    let mut printer = TcpConnection::new(&host, DEFAULT_PORT);
    printer.init()?;
    printer.connect()?;
    while !printer.is_connected() {
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    printer.send_label(&label)?;
    printer.shutdown()?;
    Ok(())
}
