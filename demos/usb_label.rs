use std::time::Duration;

use tsplify::command::{
    ClearBuffer, CutterMode, DeviceSetting, Direction, MeasurementSystem, Print, Size, Text,
};
use tsplify::connection::{Connection, UsbConnection};
use tsplify::Label;

fn main() -> Result<(), tsplify::Error> {
    env_logger::init();
    let vid: u16 = 0x1203;

    // any product of the vendor will do
    let mut printer = UsbConnection::new(vid, None);
    printer.init()?;
    let info = printer.info()?;
    println!(
        "{:04x}:{:04x} {} {}",
        info.vendor_id, info.product_id, info.manufacturer, info.product
    );

    printer.connect()?;
    let label = Label::new()
        .element(Size::new(60.0, 40.0, MeasurementSystem::Metric))
        .element(Direction::new(1))
        .element(DeviceSetting::Cutter(CutterMode::Batch))
        .element(ClearBuffer)
        .element(Text::new(20, 20, "4", &info.product))
        .element(Print::new(2));
    printer.send_label(&label)?;

    std::thread::sleep(Duration::from_millis(500));
    printer.shutdown()
}
