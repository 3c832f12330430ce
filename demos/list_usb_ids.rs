use std::time::Duration;

/// The following should output a list of usb ids and a description
/// of the device to help you find the ids to pass to `UsbConnection::new`
///
/// Alternatively you can use lsusb
fn main() -> Result<(), rusb::Error> {
    let timeout = Duration::from_millis(200);
    for device in rusb::devices()?.iter() {
        let device_desc = match device.device_descriptor() {
            Ok(d) => d,
            Err(_) => continue,
        };
        let ids = format!(
            "Bus {:03} Device {:03} ID {:04x}:{:04x}",
            device.bus_number(),
            device.address(),
            device_desc.vendor_id(),
            device_desc.product_id(),
        );
        let strings = device.open().and_then(|handle| {
            let language = match handle.read_languages(timeout)?.first() {
                Some(l) => *l,
                None => return Err(rusb::Error::NotFound),
            };
            let manufacturer = handle.read_manufacturer_string(language, &device_desc, timeout)?;
            let product = handle
                .read_product_string(language, &device_desc, timeout)
                .unwrap_or_default();
            Ok((manufacturer, product))
        });
        match strings {
            Ok((manufacturer, product)) => println!("{} - {} {}", ids, manufacturer, product),
            Err(_) => println!("{}", ids),
        }
    }
    Ok(())
}
