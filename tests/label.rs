use tsplify::command::{
    Barcode, BarcodeType, ClearBuffer, Density, Direction, ErrorCorrectionLevel, Gap,
    MeasurementSystem, Print, QrCode, Rectangle, Size, Speed, Text,
};
use tsplify::{fill_template, Error, Label};

fn shipping_label() -> Label {
    Label::new()
        .element(Size::new(4.0, 2.5, MeasurementSystem::English))
        .element(Gap::new(0.12, 0.0, MeasurementSystem::English))
        .element(Speed::new(4.0))
        .element(Density::new(8))
        .element(Direction::new(1))
        .element(ClearBuffer)
        .element(Rectangle::new(10, 10, 790, 490, 2))
        .element(Text::new(30, 30, "3", "ACME Corp"))
        .element(Barcode::new(30, 100, BarcodeType::Code128, 100, 1, 1, "123456"))
        .element(QrCode::new(600, 100, ErrorCorrectionLevel::H, 4, "ABCabc123"))
        .element(Print::new(1))
}

#[test]
fn shipping_label_wire_format() {
    let expected = concat!(
        "SIZE 4,2.5\n",
        "GAP 0.12,0\n",
        "SPEED 4\n",
        "DENSITY 8\n",
        "DIRECTION 1\n",
        "CLS\n",
        "BOX 10,10,790,490,2,0\n",
        "TEXT 30,30,\"3\",0,1,1,\"ACME Corp\"\n",
        "BARCODE 30,100,\"128\",100,0,0,1,1,\"123456\"\n",
        "QRCODE 600,100,H,4,A,0,\"ABCabc123\"\n",
        "PRINT 1\n",
    );
    let label = shipping_label();
    assert_eq!(label.to_text().unwrap(), expected);
    assert_eq!(label.serialize().unwrap(), label.serialize().unwrap());
    assert_eq!(label.fragments().unwrap().concat(), expected.as_bytes());
}

#[test]
fn empty_label() {
    assert_eq!(Label::new().serialize().unwrap(), Vec::<u8>::new());
}

#[test]
fn box_radius_defaults_to_zero() {
    let label = Label::new().element(Rectangle::new(10, 10, 100, 60, 2));
    assert_eq!(label.to_text().unwrap(), "BOX 10,10,100,60,2,0\n");
}

#[test]
fn missing_density_aborts_the_job() {
    let label = Label::new()
        .element(ClearBuffer)
        .element(Density::default())
        .element(Print::new(1));
    let err: Error = label.serialize().unwrap_err().into();
    assert!(err.to_string().contains("DENSITY"));
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn template_fills_stored_program() {
    let program = "SIZE 4,3\nCLS\nTEXT 10,10,\"3\",0,1,1,\"<<<sku>>>\"\nPRINT <<<copies>>>\n";
    let filled = fill_template(program, [("sku", "WID-001"), ("copies", "3")]);
    assert_eq!(
        filled,
        "SIZE 4,3\nCLS\nTEXT 10,10,\"3\",0,1,1,\"WID-001\"\nPRINT 3\n"
    );
}
