use std::sync::mpsc;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tsplify::command::{
    Barcode, BarcodeType, ClearBuffer, Density, ErrorCorrectionLevel, Gap, MeasurementSystem,
    Print, QrCode, Rectangle, Size, Speed, Text,
};
use tsplify::connection::{ClientListener, Connection, DataListener, TcpConnection, DEFAULT_PORT};
use tsplify::{ConnectionFault, Label};

/// Prints what the connection reports and wakes `main` once it is open.
struct Console {
    ready: Mutex<mpsc::Sender<bool>>,
}

impl ClientListener for Console {
    fn connection_established(&self, endpoint: &str) {
        println!("connected to {}", endpoint);
        let _ = self.ready.lock().map(|tx| tx.send(true));
    }

    fn connection_lost(&self, endpoint: &str) {
        println!("lost {}", endpoint);
    }

    fn connection_failing(&self, endpoint: &str, fault: &ConnectionFault) {
        println!("{} failing: {}", endpoint, fault);
        let _ = self.ready.lock().map(|tx| tx.send(false));
    }
}

impl DataListener for Console {
    fn message_sent(&self, message: &[u8]) {
        print!("{}", String::from_utf8_lossy(message));
    }

    fn message_received(&self, message: &str) {
        println!("printer: {}", message.trim_end());
    }

    fn message_send_failed(&self, fault: &ConnectionFault, payload: &[u8]) {
        println!("{} bytes not sent: {}", payload.len(), fault);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let host = std::env::args().nth(1).unwrap_or_else(|| "192.168.1.50".to_string());

    let label = Label::new()
        .element(Size::new(4.0, 3.0, MeasurementSystem::English))
        .element(Gap::new(0.12, 0.0, MeasurementSystem::English))
        .element(Speed::new(4.0))
        .element(Density::new(8))
        .element(ClearBuffer)
        .element(Rectangle::new(10, 10, 790, 590, 3).rounded(20))
        .element(Text::new(40, 40, "3", "Order 10042").scaled(2.0, 2.0))
        .element(Barcode::new(40, 140, BarcodeType::Code128, 100, 2, 2, "10042"))
        .element(QrCode::new(560, 140, ErrorCorrectionLevel::M, 6, "https://example.com/o/10042"))
        .element(Print::new(1));

    let (tx, rx) = mpsc::channel();
    let console = Arc::new(Console { ready: Mutex::new(tx) });

    let mut printer = TcpConnection::new(&host, DEFAULT_PORT);
    printer.add_client_listener(console.clone());
    printer.add_data_listener(console);
    printer.init()?;
    printer.connect()?;

    if rx.recv_timeout(Duration::from_secs(10))? {
        printer.send_label(&label)?;
    }
    printer.shutdown()?;
    Ok(())
}
