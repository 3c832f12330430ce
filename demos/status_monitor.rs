use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tsplify::command::StatusPoll;
use tsplify::connection::{Connection, DataListener, UsbConnection};
use tsplify::ConnectionFault;

const HEAD_OPEN_BIT: u8 = 0;
const PAPER_JAM_BIT: u8 = 1;
const PAPER_OUT_BIT: u8 = 2;
const RIBBON_OUT_BIT: u8 = 3;
const PAUSED_BIT: u8 = 4;
const PRINTING_BIT: u8 = 5;

struct StatusPrinter;

impl DataListener for StatusPrinter {
    fn message_sent(&self, _message: &[u8]) {}

    fn message_received(&self, message: &str) {
        let status = match message.chars().next() {
            Some(c) if (c as u32) < 0x80 => c as u8,
            _ => return,
        };
        println!("Status: {:0>8b}", status);
        if status == 0 {
            println!("Ready");
        }
        for (bit, what) in [
            (HEAD_OPEN_BIT, "Head opened"),
            (PAPER_JAM_BIT, "Paper jam"),
            (PAPER_OUT_BIT, "Out of paper"),
            (RIBBON_OUT_BIT, "Out of ribbon"),
            (PAUSED_BIT, "Paused"),
            (PRINTING_BIT, "Printing"),
        ] {
            if (status >> bit) & 1 == 1 {
                println!("{}", what);
            }
        }
        println!("=============");
    }

    fn message_send_failed(&self, fault: &ConnectionFault, _payload: &[u8]) {
        println!("Status poll failed: {}", fault);
    }
}

fn main() -> Result<(), tsplify::Error> {
    env_logger::init();
    let vid: u16 = 0x1203;
    let pid: u16 = 0x0230;

    let mut printer = UsbConnection::new(vid, Some(pid));
    printer.add_data_listener(Arc::new(StatusPrinter));
    printer.init()?;
    printer.connect()?;

    // Constantly poll looking for errors
    while printer.is_connected() {
        printer.send_label(&tsplify::Label::new().element(StatusPoll::Status))?;
        thread::sleep(Duration::from_secs(1));
    }
    printer.shutdown()
}
