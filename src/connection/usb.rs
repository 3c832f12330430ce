//! USB bulk transport.
//!
//! The printer is looked up by walking the USB topology depth first from
//! every root hub. Interface 0 is claimed and its bulk OUT endpoint carries
//! commands while the bulk IN endpoint is polled for replies.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rusb::{Device, DeviceDescriptor, DeviceHandle, Direction, GlobalContext, TransferType};

use super::{Charset, Connection, ConnectionState, Listeners};
use crate::error::{ConnectionFault, Error};

/// Timeout for sending/receiving USB messages
pub const TIMEOUT: u64 = 400;

const INTERFACE: u8 = 0;
const READ_BUFFER: usize = 512;

/// Identity of the claimed printer as read from its descriptors.
#[derive(Clone, Debug)]
pub struct UsbInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Empty when the device has no manufacturer string
    pub manufacturer: String,
    /// Empty when the device has no product string
    pub product: String,
}

/// A device together with where it sits on its bus.
struct Located<D> {
    bus: u8,
    ports: Vec<u8>,
    vendor_id: u16,
    product_id: u16,
    device: D,
}

/// One node of the USB topology
#[derive(Debug)]
struct DeviceNode<D> {
    vendor_id: u16,
    product_id: u16,
    device: D,
    children: Vec<DeviceNode<D>>,
}

/// A device hangs off the hub on the same bus whose port path is its own
/// minus the last hop.
fn is_child_of<D>(child: &Located<D>, parent: &Located<D>) -> bool {
    child.bus == parent.bus
        && child.ports.len() == parent.ports.len() + 1
        && child.ports.starts_with(&parent.ports)
}

fn build_tree<D>(located: Vec<Located<D>>) -> Vec<DeviceNode<D>> {
    let parents: Vec<Option<usize>> = located
        .iter()
        .map(|child| located.iter().position(|parent| is_child_of(child, parent)))
        .collect();
    let depths: Vec<usize> = located.iter().map(|l| l.ports.len()).collect();
    let mut slots: Vec<Option<DeviceNode<D>>> = located
        .into_iter()
        .map(|l| {
            Some(DeviceNode {
                vendor_id: l.vendor_id,
                product_id: l.product_id,
                device: l.device,
                children: Vec::new(),
            })
        })
        .collect();

    // deepest first, so every node is complete before it is attached
    let mut order: Vec<usize> = (0..slots.len()).collect();
    order.sort_by_key(|&i| Reverse(depths[i]));
    for index in order {
        if let Some(parent) = parents[index] {
            if let Some(node) = slots[index].take() {
                if let Some(parent) = slots[parent].as_mut() {
                    parent.children.push(node);
                }
            }
        }
    }
    slots.into_iter().flatten().collect()
}

/// Depth first search. Without a product id any device of the vendor
/// matches.
fn find_device<D>(
    nodes: &[DeviceNode<D>],
    vendor_id: u16,
    product_id: Option<u16>,
) -> Option<&DeviceNode<D>> {
    for node in nodes {
        if node.vendor_id == vendor_id && product_id.map_or(true, |pid| pid == node.product_id) {
            return Some(node);
        }
        if let Some(found) = find_device(&node.children, vendor_id, product_id) {
            return Some(found);
        }
    }
    None
}

/// Picks the first bulk OUT and the first bulk IN endpoint, returned as
/// `(out, in)`.
fn select_bulk_endpoints<I>(endpoints: I) -> Option<(u8, u8)>
where
    I: IntoIterator<Item = (TransferType, Direction, u8)>,
{
    let (mut out_ep, mut in_ep) = (None, None);
    for (transfer_type, direction, address) in endpoints {
        match (transfer_type, direction) {
            (TransferType::Bulk, Direction::Out) if out_ep.is_none() => out_ep = Some(address),
            (TransferType::Bulk, Direction::In) if in_ep.is_none() => in_ep = Some(address),
            (_, _) => continue,
        }
    }
    match (out_ep, in_ep) {
        (Some(out_ep), Some(in_ep)) => Some((out_ep, in_ep)),
        _ => None,
    }
}

fn locate(vendor_id: u16, product_id: Option<u16>) -> Result<Device<GlobalContext>, Error> {
    let located: Vec<_> = rusb::devices()?
        .iter()
        .filter_map(|d| {
            let desc = d.device_descriptor().ok()?;
            Some(Located {
                bus: d.bus_number(),
                ports: d.port_numbers().unwrap_or_default(),
                vendor_id: desc.vendor_id(),
                product_id: desc.product_id(),
                device: d,
            })
        })
        .collect();
    let tree = build_tree(located);
    find_device(&tree, vendor_id, product_id)
        .map(|node| node.device.clone())
        .ok_or(Error::NotFound)
}

/// The claimed interface and what was learned while claiming it.
struct Claimed {
    handle: Arc<DeviceHandle<GlobalContext>>,
    descriptor: DeviceDescriptor,
    out_ep: u8,
    in_ep: u8,
}

struct Session {
    alive: AtomicBool,
    connected: AtomicBool,
}

impl Session {
    fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.alive.store(false, Ordering::SeqCst);
    }
}

/// Printer attached over USB.
///
/// Replies are delivered to data listeners chunk by chunk as the IN endpoint
/// returns them.
pub struct UsbConnection {
    vendor_id: u16,
    product_id: Option<u16>,
    charset: Charset,
    timeout: Duration,
    listeners: Arc<Listeners>,
    claimed: Option<Claimed>,
    session: Option<Arc<Session>>,
    reader: Option<JoinHandle<()>>,
}

impl UsbConnection {
    /// Without `product_id` the first device of the vendor found in the
    /// topology is used.
    pub fn new(vendor_id: u16, product_id: Option<u16>) -> Self {
        let endpoint = match product_id {
            Some(pid) => format!("usb://{:04x}:{:04x}", vendor_id, pid),
            None => format!("usb://{:04x}:*", vendor_id),
        };
        UsbConnection {
            vendor_id,
            product_id,
            charset: Charset::default(),
            timeout: Duration::from_millis(TIMEOUT),
            listeners: Arc::new(Listeners::new(endpoint)),
            claimed: None,
            session: None,
            reader: None,
        }
    }

    /// Applies to bulk writes and to each poll of the IN endpoint.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn info(&self) -> Result<UsbInfo, Error> {
        let claimed = self.claimed.as_ref().ok_or(Error::NotInitialized)?;
        let languages = claimed.handle.read_languages(self.timeout)?;
        let language = *languages.first().ok_or(Error::NoLanguages)?;

        let manufacturer = claimed
            .handle
            .read_manufacturer_string(language, &claimed.descriptor, self.timeout)
            .unwrap_or_default();
        let product = claimed
            .handle
            .read_product_string(language, &claimed.descriptor, self.timeout)
            .unwrap_or_default();
        Ok(UsbInfo {
            vendor_id: claimed.descriptor.vendor_id(),
            product_id: claimed.descriptor.product_id(),
            manufacturer,
            product,
        })
    }

    fn claim(&self) -> Result<Claimed, Error> {
        let device = locate(self.vendor_id, self.product_id)?;
        let descriptor = device.device_descriptor()?;
        let mut handle = device.open()?;

        let _ = handle.set_auto_detach_kernel_driver(true);
        match handle.kernel_driver_active(INTERFACE) {
            Ok(true) => handle.detach_kernel_driver(INTERFACE)?,
            _ => log::trace!("Kernel driver inactive"),
        }
        handle.claim_interface(INTERFACE)?;

        let config = device
            .active_config_descriptor()
            .or_else(|_| device.config_descriptor(0))?;
        let interface = config
            .interfaces()
            .find(|i| i.number() == INTERFACE)
            .ok_or(Error::InvalidEndpoints)?;
        let endpoints: Vec<_> = interface
            .descriptors()
            .flat_map(|d| {
                d.endpoint_descriptors()
                    .map(|e| (e.transfer_type(), e.direction(), e.address()))
                    .collect::<Vec<_>>()
            })
            .collect();
        let (out_ep, in_ep) = select_bulk_endpoints(endpoints).ok_or(Error::InvalidEndpoints)?;

        log::info!(
            "Claimed {:04x}:{:04x}, bulk out {:#04x}, bulk in {:#04x}",
            descriptor.vendor_id(),
            descriptor.product_id(),
            out_ep,
            in_ep
        );
        Ok(Claimed {
            handle: Arc::new(handle),
            descriptor,
            out_ep,
            in_ep,
        })
    }

    fn join_reader(&mut self) {
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                log::error!("USB reader thread panicked");
            }
        }
    }
}

impl Connection for UsbConnection {
    fn init(&mut self) -> Result<(), Error> {
        if self.claimed.is_none() {
            self.claimed = Some(self.claim()?);
        }
        Ok(())
    }

    /// May wait up to one timeout for the reader of a previous session to
    /// let go of the IN endpoint.
    fn connect(&mut self) -> Result<(), Error> {
        if let Some(session) = &self.session {
            if session.alive.load(Ordering::SeqCst) {
                return Ok(());
            }
        }
        let claimed = self.claimed.as_ref().ok_or(Error::NotInitialized)?;
        let session = Arc::new(Session {
            alive: AtomicBool::new(true),
            connected: AtomicBool::new(true),
        });
        let reader = Reader {
            handle: Arc::clone(&claimed.handle),
            endpoint: claimed.in_ep,
            session: Arc::clone(&session),
            listeners: Arc::clone(&self.listeners),
            charset: self.charset,
            poll_interval: self.timeout,
        };
        self.join_reader();
        let handle = thread::Builder::new()
            .name(format!("tspl-usb-{:04x}", self.vendor_id))
            .spawn(move || reader.run())?;
        self.session = Some(session);
        self.reader = Some(handle);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(session) = &self.session {
            if session.alive.swap(false, Ordering::SeqCst) {
                log::info!("Disconnecting from {}", self.listeners.endpoint());
            }
            session.connected.store(false, Ordering::SeqCst);
        }
    }

    fn shutdown(&mut self) -> Result<(), Error> {
        self.disconnect();
        self.join_reader();
        self.session = None;
        if let Some(mut claimed) = self.claimed.take() {
            match Arc::get_mut(&mut claimed.handle) {
                Some(handle) => handle.release_interface(INTERFACE)?,
                // the handle releases the interface when the last user drops it
                None => log::warn!("USB handle still shared, deferring interface release"),
            }
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session
            .as_ref()
            .map_or(false, |s| s.connected.load(Ordering::SeqCst))
    }

    fn state(&self) -> ConnectionState {
        if self.claimed.is_none() {
            return ConnectionState::Uninitialized;
        }
        match &self.session {
            None => ConnectionState::Initialized,
            Some(s) if s.connected.load(Ordering::SeqCst) => ConnectionState::Connected,
            Some(_) => ConnectionState::Disconnected,
        }
    }

    fn send(&mut self, message: &[u8]) -> Result<(), Error> {
        let session = match &self.session {
            Some(s) if s.connected.load(Ordering::SeqCst) => Arc::clone(s),
            _ => return Err(Error::NotConnected),
        };
        let claimed = self.claimed.as_ref().ok_or(Error::NotConnected)?;
        match write_all(&claimed.handle, claimed.out_ep, message, self.timeout) {
            Ok(()) => {
                log::trace!("Sent {} bytes", message.len());
                self.listeners.message_sent(message);
            }
            Err(e) => {
                log::error!("Failed to write to {}: {}", self.listeners.endpoint(), e);
                if e != rusb::Error::Timeout {
                    session.close();
                }
                self.listeners
                    .message_send_failed(ConnectionFault::new("failed to send message", e), message);
            }
        }
        Ok(())
    }

    fn listeners(&self) -> &Arc<Listeners> {
        &self.listeners
    }

    fn charset(&self) -> Charset {
        self.charset
    }

    fn set_charset(&mut self, charset: Charset) {
        self.charset = charset;
    }
}

impl Drop for UsbConnection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn write_all(
    handle: &DeviceHandle<GlobalContext>,
    endpoint: u8,
    mut buf: &[u8],
    timeout: Duration,
) -> Result<(), rusb::Error> {
    while !buf.is_empty() {
        match handle.write_bulk(endpoint, buf, timeout)? {
            0 => return Err(rusb::Error::Timeout),
            n => buf = &buf[n..],
        }
    }
    Ok(())
}

/// Body of the thread polling the IN endpoint.
struct Reader {
    handle: Arc<DeviceHandle<GlobalContext>>,
    endpoint: u8,
    session: Arc<Session>,
    listeners: Arc<Listeners>,
    charset: Charset,
    poll_interval: Duration,
}

impl Reader {
    fn run(self) {
        log::info!("Connected to {}", self.listeners.endpoint());
        self.listeners.connection_established();

        let mut buf = [0_u8; READ_BUFFER];
        let fault = loop {
            if !self.session.alive.load(Ordering::SeqCst) {
                break None;
            }
            match self.handle.read_bulk(self.endpoint, &mut buf, self.poll_interval) {
                Ok(0) => continue,
                Ok(n) => self
                    .listeners
                    .message_received(self.charset.decode(&buf[..n])),
                Err(rusb::Error::Timeout) | Err(rusb::Error::Interrupted) => continue,
                Err(rusb::Error::NoDevice) => {
                    log::warn!("{} was unplugged", self.listeners.endpoint());
                    break None;
                }
                Err(_) if !self.session.alive.load(Ordering::SeqCst) => break None,
                Err(e) => break Some(ConnectionFault::new("failed to read from printer", e)),
            }
        };

        self.session.close();
        if let Some(fault) = fault {
            log::error!("{}: {}", self.listeners.endpoint(), fault);
            self.listeners.connection_failing(fault);
        }
        log::info!("Connection to {} closed", self.listeners.endpoint());
        self.listeners.connection_lost();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(bus: u8, ports: &[u8], vendor_id: u16, product_id: u16, name: &'static str) -> Located<&'static str> {
        Located {
            bus,
            ports: ports.to_vec(),
            vendor_id,
            product_id,
            device: name,
        }
    }

    fn topology() -> Vec<DeviceNode<&'static str>> {
        build_tree(vec![
            at(1, &[], 0x1d6b, 0x0002, "root-1"),
            at(1, &[2, 1], 0x1203, 0x0230, "printer-behind-hub"),
            at(1, &[2], 0x05e3, 0x0608, "hub"),
            at(2, &[], 0x1d6b, 0x0003, "root-2"),
            at(2, &[1], 0x1203, 0x0141, "printer-direct"),
            at(1, &[3], 0x046d, 0xc52b, "receiver"),
        ])
    }

    #[test]
    fn tree_follows_port_paths() {
        let tree = topology();
        let roots: Vec<_> = tree.iter().map(|n| n.device).collect();
        assert_eq!(roots, vec!["root-1", "root-2"]);

        let children: Vec<_> = tree[0].children.iter().map(|n| n.device).collect();
        assert_eq!(children, vec!["hub", "receiver"]);
        assert_eq!(tree[0].children[0].children[0].device, "printer-behind-hub");
        assert_eq!(tree[1].children[0].device, "printer-direct");
    }

    #[test]
    fn vendor_only_takes_first_depth_first() {
        let tree = topology();
        let found = find_device(&tree, 0x1203, None).unwrap();
        assert_eq!(found.device, "printer-behind-hub");
    }

    #[test]
    fn product_id_narrows_search() {
        let tree = topology();
        assert_eq!(
            find_device(&tree, 0x1203, Some(0x0141)).unwrap().device,
            "printer-direct"
        );
        assert!(find_device(&tree, 0x1203, Some(0xffff)).is_none());
        assert!(find_device(&tree, 0x0000, None).is_none());
    }

    #[test]
    fn orphans_become_roots() {
        let tree = build_tree(vec![at(3, &[4, 2], 0x1203, 0x0230, "printer")]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].device, "printer");
    }

    #[test]
    fn bulk_endpoints_selected() {
        let endpoints = vec![
            (TransferType::Interrupt, Direction::In, 0x83),
            (TransferType::Bulk, Direction::In, 0x81),
            (TransferType::Bulk, Direction::Out, 0x02),
            (TransferType::Bulk, Direction::Out, 0x04),
        ];
        assert_eq!(select_bulk_endpoints(endpoints), Some((0x02, 0x81)));
    }

    #[test]
    fn missing_bulk_in_is_rejected() {
        let endpoints = vec![
            (TransferType::Bulk, Direction::Out, 0x01),
            (TransferType::Interrupt, Direction::In, 0x82),
        ];
        assert_eq!(select_bulk_endpoints(endpoints), None);
    }

    #[test]
    fn unclaimed_connection() {
        let mut conn = UsbConnection::new(0x1203, Some(0x0230));
        assert_eq!(conn.listeners().endpoint(), "usb://1203:0230");
        assert_eq!(conn.state(), ConnectionState::Uninitialized);
        assert!(matches!(conn.connect(), Err(Error::NotInitialized)));
        assert!(matches!(conn.send(b"CLS\n"), Err(Error::NotConnected)));
        assert!(matches!(conn.info(), Err(Error::NotInitialized)));
        assert_eq!(
            UsbConnection::new(0x1203, None).listeners().endpoint(),
            "usb://1203:*"
        );
    }
}
