use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use log::warn;

use crate::device::Device;

/// The three memory mapped registers the console bridge occupies. The
/// defaults match the classic 6502 kit layout Microsoft BASIC builds talk
/// to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeAddresses {
    /// Writes here are sent to the output sink.
    pub output_data: u16,
    /// Reads 1 while at least one input character is buffered, else 0.
    pub input_status: u16,
    /// Reads dequeue one buffered character, oldest first.
    pub input_data: u16,
}

impl Default for BridgeAddresses {
    fn default() -> BridgeAddresses {
        BridgeAddresses {
            output_data: 0xF001,
            input_status: 0xF004,
            input_data: 0xF005,
        }
    }
}

/// A cloneable handle onto the bridge's input buffer. The buffer sits
/// behind a mutex so a UI or reader thread can submit text while the CPU
/// thread is draining it.
#[derive(Clone)]
pub struct ConsoleInput {
    buffer: Arc<Mutex<VecDeque<u8>>>,
}

impl ConsoleInput {
    pub fn new() -> ConsoleInput {
        ConsoleInput {
            buffer: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Queue every character of the text, first in first out.
    pub fn submit_input(&self, text: &str) {
        let mut buffer = self.lock();
        for byte in text.bytes() {
            buffer.push_back(byte);
        }
    }

    pub fn has_input(&self) -> bool {
        !self.lock().is_empty()
    }

    fn pop(&self) -> Option<u8> {
        self.lock().pop_front()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<u8>> {
        // A poisoned buffer only means a producer thread panicked; the
        // bytes themselves are still fine to hand out.
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A source the bridge falls back on when a program reads input and the
/// buffer is empty.
pub trait InputSource {
    /// Return the next character if one is ready, without blocking.
    fn poll_byte(&mut self) -> Option<u8>;
}

/// The reference console device: an output latch and a two register input
/// port. A program writes characters to the output latch one at a time and
/// polls the status register before reading input, so a terminal style host
/// only needs to keep the buffer fed and watch the sink.
pub struct ConsoleBridge {
    addresses: BridgeAddresses,
    input: ConsoleInput,
    fallback: Option<Box<dyn InputSource + Send>>,
    output: Box<dyn Write + Send>,
}

impl ConsoleBridge {
    /// A bridge at the default addresses, writing to stdout.
    pub fn new() -> ConsoleBridge {
        ConsoleBridge::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write + Send>) -> ConsoleBridge {
        ConsoleBridge {
            addresses: BridgeAddresses::default(),
            input: ConsoleInput::new(),
            fallback: None,
            output,
        }
    }

    pub fn with_addresses(mut self, addresses: BridgeAddresses) -> ConsoleBridge {
        self.addresses = addresses;
        self
    }

    pub fn with_fallback(mut self, fallback: Box<dyn InputSource + Send>) -> ConsoleBridge {
        self.fallback = Some(fallback);
        self
    }

    /// A handle the host can keep to feed input from another thread after
    /// the bridge itself has been attached to the bus.
    pub fn input(&self) -> ConsoleInput {
        self.input.clone()
    }

    pub fn submit_input(&self, text: &str) {
        self.input.submit_input(text);
    }
}

impl Device for ConsoleBridge {
    fn handles(&self, address: u16) -> bool {
        address == self.addresses.output_data
            || address == self.addresses.input_status
            || address == self.addresses.input_data
    }

    fn read(&mut self, address: u16) -> u8 {
        if address == self.addresses.input_status {
            return self.input.has_input() as u8;
        }
        if address == self.addresses.input_data {
            if let Some(byte) = self.input.pop() {
                return byte;
            }
            if let Some(fallback) = self.fallback.as_mut() {
                if let Some(byte) = fallback.poll_byte() {
                    return byte;
                }
            }
            return 0;
        }
        // The output latch has nothing to read back.
        0
    }

    fn write(&mut self, address: u16, value: u8) {
        if address != self.addresses.output_data {
            // Writes to the input registers are ignored.
            return;
        }
        // Flush eagerly so the host sees output as the program produces it.
        let result = self
            .output
            .write_all(&[value])
            .and_then(|_| self.output.flush());
        if let Err(error) = result {
            warn!("console output write failed: {}", error);
        }
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use super::*;

    /// An output sink the test can keep a handle on after the bridge takes
    /// ownership of the writer.
    #[derive(Clone)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl SharedSink {
        fn new() -> SharedSink {
            SharedSink(Arc::new(Mutex::new(Vec::new())))
        }

        fn bytes(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct ScriptedSource(VecDeque<u8>);

    impl InputSource for ScriptedSource {
        fn poll_byte(&mut self) -> Option<u8> {
            self.0.pop_front()
        }
    }

    const ADDRESSES: BridgeAddresses = BridgeAddresses {
        output_data: 0xF001,
        input_status: 0xF004,
        input_data: 0xF005,
    };

    #[test]
    fn output_writes_reach_the_sink() {
        let sink = SharedSink::new();
        let mut bridge = ConsoleBridge::with_output(Box::new(sink.clone()));
        bridge.write(ADDRESSES.output_data, b'A');
        bridge.write(ADDRESSES.output_data, b'B');
        assert_eq!(sink.bytes(), b"AB");
    }

    #[test]
    fn input_status_reports_buffered_characters() {
        let sink = SharedSink::new();
        let mut bridge = ConsoleBridge::with_output(Box::new(sink.clone()));
        assert_eq!(bridge.read(ADDRESSES.input_status), 0);
        bridge.submit_input("X");
        assert_eq!(bridge.read(ADDRESSES.input_status), 1);
    }

    #[test]
    fn input_reads_are_first_in_first_out() {
        let sink = SharedSink::new();
        let mut bridge = ConsoleBridge::with_output(Box::new(sink.clone()));
        bridge.submit_input("HI");
        assert_eq!(bridge.read(ADDRESSES.input_data), b'H');
        assert_eq!(bridge.read(ADDRESSES.input_data), b'I');
        assert_eq!(bridge.read(ADDRESSES.input_status), 0);
        // An empty buffer with no fallback reads as 0.
        assert_eq!(bridge.read(ADDRESSES.input_data), 0);
    }

    #[test]
    fn empty_buffer_falls_back_to_the_source() {
        let sink = SharedSink::new();
        let mut bridge = ConsoleBridge::with_output(Box::new(sink.clone()))
            .with_fallback(Box::new(ScriptedSource(VecDeque::from(vec![b'Q']))));
        // Buffered input is served first.
        bridge.submit_input("P");
        assert_eq!(bridge.read(ADDRESSES.input_data), b'P');
        assert_eq!(bridge.read(ADDRESSES.input_data), b'Q');
        assert_eq!(bridge.read(ADDRESSES.input_data), 0);
    }

    #[test]
    fn the_fallback_does_not_affect_input_status() {
        let sink = SharedSink::new();
        let mut bridge = ConsoleBridge::with_output(Box::new(sink.clone()))
            .with_fallback(Box::new(ScriptedSource(VecDeque::from(vec![b'Q']))));
        // Status only reports the buffer.
        assert_eq!(bridge.read(ADDRESSES.input_status), 0);
    }

    #[test]
    fn input_register_writes_and_output_reads_are_inert() {
        let sink = SharedSink::new();
        let mut bridge = ConsoleBridge::with_output(Box::new(sink.clone()));
        bridge.submit_input("Z");
        bridge.write(ADDRESSES.input_status, 0xFF);
        bridge.write(ADDRESSES.input_data, 0xFF);
        assert_eq!(bridge.read(ADDRESSES.output_data), 0);
        assert_eq!(sink.bytes(), b"");
        assert_eq!(bridge.read(ADDRESSES.input_data), b'Z');
    }

    #[test]
    fn custom_addresses_are_honored() {
        let addresses = BridgeAddresses {
            output_data: 0xD000,
            input_status: 0xD001,
            input_data: 0xD002,
        };
        let sink = SharedSink::new();
        let mut bridge =
            ConsoleBridge::with_output(Box::new(sink.clone())).with_addresses(addresses);
        assert!(bridge.handles(0xD000));
        assert!(!bridge.handles(0xF001));
        bridge.write(0xD000, b'!');
        assert_eq!(sink.bytes(), b"!");
    }

    #[test]
    fn input_can_be_submitted_from_another_thread() {
        let sink = SharedSink::new();
        let mut bridge = ConsoleBridge::with_output(Box::new(sink.clone()));
        let input = bridge.input();

        let producer = thread::spawn(move || {
            input.submit_input("HI");
        });
        producer.join().unwrap();

        assert_eq!(bridge.read(ADDRESSES.input_status), 1);
        assert_eq!(bridge.read(ADDRESSES.input_data), b'H');
        assert_eq!(bridge.read(ADDRESSES.input_data), b'I');
    }
}
