/// A memory mapped peripheral that can be attached to the bus.
///
/// Devices are selected by capability rather than by address range: the bus
/// asks each one in attachment order whether it handles an address, and
/// routes the access to the first that claims it.
pub trait Device {
    /// Does this device respond to the given address?
    fn handles(&self, address: u16) -> bool;

    /// Read a byte from the device.
    ///
    /// This is mutable because some devices change state in response to a
    /// read, like the console bridge dequeuing a buffered input character.
    /// The bus never calls this for an address the device disclaims.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the device.
    fn write(&mut self, address: u16, value: u8);
}
