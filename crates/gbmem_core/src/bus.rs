/// Abstraction over the Game Boy bus as seen by the CPU core.
///
/// Every load and store the CPU issues goes through here. Implementations
/// are synchronous: a store is visible to the very next load.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// 16-bit load. Not modelled yet; always reads 0.
    ///
    /// This is deliberately not split into two 8-bit accesses, since the
    /// access ordering and timing of wide loads are still undecided.
    fn read16(&mut self, addr: u16) -> u16 {
        log::trace!("16-bit load from {addr:#06x} is not modelled");
        0
    }

    /// 16-bit store. Not modelled yet; does nothing.
    fn write16(&mut self, addr: u16, value: u16) {
        log::trace!("16-bit store {value:#06x} to {addr:#06x} is not modelled");
    }

    /// Hook that marks the beginning of a CPU instruction at `pc`.
    ///
    /// Buses that record traced accesses use it to key events by program
    /// counter; the default does nothing.
    fn begin_instruction(&mut self, _pc: u16) {}
}
