//! Inter-core mailbox FIFO
//!
//! Thin wrapper over the SIO FIFO registers. Each core sees its own
//! read side at the same address, so one zero-sized type serves both
//! ends of the handshake.

use embassy_rp::pac;
use nereid_core::traits::InterCoreFifo;

pub struct SioFifo;

impl InterCoreFifo for SioFifo {
    fn try_read(&mut self) -> Option<u32> {
        if pac::SIO.fifo_st().read().vld() {
            Some(pac::SIO.fifo_rd().read())
        } else {
            None
        }
    }

    fn write(&mut self, word: u32) {
        while !pac::SIO.fifo_st().read().rdy() {}
        pac::SIO.fifo_wr().write_value(word);
        // Wake the other core in case it is parked in WFE
        cortex_m::asm::sev();
    }
}
