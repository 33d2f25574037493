//! 8259 PIC programming — remap the two controllers off the CPU exception
//! vector range and unmask only the timer, matching the single hardware
//! interrupt source (IRQ0) this kernel actually uses.

use x86_64::instructions::port::Port;

pub const PIC1_OFFSET: u8 = 32;
pub const PIC2_OFFSET: u8 = 40;

pub fn init() {
    let mut master_cmd: Port<u8> = Port::new(0x20);
    let mut master_data: Port<u8> = Port::new(0x21);
    let mut slave_cmd: Port<u8> = Port::new(0xA0);
    let mut slave_data: Port<u8> = Port::new(0xA1);

    unsafe {
        master_cmd.write(0x11);
        slave_cmd.write(0x11);

        master_data.write(PIC1_OFFSET);
        slave_data.write(PIC2_OFFSET);

        master_data.write(0x04);
        slave_data.write(0x02);

        master_data.write(0x01);
        slave_data.write(0x01);

        // Unmask IRQ0 (timer) only; everything else this kernel has no
        // driver for stays masked.
        master_data.write(0xFE);
        slave_data.write(0xFF);
    }
    log::info!("PIC remapped to {}/{}", PIC1_OFFSET, PIC2_OFFSET);
}

pub fn end_of_interrupt(irq: u8) {
    let mut master_cmd: Port<u8> = Port::new(0x20);
    let mut slave_cmd: Port<u8> = Port::new(0xA0);
    unsafe {
        if irq >= 8 {
            slave_cmd.write(0x20u8);
        }
        master_cmd.write(0x20u8);
    }
}
