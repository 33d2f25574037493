//! Programmable Interval Timer, channel 0, as the IRQ0 tick source driving
//! `kernel_core::timer::on_timer_tick`. Programmed for `MS_PER_TICK`
//! milliseconds per interrupt, the same raw-port-I/O style as the PIC and
//! serial port setup.

use x86_64::instructions::port::Port;

const PIT_FREQUENCY_HZ: u32 = 1_193_182;
const CHANNEL0_DATA: u16 = 0x40;
const COMMAND: u16 = 0x43;

pub fn init() {
    let hz = 1000 / kernel_core::MS_PER_TICK as u32;
    let divisor = (PIT_FREQUENCY_HZ / hz) as u16;

    let mut command: Port<u8> = Port::new(COMMAND);
    let mut data: Port<u8> = Port::new(CHANNEL0_DATA);

    unsafe {
        // Channel 0, lobyte/hibyte access, mode 3 (square wave), binary.
        command.write(0b0011_0110u8);
        data.write((divisor & 0xFF) as u8);
        data.write((divisor >> 8) as u8);
    }
    log::info!(
        "PIT channel 0 programmed for {} Hz (divisor {})",
        hz,
        divisor
    );
}
