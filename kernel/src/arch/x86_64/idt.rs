//! Interrupt Descriptor Table. CPU exception handlers log and halt — this
//! kernel has no userspace and no recovery path for a faulting kernel
//! thread — plus the two vectors that actually drive scheduling: IRQ0
//! (32, the timer tick) and INT 0x80 (the syscall gate), both wired to the
//! naked-asm trampolines in `context`.

use lazy_static::lazy_static;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame};

use super::context::{syscall_trampoline, timer_trampoline};

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();

        idt.divide_error.set_handler_fn(divide_error_handler);
        idt.debug.set_handler_fn(debug_handler);
        idt.non_maskable_interrupt.set_handler_fn(nmi_handler);
        idt.breakpoint.set_handler_fn(breakpoint_handler);
        idt.overflow.set_handler_fn(overflow_handler);
        idt.bound_range_exceeded.set_handler_fn(bound_range_exceeded_handler);
        idt.invalid_opcode.set_handler_fn(invalid_opcode_handler);
        idt.device_not_available.set_handler_fn(device_not_available_handler);
        unsafe {
            idt.double_fault
                .set_handler_fn(double_fault_handler)
                .set_stack_index(super::gdt::DOUBLE_FAULT_IST_INDEX);
        }
        idt.invalid_tss.set_handler_fn(invalid_tss_handler);
        idt.segment_not_present.set_handler_fn(segment_not_present_handler);
        idt.stack_segment_fault.set_handler_fn(stack_segment_fault_handler);
        idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);
        idt.page_fault.set_handler_fn(page_fault_handler);
        idt.x87_floating_point.set_handler_fn(x87_floating_point_handler);
        idt.alignment_check.set_handler_fn(alignment_check_handler);
        idt.machine_check.set_handler_fn(machine_check_handler);
        idt.simd_floating_point.set_handler_fn(simd_floating_point_handler);
        idt.virtualization.set_handler_fn(virtualization_handler);
        idt.security_exception.set_handler_fn(security_exception_handler);

        unsafe {
            idt[32].set_handler_addr(core::mem::transmute::<*const (), x86_64::VirtAddr>(
                timer_trampoline as *const (),
            ));
            idt[0x80].set_handler_addr(core::mem::transmute::<*const (), x86_64::VirtAddr>(
                syscall_trampoline as *const (),
            ));
        }

        idt
    };
}

pub fn init() {
    IDT.load();
    log::info!("IDT loaded");
}

fn halt_loop() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}

extern "x86-interrupt" fn divide_error_handler(frame: InterruptStackFrame) {
    log::error!("divide error at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn debug_handler(_frame: InterruptStackFrame) {}

extern "x86-interrupt" fn nmi_handler(frame: InterruptStackFrame) {
    log::error!("NMI at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn breakpoint_handler(frame: InterruptStackFrame) {
    log::warn!("breakpoint at {:?}", frame.instruction_pointer);
}

extern "x86-interrupt" fn overflow_handler(frame: InterruptStackFrame) {
    log::error!("overflow at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn bound_range_exceeded_handler(frame: InterruptStackFrame) {
    log::error!("bound range exceeded at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn invalid_opcode_handler(frame: InterruptStackFrame) {
    log::error!("invalid opcode at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn device_not_available_handler(frame: InterruptStackFrame) {
    log::error!("device not available at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn double_fault_handler(
    frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    log::error!("DOUBLE FAULT at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn invalid_tss_handler(frame: InterruptStackFrame, error_code: u64) {
    log::error!("invalid TSS ({:#x}) at {:?}", error_code, frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn segment_not_present_handler(
    frame: InterruptStackFrame,
    error_code: u64,
) {
    log::error!(
        "segment not present ({:#x}) at {:?}",
        error_code,
        frame.instruction_pointer
    );
    halt_loop();
}

extern "x86-interrupt" fn stack_segment_fault_handler(
    frame: InterruptStackFrame,
    error_code: u64,
) {
    log::error!(
        "stack segment fault ({:#x}) at {:?}",
        error_code,
        frame.instruction_pointer
    );
    halt_loop();
}

extern "x86-interrupt" fn general_protection_fault_handler(
    frame: InterruptStackFrame,
    error_code: u64,
) {
    log::error!(
        "general protection fault ({:#x}) at {:?}",
        error_code,
        frame.instruction_pointer
    );
    halt_loop();
}

extern "x86-interrupt" fn page_fault_handler(
    frame: InterruptStackFrame,
    error_code: x86_64::structures::idt::PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;
    let fault_addr = Cr2::read();
    log::error!(
        "page fault at {:?} (error {:?}, rip {:?})",
        fault_addr,
        error_code,
        frame.instruction_pointer
    );
    halt_loop();
}

extern "x86-interrupt" fn x87_floating_point_handler(frame: InterruptStackFrame) {
    log::error!("x87 floating point exception at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn alignment_check_handler(frame: InterruptStackFrame, _error_code: u64) {
    log::error!("alignment check at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn machine_check_handler(frame: InterruptStackFrame) -> ! {
    log::error!("machine check at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn simd_floating_point_handler(frame: InterruptStackFrame) {
    log::error!("SIMD floating point exception at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn virtualization_handler(frame: InterruptStackFrame) {
    log::error!("virtualization exception at {:?}", frame.instruction_pointer);
    halt_loop();
}

extern "x86-interrupt" fn security_exception_handler(frame: InterruptStackFrame, _error_code: u64) {
    log::error!("security exception at {:?}", frame.instruction_pointer);
    halt_loop();
}
