use bitflags::bitflags;

bitflags! {
    /// Raw fault bits reported by a stage controller.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaultFlags: u32 {
        const DRIVER_FAULT   = 0x0001;
        const OVERHEAT       = 0x0002;
        const OVERLOAD       = 0x0004;
        const LIMIT_REACHED  = 0x0008;
        const POWER_LOSS     = 0x0010;
        const DISCONNECTED   = 0x0020;
    }
}

impl FaultFlags {
    pub fn is_clear(&self) -> bool {
        self.is_empty()
    }

    pub fn requires_inspection(&self) -> bool {
        self.intersects(FaultFlags::DRIVER_FAULT | FaultFlags::OVERHEAT | FaultFlags::OVERLOAD)
    }
}
