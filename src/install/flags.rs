//! Operation flags selecting the setup phases of one run

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask of requested phases. Bits combine freely; execution order is
/// fixed by [`super::orchestration::Phase::ORDER`], never by bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SetupFlags(u32);

impl SetupFlags {
    pub const NONE: SetupFlags = SetupFlags(0);
    pub const CHECK: SetupFlags = SetupFlags(0x1);
    pub const BACKUP: SetupFlags = SetupFlags(0x2);
    pub const RECONFIGURE: SetupFlags = SetupFlags(0x4);
    pub const FIX: SetupFlags = SetupFlags(0x8);
    pub const UNINSTALL: SetupFlags = SetupFlags(0x10);
    pub const INSTALL: SetupFlags = SetupFlags(0x20);

    const ALL_BITS: u32 = 0x3f;

    /// Build from raw bits, dropping unknown ones
    pub fn from_bits_truncate(bits: u32) -> Self {
        SetupFlags(bits & Self::ALL_BITS)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: SetupFlags) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: SetupFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Phases that change the host configuration or the store
    pub fn mutating() -> SetupFlags {
        Self::RECONFIGURE | Self::FIX | Self::UNINSTALL | Self::INSTALL
    }
}

impl BitOr for SetupFlags {
    type Output = SetupFlags;

    fn bitor(self, rhs: SetupFlags) -> SetupFlags {
        SetupFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for SetupFlags {
    fn bitor_assign(&mut self, rhs: SetupFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for SetupFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(SetupFlags, &str); 6] = [
            (SetupFlags::CHECK, "Check"),
            (SetupFlags::BACKUP, "Backup"),
            (SetupFlags::RECONFIGURE, "Reconfigure"),
            (SetupFlags::FIX, "Fix"),
            (SetupFlags::UNINSTALL, "Uninstall"),
            (SetupFlags::INSTALL, "Install"),
        ];

        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();

        if names.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}
