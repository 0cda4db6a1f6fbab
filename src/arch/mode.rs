//! RISC-V privilege modes and paging modes.
//!
//! This module implements:
//! 1. **Privilege classification:** User, Supervisor, and Machine modes.
//! 2. **Paging modes:** Bare and the Sv32/Sv39/Sv48/Sv57 paged modes.
//! 3. **`PagingLayout`:** the per-mode constant table the walker is
//!    parameterized over, replacing a walker hard-coded to one mode.

/// RISC-V privilege mode levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrivilegeMode {
    /// User mode (U-mode). Lowest privilege level.
    User = 0,
    /// Supervisor mode (S-mode). Runs the guest kernel.
    Supervisor = 1,
    /// Machine mode (M-mode). Highest privilege level.
    Machine = 3,
}

impl PrivilegeMode {
    /// Converts a raw 2-bit privilege value, defaulting to `Machine` for the
    /// reserved encoding `2`.
    #[must_use]
    pub const fn from_u8(val: u8) -> Self {
        match val {
            0 => Self::User,
            1 => Self::Supervisor,
            _ => Self::Machine,
        }
    }

    /// The raw 2-bit privilege value.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PrivilegeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::User => "User",
            Self::Supervisor => "Supervisor",
            Self::Machine => "Machine",
        };
        write!(f, "{name}")
    }
}

/// RISC-V paged virtual-memory mode, as encoded in `satp.MODE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagingMode {
    /// No translation; physical address equals virtual address.
    Bare,
    /// 32-bit, two-level paging (RV32 only).
    Sv32,
    /// 39-bit, three-level paging.
    Sv39,
    /// 48-bit, four-level paging.
    Sv48,
    /// 57-bit, five-level paging.
    Sv57,
}

impl PagingMode {
    /// Decodes `satp.MODE` for a 64-bit `satp` (Sv39/Sv48/Sv57/Bare).
    ///
    /// Returns `None` for any value the architecture has not defined (the
    /// WARL case described in the crate's error handling design): the
    /// caller is expected to treat this as a page fault on the access that
    /// triggered the decode, per spec §7 point 4.
    #[must_use]
    pub fn from_satp_mode64(mode: u64) -> Option<Self> {
        match mode {
            0 => Some(Self::Bare),
            8 => Some(Self::Sv39),
            9 => Some(Self::Sv48),
            10 => Some(Self::Sv57),
            other => {
                tracing::warn!(mode = other, "unknown 64-bit satp.MODE value (WARL)");
                None
            }
        }
    }

    /// Decodes `satp.MODE` for a 32-bit `satp` (Sv32/Bare).
    #[must_use]
    pub fn from_satp_mode32(mode: u32) -> Option<Self> {
        match mode {
            0 => Some(Self::Bare),
            1 => Some(Self::Sv32),
            other => {
                tracing::warn!(mode = other, "unknown 32-bit satp.MODE value (WARL)");
                None
            }
        }
    }

    /// The walker's constant table for this mode, or `None` for `Bare`
    /// (which never walks).
    #[must_use]
    pub const fn layout(self) -> Option<PagingLayout> {
        match self {
            Self::Bare => None,
            Self::Sv32 => Some(PagingLayout {
                vpn_bits: 10,
                levels: 2,
                phys_bits: 34,
                pte_bytes: 4,
            }),
            Self::Sv39 => Some(PagingLayout {
                vpn_bits: 9,
                levels: 3,
                phys_bits: 56,
                pte_bytes: 8,
            }),
            Self::Sv48 => Some(PagingLayout {
                vpn_bits: 9,
                levels: 4,
                phys_bits: 56,
                pte_bytes: 8,
            }),
            Self::Sv57 => Some(PagingLayout {
                vpn_bits: 9,
                levels: 5,
                phys_bits: 56,
                pte_bytes: 8,
            }),
        }
    }

    /// Whether this mode uses 64-bit PTEs and therefore requires the
    /// canonical-address (sign-extension) check before walking.
    #[must_use]
    pub const fn is_64bit(self) -> bool {
        matches!(self, Self::Sv39 | Self::Sv48 | Self::Sv57)
    }
}

/// Per-mode constants the walker is parameterized over.
///
/// | Mode | `vpn_bits` | `levels` | `phys_bits` | `pte_bytes` |
/// |------|------------|----------|-------------|-------------|
/// | Sv32 | 10         | 2        | 34          | 4           |
/// | Sv39 | 9          | 3        | 56          | 8           |
/// | Sv48 | 9          | 4        | 56          | 8           |
/// | Sv57 | 9          | 5        | 56          | 8           |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagingLayout {
    /// Number of VPN bits consumed at each level.
    pub vpn_bits: u32,
    /// Number of page-table levels.
    pub levels: u32,
    /// Number of implemented physical address bits.
    pub phys_bits: u32,
    /// Size of one PTE in bytes (4 for Sv32, 8 otherwise).
    pub pte_bytes: u64,
}

impl PagingLayout {
    /// `bit_off` at the root level: `(levels - 1) * vpn_bits + PAGE_SHIFT`.
    #[must_use]
    pub const fn root_bit_off(self) -> u32 {
        (self.levels - 1) * self.vpn_bits + 12
    }
}
