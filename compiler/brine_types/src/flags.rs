//! Type metadata flags.
//!
//! Used to skip traversals: substitution is a no-op on a type without
//! `HAS_PARAM`, alias resolution is a no-op without `HAS_ALIAS`.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeFlags: u16 {
        // === Presence Flags ===
        // Propagate from children to parents.

        /// Contains a type parameter.
        const HAS_PARAM = 1 << 0;
        /// Contains an alias.
        const HAS_ALIAS = 1 << 1;
        /// Contains the error type.
        const HAS_ERROR = 1 << 2;

        // === Category Flags ===
        // Describe only the outermost type.

        const IS_PRIMITIVE = 1 << 8;
        const IS_NAMED = 1 << 9;

        const PRESENCE = Self::HAS_PARAM.bits() | Self::HAS_ALIAS.bits() | Self::HAS_ERROR.bits();
    }
}
