//! Environment-variable debug toggles, read once per process.

use std::sync::OnceLock;

/// `RYGAR_BG_ONLY`: draw only the background layer.
pub(super) fn bg_only() -> bool {
    static FLAG: OnceLock<bool> = OnceLock::new();
    *FLAG.get_or_init(|| std::env::var_os("RYGAR_BG_ONLY").is_some())
}

/// `RYGAR_NO_SPRITES`: suppress the sprite layer.
pub(super) fn no_sprites() -> bool {
    static FLAG: OnceLock<bool> = OnceLock::new();
    *FLAG.get_or_init(|| std::env::var_os("RYGAR_NO_SPRITES").is_some())
}
