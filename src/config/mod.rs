//! Era-aware configuration resolution.
//!
//! Modules are defined once with their default option sets, optionally
//! cloned prototype-style, then patched by era modifiers during a single
//! synchronous resolution pass:
//! 1. **Built-ins** - module defaults compiled into the binary
//! 2. **Fragments** - YAML files applied in lexicographic file order
//! 3. **Modifiers** - era patches applied in registration order when the
//!    era is flagged active
//!
//! ## Override semantics
//! - Patches fully replace the named option (sequences are replaced, never
//!   appended to); later active modifiers win
//! - Clones are value copies; overrides are strict against the source schema
//!
//! ## Environment Variables
//! - `PSET_FRAGMENTS_DIR` - Explicit fragments directory
//! - `PSET_USER_DIR` - User config dir (default: `~/.pset-config`)
//! - `PSET_ACTIVE_ERAS` - Comma-separated active era flags

pub mod builtin;
mod loader;
mod modifier;
mod pset;
mod registry;

pub use loader::{CloneDecl, Fragment, FragmentLoader, FragmentPaths, ModifierDecl};
pub use modifier::{EraModifier, Patch};
pub use pset::Pset;
pub use registry::{Registry, ResolvedConfig};
