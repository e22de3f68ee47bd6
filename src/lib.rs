//! # Wine Registry Diff
//!
//! Parses Wine registry files (`system.reg`, `user.reg`, `userdef.reg`, or
//! the output of `wine reg export`), compares two snapshots and renders the
//! difference as `reg ADD` / `reg DELETE` commands.
//!
//! ## Pipeline
//!
//! ```text
//! bytes ──decode──▶ text ──parser──▶ Registry ─┐
//!                                              ├─diff──▶ RegistryDiff ──command──▶ Vec<Command>
//! bytes ──decode──▶ text ──parser──▶ Registry ─┘
//! ```
//!
//! 1. **Value codec** ([`value`]): `"string"`, `dword:`, `hex:` and
//!    `hex(<type>):` data encodings
//! 2. **Parser** ([`parser`]): header check, line continuations, key and value
//!    lines
//! 3. **Differ** ([`diff`], [`compare`]): keys only in one snapshot, and
//!    per-name changes of keys in both
//! 4. **Command generator** ([`command`]): `reg` argument lists for either
//!    direction
//!
//! ## Examples
//!
//! ```no_run
//! use wine_regdiff::{diff, generate_commands, ChangesFor, CommandOptions, Registry, RegistryRoot};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let before = Registry::open("before/system.reg")?;
//! let after = Registry::open("after/system.reg")?;
//!
//! let changes = diff(&before, &after)?;
//! let options = CommandOptions {
//!     root: RegistryRoot::LocalMachine,
//!     changes_for: ChangesFor::One,
//!     force: true,
//! };
//! for command in generate_commands(&changes, &options) {
//!     println!("wine {}", command);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Ignoring Noisy Keys
//!
//! ```rust
//! use wine_regdiff::{diff_with, Data, DefaultValueComparator, Registry, Value};
//!
//! let reg1 = Registry::new().with("Volatile", Value::new().with("Counter", Data::Dword(1)));
//! let reg2 = Registry::new().with("Volatile", Value::new().with("Counter", Data::Dword(2)));
//!
//! let comparator = DefaultValueComparator::new().ignoring(["Volatile"]);
//! assert!(diff_with(&reg1, &reg2, &comparator).unwrap().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod compare;
pub mod diff;
pub mod error;
pub mod parser;
pub mod registry;
pub mod utils;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export main types for convenience
pub use command::{generate_commands, ChangesFor, Command, CommandOptions, Verb};
pub use compare::{DataComparator, DefaultDataComparator, DefaultValueComparator, ValueComparator};
pub use diff::{diff, diff_with, RegistryDiff, ValueDiff};
pub use error::{RegistryError, Result};
pub use parser::FILE_HEADER;
pub use registry::{DataName, Key, Registry, RegistryRoot, Value};
pub use value::{Data, DataType};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
