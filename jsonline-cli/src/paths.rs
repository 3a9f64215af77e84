//! Location of the sibling `jsonline-core` component, fixed at build time
//! relative to this crate's manifest directory.
//!
//! Only meaningful for a binary built inside this workspace; an installed
//! copy reports whatever the build checkout held.

use std::path::Path;

macro_rules! core_root_dir {
    () => {
        concat!(env!("CARGO_MANIFEST_DIR"), "/../jsonline-core")
    };
}

pub(crate) const CORE_COMPONENT_NAME: &str = "jsonline-core";
pub(crate) const CORE_ROOT: &str = core_root_dir!();
pub(crate) const CORE_MANIFEST: &str = concat!(core_root_dir!(), "/Cargo.toml");

pub(crate) fn core_root() -> &'static Path {
    Path::new(CORE_ROOT)
}

pub(crate) fn core_manifest() -> &'static Path {
    Path::new(CORE_MANIFEST)
}
