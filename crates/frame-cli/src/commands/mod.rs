//! Command implementations for frame-cli

pub mod activate;
pub mod install;
pub mod list;
pub mod remove;
pub mod show;

pub use activate::{run_activate, run_deactivate};
pub use install::run_install;
pub use list::run_list;
pub use remove::run_remove;
pub use show::run_show;

use frame_drivers::{Catalog, Settings};

fn catalog(settings: &Settings) -> Catalog {
    Catalog::new(&settings.builtin_root, &settings.external_root)
}
