//! Fetch a single todo item from a JSON API and summarize it.
//!
//! Startup runs in three steps: [`config::load_app_settings`] builds the
//! settings tree, [`logging::setup_logging`] installs the subscriber, and
//! [`fetch::fetch`] plus [`process::process_data_util`] do the work.

pub mod config;
pub mod fetch;
pub mod logging;
pub mod process;

#[cfg(test)]
mod test_support;
