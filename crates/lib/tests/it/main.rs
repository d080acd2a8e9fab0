/*! Integration tests for Feline.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - auth: Credential checks and the token store
 * - engine: The subprocess Line Engine client against script stand-ins
 * - navigation: Transitions of the review flow state machine
 * - builder: The builder side-path
 * - scenarios: End-to-end request sequences (login, file selection, builder failure)
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("feline=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod navigation;
mod scenarios;
