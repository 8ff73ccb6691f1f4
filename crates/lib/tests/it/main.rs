/*! Integration tests for Haven.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - vault: Key custody, record persistence and unlock deadlines
 * - session: Login throttling and idle expiry through the public API
 * - access: Zone and section approval workflows
 * - messaging: Gift wrap privacy properties
 * - client: End-to-end flows over a loopback relay
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("haven=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod access;
mod client;
mod helpers;
mod messaging;
mod session;
mod vault;
