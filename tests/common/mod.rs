/// Installs a test logger once per test binary.
///
/// Output is captured by the test harness; run with `RUST_LOG=trace` to see
/// the runtime's own logging.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
