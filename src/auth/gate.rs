/// Shared-secret access gate. Exact string equality against the configured
/// secret; an unconfigured secret is the empty string.
pub fn authorize(expected: &str, submitted: &str) -> bool {
    submitted == expected
}
