//! `SKIP_TEST_CLUSTER` policy for suites that need embedded PostgreSQL.

/// True when `SKIP_TEST_CLUSTER` is `1`, `true`, or `yes` (any case).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker line when the cluster is opted out, otherwise fail.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_values_skip() {
        for value in ["1", "TRUE", "yes"] {
            let _guard = env_lock::lock_env([("SKIP_TEST_CLUSTER", Some(value.to_owned()))]);
            assert!(should_skip_test_cluster(), "{value} should skip");
        }
    }

    #[test]
    fn unset_does_not_skip() {
        let _guard = env_lock::lock_env([("SKIP_TEST_CLUSTER", None::<String>)]);
        assert!(!should_skip_test_cluster());
    }
}
