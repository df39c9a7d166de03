#![allow(dead_code)]

pub use applink_test_utils::builders;
pub use applink_test_utils::fake_backend;
pub use applink_test_utils::{init_tracing, with_timeout};
