mod runtime;

use std::sync::Arc;

pub use host::{TestHost, TestInstance};
pub use runtime::TestRuntime;

use crate::{bridge::LifetimeBridge, config::BridgeConfig, runtime::ObjectId};

// Helper function to create an identity from a literal
pub fn object_id(raw: u64) -> ObjectId {
    ObjectId::new(raw).unwrap()
}

// Helper function to create a bridge over fresh doubles
pub fn create_test_bridge(
    config: BridgeConfig,
) -> (Arc<TestHost>, Arc<TestRuntime>, Arc<LifetimeBridge>) {
    let host = Arc::new(TestHost::new());
    let runtime = Arc::new(TestRuntime::new());
    let bridge = Arc::new(LifetimeBridge::new(host.clone(), runtime.clone(), config));
    (host, runtime, bridge)
}
