use std::sync::Arc;

use jiff::civil::date;
use rota_core::{
    host::{MemoryHost, MemoryObject},
    PlannerBuilder, PlannerConfig, PlannerController,
};

/// Helper function to create a host with a small crew for February 2024
pub fn create_test_host() -> Arc<MemoryHost> {
    let host = Arc::new(MemoryHost::new());
    host.insert(MemoryObject::context("view", 2024, 2));
    for (id, name) in [("r1", "Alice"), ("r2", "Bob"), ("r3", "Carol")] {
        host.insert(MemoryObject::resource(id, name));
    }
    host.insert(MemoryObject::entry("e1", "r1", date(2024, 2, 1), "Early"));
    host.insert(MemoryObject::entry("e2", "r1", date(2024, 2, 29), "Leap"));
    host.insert(MemoryObject::entry("e3", "r2", date(2024, 2, 14), "Late"));
    host
}

/// Helper function to create a loaded planner
pub async fn create_test_planner(
    host: &Arc<MemoryHost>,
    config: PlannerConfig,
) -> PlannerController<MemoryHost> {
    let mut planner = PlannerBuilder::new(host.clone())
        .with_config(config)
        .with_today(date(2024, 2, 14))
        .build()
        .expect("Failed to create planner");
    let context = host
        .get(&"view".into())
        .expect("Failed to find context object");
    planner.load(Some(context)).await;
    planner
}
