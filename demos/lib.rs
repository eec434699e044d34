//! Shared helpers for the Tabula demos

use tabula_sdk::{table_from_yaml, DecisionTable, MapContext};

/// Shipping options table used by every demo
pub const SHIPPING_TABLE: &str = include_str!("tables/shipping.yaml");

/// Install a `tracing` subscriber honoring `RUST_LOG`, `info` by default
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();
}

/// Load the shipping table
pub fn shipping_table() -> tabula_sdk::Result<DecisionTable> {
    table_from_yaml(SHIPPING_TABLE)
}

/// Bindings for one parcel
pub fn parcel(weight: f64, destination: &str, member: bool) -> MapContext {
    MapContext::new()
        .with("parcel.weight", weight)
        .with("parcel.destination", destination)
        .with("customer.member", member)
}
