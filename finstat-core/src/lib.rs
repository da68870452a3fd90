//! finstat-core: transaction classification and aggregation.
//!
//! Semi-structured ledger rows come in; classified, signed, time-windowed
//! category totals come out. Every statement generator and KPI in
//! finstat-reports is a different view over these primitives. All
//! computation is pure and in-memory: no wall-clock reads, no I/O, no
//! process-wide state.

pub mod aggregate;
pub mod classify;
pub mod entity;
pub mod record;
pub mod signing;
pub mod window;

pub use aggregate::{aggregate_section, category_net, Section};
pub use classify::{classify, ActivityGroup, CategoryClass, CategoryDef, Chart};
pub use entity::{
    entity_label, filter_entity, group_by_entity, list_entities, scope, scope_owned,
    UNKNOWN_ENTITY,
};
pub use record::{coerce_amount, parse_date, RawRecord, Transaction};
pub use signing::{signed_amount, Side, SumPolicy};
pub use window::{date_span, filter_window, Window};
