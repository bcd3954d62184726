//! The compiled-in demo record types this binary ships as a runnable
//! benchmark dataset (spec.md §1 "benchmark datasets"; Non-goals rule out
//! *dynamic* schema loading, not a fixed one baked into the binary — the
//! retrieval pack's filtered `original_source/` carries no retained XML/demo
//! schema files to load anyway, per `examples/original_source/_INDEX.md`).
//!
//! Two types, matching spec.md §8's scenario 1 and 2 exactly: `Widget`
//! (type name `"Widget"`) has a single clustered field over three tiers;
//! `Order` (type name `"Order"`) clustered-references a `Widget` with
//! `max_children = 10` and a constant `children_count` of 7, so nine of
//! every ten `Order` positions are valid and the tenth raises
//! [`sdg_engine::InvalidRecord`].

use std::sync::Arc;

use sdg_core::{FieldAccessor, GenId, Record, RecordRef, RngKind};
use sdg_engine::chain::{ChainMode, SetterChain};
use sdg_engine::inspector::SequenceInspector;
use sdg_engine::provider::reference::ClusteredReferenceProvider;
use sdg_engine::provider::value::{Clustered, Constant};
use sdg_engine::setter::{FieldSetter, ReferenceSetterWithPosition};

/// Child positions per `Widget` parent in `Order`'s clustered allocation.
pub const ORDER_MAX_CHILDREN: u64 = 10;
/// Of those, how many are actually valid — the remainder raise `InvalidRecord`.
pub const ORDER_CHILDREN_PER_WIDGET: u64 = 7;

pub const WIDGET_TYPE_NAME: &str = "Widget";
pub const ORDER_TYPE_NAME: &str = "Order";

#[derive(Clone)]
pub struct Widget {
    pub gen_id: GenId,
    pub tier: &'static str,
}

impl Record for Widget {
    fn gen_id(&self) -> GenId {
        self.gen_id
    }

    fn with_gen_id(gen_id: GenId) -> Self {
        Widget { gen_id, tier: "low" }
    }
}

pub struct TierField;
impl FieldAccessor<Widget> for TierField {
    type Value = &'static str;
    fn get(record: &Widget) -> &'static str {
        record.tier
    }
    fn set(record: &mut Widget, value: &'static str) {
        record.tier = value;
    }
}

pub fn encode_widget(w: &Widget) -> Vec<u8> {
    format!("{}\t{}\n", w.gen_id, w.tier).into_bytes()
}

/// Builds the `Widget` field chain (single `Clustered` setter over
/// `["low", "mid", "high"]`, uniformly weighted — spec.md §8 scenario 1).
pub fn widget_chain(mode: ChainMode, cardinality: u64) -> SetterChain<Widget, RngKind> {
    let tiers: Clustered<&'static str> = Clustered::new(vec!["low", "mid", "high"], vec![1.0, 1.0, 1.0], cardinality);
    let mut chain = SetterChain::new(mode);
    chain.push(Box::new(FieldSetter::<Widget, TierField, _, RngKind>::new(tiers)));
    chain
}

#[derive(Clone)]
pub struct Order {
    pub gen_id: GenId,
    pub parent: RecordRef,
    pub slot: u64,
}

impl Record for Order {
    fn gen_id(&self) -> GenId {
        self.gen_id
    }

    fn with_gen_id(gen_id: GenId) -> Self {
        Order {
            gen_id,
            parent: RecordRef(0),
            slot: 0,
        }
    }
}

pub struct ParentField;
impl FieldAccessor<Order> for ParentField {
    type Value = RecordRef;
    fn get(record: &Order) -> RecordRef {
        record.parent
    }
    fn set(record: &mut Order, value: RecordRef) {
        record.parent = value;
    }
}

pub struct SlotField;
impl FieldAccessor<Order> for SlotField {
    type Value = u64;
    fn get(record: &Order) -> u64 {
        record.slot
    }
    fn set(record: &mut Order, value: u64) {
        record.slot = value;
    }
}

pub fn encode_order(o: &Order) -> Vec<u8> {
    format!("{}\t{}\t{}\n", o.gen_id, o.parent.gen_id(), o.slot).into_bytes()
}

/// Builds the `Order` field chain: a single clustered reference to
/// `widgets`, with `children_count` fixed at [`ORDER_CHILDREN_PER_WIDGET`].
pub fn order_chain(mode: ChainMode, widgets: Arc<SequenceInspector<Widget, RngKind>>) -> SetterChain<Order, RngKind> {
    let provider: ClusteredReferenceProvider<Order, Widget, _, RngKind> = ClusteredReferenceProvider::new(
        ORDER_MAX_CHILDREN,
        Constant::new(ORDER_CHILDREN_PER_WIDGET),
        widgets,
    );
    let mut chain = SetterChain::new(mode);
    chain.push(Box::new(ReferenceSetterWithPosition::<
        Order,
        ParentField,
        SlotField,
        _,
        RngKind,
    >::new(provider)));
    chain
}
