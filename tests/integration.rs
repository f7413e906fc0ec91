//! Integration tests for the rendez scheduling engine.
//!
//! These tests drive the public API end to end: template expansion through
//! availability filtering to the folded month grids, and the booking flow
//! that records the commitments blocking later grids.

#[path = "integration/test_booking_flow.rs"]
mod test_booking_flow;

#[path = "integration/test_slot_pipeline.rs"]
mod test_slot_pipeline;
