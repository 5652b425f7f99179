// ============================================================================
// Settlement Module
// ============================================================================
//
// Pure settlement of a position's fees, funding and PnL against its
// collateral and the shared reserves. All amounts share one precision tag;
// convert with `FixedDecimal::convert` or a `Formula` before settling.

mod types;
mod waterfall;

pub use types::{
    Pool, SettlementInput, SettlementOutput, SettlementStatus, Transfer, WaterfallStep,
};
pub use waterfall::calculate_settlement;
