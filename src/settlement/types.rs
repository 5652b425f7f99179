// ============================================================================
// Settlement Domain Model
// ============================================================================

use crate::numeric::{FixedDecimal, Precision};
use smallvec::SmallVec;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of a settlement.
///
/// Insufficiency is not an error: the clamped balances in the output are
/// still the ones to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SettlementStatus {
    /// Every requested amount was moved in full
    #[default]
    Success,
    /// At least one collateral-side step was clamped
    InsufficientCollateral,
    /// Reserves-side clamping only
    InsufficientReserves,
}

impl SettlementStatus {
    pub fn is_success(self) -> bool {
        self == SettlementStatus::Success
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SettlementStatus::Success => "Success",
            SettlementStatus::InsufficientCollateral => "InsufficientCollateral",
            SettlementStatus::InsufficientReserves => "InsufficientReserves",
        };
        f.write_str(s)
    }
}

/// Where a waterfall step takes funds from or sends them to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pool {
    /// The position's collateral
    Collateral,
    /// The shared liquidity reserves
    Reserves,
    /// Outside both balances (fees leaving, fee income arriving)
    External,
}

/// The steps of the waterfall, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WaterfallStep {
    FundingProfit,
    PnlProfit,
    ProtocolFee,
    LiquidationFee,
    FundingLoss,
    PnlLoss,
    LiquidityFee,
}

impl WaterfallStep {
    pub const ALL: [WaterfallStep; 7] = [
        WaterfallStep::FundingProfit,
        WaterfallStep::PnlProfit,
        WaterfallStep::ProtocolFee,
        WaterfallStep::LiquidationFee,
        WaterfallStep::FundingLoss,
        WaterfallStep::PnlLoss,
        WaterfallStep::LiquidityFee,
    ];

    pub fn source(self) -> Pool {
        match self {
            WaterfallStep::FundingProfit | WaterfallStep::PnlProfit => Pool::Reserves,
            WaterfallStep::ProtocolFee
            | WaterfallStep::LiquidationFee
            | WaterfallStep::FundingLoss
            | WaterfallStep::PnlLoss => Pool::Collateral,
            WaterfallStep::LiquidityFee => Pool::External,
        }
    }

    pub fn destination(self) -> Pool {
        match self {
            WaterfallStep::FundingProfit | WaterfallStep::PnlProfit => Pool::Collateral,
            WaterfallStep::ProtocolFee | WaterfallStep::LiquidationFee => Pool::External,
            WaterfallStep::FundingLoss | WaterfallStep::PnlLoss | WaterfallStep::LiquidityFee => {
                Pool::Reserves
            },
        }
    }

    /// True for steps whose amount is limited by an available balance.
    pub fn is_clamped(self) -> bool {
        self.source() != Pool::External
    }
}

/// One amount moved by the waterfall.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct Transfer<P: Precision> {
    pub step: WaterfallStep,
    /// Amount the caller asked for
    pub requested: FixedDecimal<P>,
    /// Amount actually moved
    pub charged: FixedDecimal<P>,
}

impl<P: Precision> Transfer<P> {
    /// True when the source balance could not cover the request.
    pub fn is_short(&self) -> bool {
        self.charged < self.requested
    }

    /// Part of the request that was not moved.
    pub fn shortfall(&self) -> FixedDecimal<P> {
        self.requested.saturating_sub(&self.charged)
    }
}

/// Inputs of one settlement, all in precision `P`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct SettlementInput<P: Precision> {
    pub protocol_fee: FixedDecimal<P>,
    pub liquidity_fee: FixedDecimal<P>,
    pub liquidation_fee: FixedDecimal<P>,
    pub funding_rate: FixedDecimal<P>,
    pub funding_rate_in_profit: bool,
    pub pnl_delta: FixedDecimal<P>,
    pub pnl_delta_in_profit: bool,
    pub collateral: FixedDecimal<P>,
    pub total_reserves: FixedDecimal<P>,
}

impl<P: Precision> SettlementInput<P> {
    /// All-zero input against the given balances.
    pub fn new(collateral: FixedDecimal<P>, total_reserves: FixedDecimal<P>) -> Self {
        Self {
            collateral,
            total_reserves,
            ..Self::default()
        }
    }

    pub fn with_protocol_fee(mut self, fee: FixedDecimal<P>) -> Self {
        self.protocol_fee = fee;
        self
    }

    pub fn with_liquidity_fee(mut self, fee: FixedDecimal<P>) -> Self {
        self.liquidity_fee = fee;
        self
    }

    pub fn with_liquidation_fee(mut self, fee: FixedDecimal<P>) -> Self {
        self.liquidation_fee = fee;
        self
    }

    /// Funding owed to (`in_profit`) or by the position.
    pub fn with_funding_rate(mut self, amount: FixedDecimal<P>, in_profit: bool) -> Self {
        self.funding_rate = amount;
        self.funding_rate_in_profit = in_profit;
        self
    }

    /// Realized PnL owed to (`in_profit`) or by the position.
    pub fn with_pnl_delta(mut self, amount: FixedDecimal<P>, in_profit: bool) -> Self {
        self.pnl_delta = amount;
        self.pnl_delta_in_profit = in_profit;
        self
    }

    /// Run the waterfall over these inputs.
    pub fn settle(&self) -> SettlementOutput<P> {
        super::waterfall::settle(self)
    }
}

/// Result of a settlement: charged amounts, new balances and a status.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct SettlementOutput<P: Precision> {
    pub protocol_fee_charged: FixedDecimal<P>,
    pub liquidity_fee_charged: FixedDecimal<P>,
    pub liquidation_fee_charged: FixedDecimal<P>,
    pub funding_rate_charged: FixedDecimal<P>,
    pub pnl_delta_charged: FixedDecimal<P>,
    pub new_collateral: FixedDecimal<P>,
    pub new_total_reserves: FixedDecimal<P>,
    pub status: SettlementStatus,
    /// Non-zero movements in execution order
    pub transfers: SmallVec<[Transfer<P>; 7]>,
}

impl<P: Precision> SettlementOutput<P> {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Protocol plus liquidation fee actually taken from collateral.
    pub fn total_fees_charged(&self) -> FixedDecimal<P> {
        &self.protocol_fee_charged + &self.liquidation_fee_charged
    }

    /// Signed change of the collateral balance.
    pub fn collateral_delta(&self, before: &FixedDecimal<P>) -> FixedDecimal<P> {
        &self.new_collateral - before
    }

    /// Transfer recorded for `step`, if it moved anything.
    pub fn transfer(&self, step: WaterfallStep) -> Option<&Transfer<P>> {
        self.transfers.iter().find(|t| t.step == step)
    }

    /// Steps that could not be covered in full.
    pub fn short_steps(&self) -> impl Iterator<Item = WaterfallStep> + '_ {
        self.transfers.iter().filter(|t| t.is_short()).map(|t| t.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::UsdDecimals;

    #[test]
    fn test_status_display() {
        assert_eq!(SettlementStatus::Success.to_string(), "Success");
        assert_eq!(SettlementStatus::InsufficientCollateral.to_string(), "InsufficientCollateral");
        assert_eq!(SettlementStatus::InsufficientReserves.to_string(), "InsufficientReserves");
        assert!(SettlementStatus::default().is_success());
    }

    #[test]
    fn test_step_routing() {
        assert_eq!(WaterfallStep::FundingProfit.source(), Pool::Reserves);
        assert_eq!(WaterfallStep::PnlLoss.destination(), Pool::Reserves);
        assert_eq!(WaterfallStep::ProtocolFee.destination(), Pool::External);
        assert!(!WaterfallStep::LiquidityFee.is_clamped());
        assert!(WaterfallStep::LiquidationFee.is_clamped());

        let mut sorted = WaterfallStep::ALL;
        sorted.sort();
        assert_eq!(sorted, WaterfallStep::ALL);
    }

    #[test]
    fn test_transfer_shortfall() {
        let transfer = Transfer::<UsdDecimals> {
            step: WaterfallStep::ProtocolFee,
            requested: FixedDecimal::from_integer(100),
            charged: FixedDecimal::from_integer(60),
        };
        assert!(transfer.is_short());
        assert_eq!(transfer.shortfall(), FixedDecimal::from_integer(40));
    }

    #[test]
    fn test_input_builder() {
        let input = SettlementInput::<UsdDecimals>::new(FixedDecimal::from_integer(10), FixedDecimal::from_integer(20))
            .with_protocol_fee(FixedDecimal::from_integer(1))
            .with_funding_rate(FixedDecimal::from_integer(2), true)
            .with_pnl_delta(FixedDecimal::from_integer(3), false);

        assert_eq!(input.protocol_fee, FixedDecimal::from_integer(1));
        assert!(input.funding_rate_in_profit);
        assert!(!input.pnl_delta_in_profit);
        assert!(input.liquidity_fee.is_zero());
        assert_eq!(input.total_reserves, FixedDecimal::from_integer(20));
    }
}
