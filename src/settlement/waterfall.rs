// ============================================================================
// Settlement Waterfall
// Ordered, clamped transfers between a position's collateral and the reserves
// ============================================================================

use super::types::{Pool, SettlementInput, SettlementOutput, SettlementStatus, Transfer, WaterfallStep};
use crate::numeric::{FixedDecimal, Precision};
use smallvec::SmallVec;

/// Settle one position against the shared reserves.
///
/// Steps run in a fixed order: profits are paid out of reserves first, then
/// protocol and liquidation fees are taken from the (possibly increased)
/// collateral, then losses are paid into reserves, and finally the liquidity
/// fee is credited to reserves without any clamp. Each clamped step moves
/// `min(requested, available)`.
///
/// Collateral insufficiency dominates reserves insufficiency in the status.
/// Negative inputs are treated as zero.
///
/// ```
/// use settlement_engine::numeric::UsdValue;
/// use settlement_engine::settlement::{calculate_settlement, SettlementStatus};
///
/// let out = calculate_settlement(
///     UsdValue::from_integer(1),    // protocol fee
///     UsdValue::zero(),             // liquidity fee
///     UsdValue::zero(),             // liquidation fee
///     UsdValue::from_integer(100),  // funding rate
///     true,                         // funding in profit
///     UsdValue::zero(),             // pnl delta
///     true,                         // pnl in profit
///     UsdValue::from_integer(10),   // collateral
///     UsdValue::from_integer(50),   // reserves
/// );
///
/// assert_eq!(out.funding_rate_charged, UsdValue::from_integer(50));
/// assert_eq!(out.new_collateral, UsdValue::from_integer(59));
/// assert_eq!(out.status, SettlementStatus::InsufficientReserves);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn calculate_settlement<P: Precision>(
    protocol_fee: FixedDecimal<P>,
    liquidity_fee: FixedDecimal<P>,
    liquidation_fee: FixedDecimal<P>,
    funding_rate: FixedDecimal<P>,
    funding_rate_in_profit: bool,
    pnl_delta: FixedDecimal<P>,
    pnl_delta_in_profit: bool,
    collateral: FixedDecimal<P>,
    total_reserves: FixedDecimal<P>,
) -> SettlementOutput<P> {
    settle(&SettlementInput {
        protocol_fee,
        liquidity_fee,
        liquidation_fee,
        funding_rate,
        funding_rate_in_profit,
        pnl_delta,
        pnl_delta_in_profit,
        collateral,
        total_reserves,
    })
}

pub(super) fn settle<P: Precision>(input: &SettlementInput<P>) -> SettlementOutput<P> {
    let mut waterfall = Waterfall::new(
        non_negative("collateral", &input.collateral),
        non_negative("total_reserves", &input.total_reserves),
    );

    let protocol_fee = non_negative("protocol_fee", &input.protocol_fee);
    let liquidity_fee = non_negative("liquidity_fee", &input.liquidity_fee);
    let liquidation_fee = non_negative("liquidation_fee", &input.liquidation_fee);
    let funding_rate = non_negative("funding_rate", &input.funding_rate);
    let pnl_delta = non_negative("pnl_delta", &input.pnl_delta);

    let mut funding_rate_charged = FixedDecimal::zero();
    let mut pnl_delta_charged = FixedDecimal::zero();

    if input.funding_rate_in_profit {
        funding_rate_charged = waterfall.run(WaterfallStep::FundingProfit, &funding_rate);
    }
    if input.pnl_delta_in_profit {
        pnl_delta_charged = waterfall.run(WaterfallStep::PnlProfit, &pnl_delta);
    }

    let protocol_fee_charged = waterfall.run(WaterfallStep::ProtocolFee, &protocol_fee);
    let liquidation_fee_charged = waterfall.run(WaterfallStep::LiquidationFee, &liquidation_fee);

    if !input.funding_rate_in_profit {
        funding_rate_charged = waterfall.run(WaterfallStep::FundingLoss, &funding_rate);
    }
    if !input.pnl_delta_in_profit {
        pnl_delta_charged = waterfall.run(WaterfallStep::PnlLoss, &pnl_delta);
    }

    let liquidity_fee_charged = waterfall.run(WaterfallStep::LiquidityFee, &liquidity_fee);

    let status = waterfall.status();
    tracing::debug!(
        "Settlement finished: status={}, collateral={}, reserves={}",
        status,
        waterfall.collateral,
        waterfall.reserves
    );

    SettlementOutput {
        protocol_fee_charged,
        liquidity_fee_charged,
        liquidation_fee_charged,
        funding_rate_charged,
        pnl_delta_charged,
        new_collateral: waterfall.collateral,
        new_total_reserves: waterfall.reserves,
        status,
        transfers: waterfall.transfers,
    }
}

fn non_negative<P: Precision>(name: &str, value: &FixedDecimal<P>) -> FixedDecimal<P> {
    if value.is_negative() {
        tracing::warn!("Negative settlement input {} = {}, treating as zero", name, value);
        FixedDecimal::zero()
    } else {
        value.clone()
    }
}

// ============================================================================
// Waterfall State
// ============================================================================

struct Waterfall<P: Precision> {
    collateral: FixedDecimal<P>,
    reserves: FixedDecimal<P>,
    collateral_insufficient: bool,
    reserves_insufficient: bool,
    transfers: SmallVec<[Transfer<P>; 7]>,
}

impl<P: Precision> Waterfall<P> {
    fn new(collateral: FixedDecimal<P>, reserves: FixedDecimal<P>) -> Self {
        Self {
            collateral,
            reserves,
            collateral_insufficient: false,
            reserves_insufficient: false,
            transfers: SmallVec::new(),
        }
    }

    /// Execute one step and return the amount actually moved.
    ///
    /// The step's source and destination pools decide which balances move.
    /// A collateral or reserves source caps the amount at that balance.
    fn run(&mut self, step: WaterfallStep, requested: &FixedDecimal<P>) -> FixedDecimal<P> {
        let charged = match self.balance(step.source()) {
            Some(available) => clamp(requested, available),
            None => requested.clone(),
        };

        if &charged < requested {
            match step.source() {
                Pool::Collateral => self.collateral_insufficient = true,
                Pool::Reserves => self.reserves_insufficient = true,
                Pool::External => {},
            }
            tracing::debug!(
                "Settlement step {:?} clamped: requested={}, charged={}",
                step,
                requested,
                charged
            );
        }

        if let Some(balance) = self.balance_mut(step.source()) {
            *balance = &*balance - &charged;
        }
        if let Some(balance) = self.balance_mut(step.destination()) {
            *balance = &*balance + &charged;
        }

        if !requested.is_zero() {
            self.transfers.push(Transfer {
                step,
                requested: requested.clone(),
                charged: charged.clone(),
            });
        }
        charged
    }

    fn balance(&self, pool: Pool) -> Option<&FixedDecimal<P>> {
        match pool {
            Pool::Collateral => Some(&self.collateral),
            Pool::Reserves => Some(&self.reserves),
            Pool::External => None,
        }
    }

    fn balance_mut(&mut self, pool: Pool) -> Option<&mut FixedDecimal<P>> {
        match pool {
            Pool::Collateral => Some(&mut self.collateral),
            Pool::Reserves => Some(&mut self.reserves),
            Pool::External => None,
        }
    }

    fn status(&self) -> SettlementStatus {
        if self.collateral_insufficient {
            SettlementStatus::InsufficientCollateral
        } else if self.reserves_insufficient {
            SettlementStatus::InsufficientReserves
        } else {
            SettlementStatus::Success
        }
    }
}

fn clamp<P: Precision>(requested: &FixedDecimal<P>, available: &FixedDecimal<P>) -> FixedDecimal<P> {
    requested.clone().min(available.clone())
}
