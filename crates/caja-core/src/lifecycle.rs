//! # Sale Lifecycle
//!
//! The sale state machine. Every status change and every stock movement
//! caused by a sale is decided here, as a pure function of the current
//! state and the requested status. The database layer only carries out the
//! [`StockEffect`] it is handed.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   checkout(COMPLETED)            checkout(PENDING)                      │
//! │        │ deduct                       │ deduct                          │
//! │        ▼                              ▼                                 │
//! │  ┌───────────┐   ──► PENDING   ┌─────────────────┐                      │
//! │  │ Completed │ ◄────────────── │ PendingReserved │                      │
//! │  └─────┬─────┘   COMPLETED     └────────┬────────┘                      │
//! │        │                                │                               │
//! │        │ CANCELLED            CANCELLED │ restore                       │
//! │        │ restore                        ▼                               │
//! │        │                        ┌───────────┐                           │
//! │        └──────────────────────► │ Cancelled │  terminal                 │
//! │                                 └───────────┘                           │
//! │                                       ▲                                 │
//! │  ┌───────────────────┐   CANCELLED    │                                 │
//! │  │ PendingUnreserved │ ───────────────┘  (no stock held)                │
//! │  └─────────┬─────────┘                                                  │
//! │            │ COMPLETED: deduct ──► Completed                            │
//! │                                                                         │
//! │  PendingUnreserved is only reached by re-editing a sale as PENDING.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::SaleStatus;

// =============================================================================
// Sale State
// =============================================================================

/// Status and stock-deducted flag, restricted to the four reachable pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaleState {
    /// PENDING, no stock held.
    PendingUnreserved,
    /// PENDING, stock already taken off the shelf.
    PendingReserved,
    /// COMPLETED, stock taken.
    Completed,
    /// CANCELLED, stock returned.
    Cancelled,
}

/// What the ledger must do to the lines of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    None,
    /// Take every line's quantity off the shelf.
    Deduct,
    /// Put every line's quantity back.
    Restore,
}

/// Outcome of a status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SaleState,
    pub to: SaleState,
    pub stock: StockEffect,
}

impl Transition {
    /// True when nothing about the sale's state changes.
    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.stock == StockEffect::None
    }
}

/// Steps of a re-edit, in the order the engine performs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditPlan {
    /// Return the existing lines' stock before anything else.
    pub restore_existing: bool,
    /// Take the replacement lines' stock.
    pub deduct_new: bool,
    /// State written once the new lines are in place.
    pub next: SaleState,
}

impl SaleState {
    /// Combines the persisted columns. Unreachable pairs are rejected.
    pub fn from_parts(status: SaleStatus, stock_deducted: bool) -> CoreResult<Self> {
        match (status, stock_deducted) {
            (SaleStatus::Pending, false) => Ok(SaleState::PendingUnreserved),
            (SaleStatus::Pending, true) => Ok(SaleState::PendingReserved),
            (SaleStatus::Completed, true) => Ok(SaleState::Completed),
            (SaleStatus::Cancelled, false) => Ok(SaleState::Cancelled),
            (status, stock_deducted) => Err(CoreError::InvalidSaleState {
                status,
                stock_deducted,
            }),
        }
    }

    pub fn status(&self) -> SaleStatus {
        match self {
            SaleState::PendingUnreserved | SaleState::PendingReserved => SaleStatus::Pending,
            SaleState::Completed => SaleStatus::Completed,
            SaleState::Cancelled => SaleStatus::Cancelled,
        }
    }

    pub fn stock_deducted(&self) -> bool {
        matches!(self, SaleState::PendingReserved | SaleState::Completed)
    }

    /// State of a brand new sale. Checkout always takes stock.
    pub fn at_checkout(status: SaleStatus) -> CoreResult<Self> {
        match status {
            SaleStatus::Completed => Ok(SaleState::Completed),
            SaleStatus::Pending => Ok(SaleState::PendingReserved),
            SaleStatus::Cancelled => Err(CoreError::InvalidStatusTransition {
                from: SaleStatus::Pending,
                to: SaleStatus::Cancelled,
            }),
        }
    }

    /// Decides the next state and the stock movement for a status request.
    ///
    /// Requesting the current status is a no-op. Cancellation is terminal.
    pub fn transition(self, to: SaleStatus) -> CoreResult<Transition> {
        use SaleState::*;

        let (next, stock) = match (self, to) {
            (Cancelled, SaleStatus::Cancelled) => return Err(CoreError::AlreadyCancelled),
            (Cancelled, to) => {
                return Err(CoreError::InvalidStatusTransition {
                    from: SaleStatus::Cancelled,
                    to,
                })
            }

            (current, to) if current.status() == to => (current, StockEffect::None),

            (PendingUnreserved, SaleStatus::Completed) => (Completed, StockEffect::Deduct),
            (PendingReserved, SaleStatus::Completed) => (Completed, StockEffect::None),
            (Completed, SaleStatus::Pending) => (PendingReserved, StockEffect::None),

            (current, SaleStatus::Cancelled) => {
                let stock = if current.stock_deducted() {
                    StockEffect::Restore
                } else {
                    StockEffect::None
                };
                (Cancelled, stock)
            }

            // every remaining pair has equal statuses and matched above
            (current, to) => {
                return Err(CoreError::InvalidStatusTransition {
                    from: current.status(),
                    to,
                })
            }
        };

        Ok(Transition {
            from: self,
            to: next,
            stock,
        })
    }

    /// Plans a re-edit that replaces every line and lands in `target`.
    pub fn plan_edit(self, target: SaleStatus) -> CoreResult<EditPlan> {
        if self == SaleState::Cancelled {
            return Err(CoreError::InvalidStatusTransition {
                from: SaleStatus::Cancelled,
                to: target,
            });
        }

        let next = match target {
            SaleStatus::Completed => SaleState::Completed,
            SaleStatus::Pending => SaleState::PendingUnreserved,
            SaleStatus::Cancelled => {
                return Err(CoreError::InvalidStatusTransition {
                    from: self.status(),
                    to: SaleStatus::Cancelled,
                })
            }
        };

        Ok(EditPlan {
            restore_existing: self.stock_deducted(),
            deduct_new: next.stock_deducted(),
            next,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [SaleState; 4] = [
        SaleState::PendingUnreserved,
        SaleState::PendingReserved,
        SaleState::Completed,
        SaleState::Cancelled,
    ];

    #[test]
    fn test_parts_roundtrip_for_reachable_states() {
        for state in ALL_STATES {
            let back = SaleState::from_parts(state.status(), state.stock_deducted()).unwrap();
            assert_eq!(back, state);
        }
    }

    #[test]
    fn test_checkout_always_deducts() {
        assert_eq!(SaleState::at_checkout(SaleStatus::Completed), Ok(SaleState::Completed));
        assert_eq!(
            SaleState::at_checkout(SaleStatus::Pending),
            Ok(SaleState::PendingReserved)
        );
        assert!(SaleState::at_checkout(SaleStatus::Cancelled).is_err());
    }

    #[test]
    fn test_pending_unreserved_to_completed_deducts() {
        let t = SaleState::PendingUnreserved
            .transition(SaleStatus::Completed)
            .unwrap();
        assert_eq!(t.to, SaleState::Completed);
        assert_eq!(t.stock, StockEffect::Deduct);
    }

    #[test]
    fn test_reserved_to_completed_and_back_moves_no_stock() {
        let t = SaleState::PendingReserved
            .transition(SaleStatus::Completed)
            .unwrap();
        assert_eq!(t.to, SaleState::Completed);
        assert_eq!(t.stock, StockEffect::None);

        let t = SaleState::Completed.transition(SaleStatus::Pending).unwrap();
        assert_eq!(t.to, SaleState::PendingReserved);
        assert_eq!(t.stock, StockEffect::None);
    }

    #[test]
    fn test_cancel_restores_only_when_deducted() {
        let t = SaleState::Completed.transition(SaleStatus::Cancelled).unwrap();
        assert_eq!(t.to, SaleState::Cancelled);
        assert_eq!(t.stock, StockEffect::Restore);

        let t = SaleState::PendingReserved
            .transition(SaleStatus::Cancelled)
            .unwrap();
        assert_eq!(t.stock, StockEffect::Restore);

        let t = SaleState::PendingUnreserved
            .transition(SaleStatus::Cancelled)
            .unwrap();
        assert_eq!(t.to, SaleState::Cancelled);
        assert_eq!(t.stock, StockEffect::None);
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert_eq!(
            SaleState::Cancelled.transition(SaleStatus::Cancelled),
            Err(CoreError::AlreadyCancelled)
        );
        assert_eq!(
            SaleState::Cancelled.transition(SaleStatus::Completed),
            Err(CoreError::InvalidStatusTransition {
                from: SaleStatus::Cancelled,
                to: SaleStatus::Completed,
            })
        );
        assert!(SaleState::Cancelled.plan_edit(SaleStatus::Completed).is_err());
    }

    #[test]
    fn test_same_status_is_noop() {
        for state in [
            SaleState::PendingUnreserved,
            SaleState::PendingReserved,
            SaleState::Completed,
        ] {
            let t = state.transition(state.status()).unwrap();
            assert!(t.is_noop());
            assert_eq!(t.to, state);
        }
    }

    #[test]
    fn test_every_transition_keeps_state_reachable() {
        let targets = [SaleStatus::Pending, SaleStatus::Completed, SaleStatus::Cancelled];
        for state in ALL_STATES {
            for to in targets {
                if let Ok(t) = state.transition(to) {
                    assert_eq!(t.to.status(), to);
                    let deducted_after = match t.stock {
                        StockEffect::Deduct => true,
                        StockEffect::Restore => false,
                        StockEffect::None => state.stock_deducted(),
                    };
                    assert_eq!(deducted_after, t.to.stock_deducted());
                }
            }
        }
    }

    #[test]
    fn test_edit_plan() {
        let plan = SaleState::Completed.plan_edit(SaleStatus::Completed).unwrap();
        assert!(plan.restore_existing);
        assert!(plan.deduct_new);
        assert_eq!(plan.next, SaleState::Completed);

        let plan = SaleState::Completed.plan_edit(SaleStatus::Pending).unwrap();
        assert!(plan.restore_existing);
        assert!(!plan.deduct_new);
        assert_eq!(plan.next, SaleState::PendingUnreserved);

        let plan = SaleState::PendingUnreserved
            .plan_edit(SaleStatus::Completed)
            .unwrap();
        assert!(!plan.restore_existing);
        assert!(plan.deduct_new);

        assert!(SaleState::Completed.plan_edit(SaleStatus::Cancelled).is_err());
    }
}
