//! One-shot reentrancy gate for callbacks routed through a shared dispatcher
//!
//! The outbound call opens the gate, the solicited callback consumes it.
//! Mirrors the emitted `CallbackGateway` base contract.

use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayState {
    #[default]
    Closed,
    Open,
}

impl GatewayState {
    /// Called before the outbound request; nested requests are rejected
    pub fn open(&mut self) -> Result<(), AuthError> {
        match self {
            Self::Closed => {
                *self = Self::Open;
                Ok(())
            }
            Self::Open => Err(AuthError::GatewayAlreadyOpen),
        }
    }

    /// Called by the callback after its identifier is authenticated
    pub fn consume(&mut self) -> Result<(), AuthError> {
        match self {
            Self::Open => {
                *self = Self::Closed;
                Ok(())
            }
            Self::Closed => Err(AuthError::GatewayNotOpen),
        }
    }

    pub fn is_open(&self) -> bool {
        *self == Self::Open
    }
}
