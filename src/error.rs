// src/error.rs
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioError {
    pub message: String,
}

impl PortfolioError {
    pub fn new(message: impl Into<String>) -> Self {
        PortfolioError {
            message: message.into(),
        }
    }

    pub fn provider(symbol: &str, detail: impl fmt::Display) -> Self {
        PortfolioError::new(format!("price provider error for {}: {}", symbol, detail))
    }

    pub fn unknown_ticker(symbol: &str) -> Self {
        PortfolioError::new(format!("ticker {} is not in the price table", symbol))
    }

    pub fn insufficient_history(needed: usize, available: usize) -> Self {
        PortfolioError::new(format!(
            "need at least {} price rows, only {} available",
            needed, available
        ))
    }
}

impl fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PortfolioError {}
