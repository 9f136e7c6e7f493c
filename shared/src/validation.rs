//! Validation utilities for the Sauda Management Platform

use rust_decimal::Decimal;

/// Validate broker code format (3-20 uppercase alphanumeric, e.g. "BRK001")
pub fn validate_broker_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 3 {
        return Err("Broker code must be at least 3 characters");
    }
    if code.len() > 20 {
        return Err("Broker code must be at most 20 characters");
    }
    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Broker code must be uppercase alphanumeric only");
    }
    Ok(())
}

/// Validate a deal rate (strictly positive)
pub fn validate_rate(rate: Decimal) -> Result<(), &'static str> {
    if rate <= Decimal::ZERO {
        return Err("Rate must be positive");
    }
    Ok(())
}

/// Validate a lot's total bora count (non-negative)
pub fn validate_total_bora_count(count: i32) -> Result<(), &'static str> {
    if count < 0 {
        return Err("Total bora count cannot be negative");
    }
    Ok(())
}

/// Validate a shipment's sent bora count (strictly positive)
pub fn validate_sent_bora_count(count: i32) -> Result<(), &'static str> {
    if count <= 0 {
        return Err("Sent bora count must be positive");
    }
    Ok(())
}

/// Validate a ledger posting amount (strictly positive)
pub fn validate_ledger_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Ledger amount must be positive");
    }
    Ok(())
}

/// Validate an expense field (non-negative)
pub fn validate_expense(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Expense cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_broker_code_valid() {
        assert!(validate_broker_code("BRK001").is_ok());
        assert!(validate_broker_code("AGR").is_ok());
        assert!(validate_broker_code("B1234567890123456789").is_ok());
    }

    #[test]
    fn test_validate_broker_code_invalid() {
        assert!(validate_broker_code("BR").is_err()); // Too short
        assert!(validate_broker_code("B12345678901234567890").is_err()); // Too long
        assert!(validate_broker_code("brk001").is_err()); // Lowercase
        assert!(validate_broker_code("BRK-001").is_err()); // Special char
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(Decimal::from(4200)).is_ok());
        assert!(validate_rate(Decimal::ZERO).is_err());
        assert!(validate_rate(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_bora_counts() {
        assert!(validate_total_bora_count(0).is_ok());
        assert!(validate_total_bora_count(120).is_ok());
        assert!(validate_total_bora_count(-1).is_err());

        assert!(validate_sent_bora_count(1).is_ok());
        assert!(validate_sent_bora_count(0).is_err());
        assert!(validate_sent_bora_count(-5).is_err());
    }

    #[test]
    fn test_validate_ledger_amount() {
        assert!(validate_ledger_amount(Decimal::from(500)).is_ok());
        assert!(validate_ledger_amount(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_validate_expense() {
        assert!(validate_expense(Decimal::ZERO).is_ok());
        assert!(validate_expense(Decimal::from(50)).is_ok());
        assert!(validate_expense(Decimal::from(-50)).is_err());
    }
}
