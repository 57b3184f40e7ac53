//! Token-related types.

use alloy::primitives::{Address, U256};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result};
use crate::ethereum::constants::{BSC_CHAIN_ID, NATIVE_DECIMALS, NATIVE_SYMBOL, WBNB_ADDRESS};

/// A JSON or BSON scalar that may carry a number either natively or as a string.
///
/// Clients send `chainId: 56` as well as `chainId: "56"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    /// Non-negative integer.
    Int(u64),
    /// Negative integer.
    Signed(i64),
    /// Floating point value.
    Float(f64),
    /// String holding a number.
    Text(String),
}

impl LooseNumber {
    /// Interpret the value as a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            LooseNumber::Int(v) => Some(*v),
            LooseNumber::Signed(_) => None,
            LooseNumber::Float(v) => {
                if v.fract() == 0.0 && *v >= 0.0 && *v <= u64::MAX as f64 {
                    Some(*v as u64)
                } else {
                    None
                }
            }
            LooseNumber::Text(s) => s.trim().parse::<u64>().ok(),
        }
    }

    /// Render the value as a decimal string, as stored for prices.
    pub fn as_decimal_string(&self) -> String {
        match self {
            LooseNumber::Int(v) => v.to_string(),
            LooseNumber::Signed(v) => v.to_string(),
            LooseNumber::Float(v) => v.to_string(),
            LooseNumber::Text(s) => s.trim().to_string(),
        }
    }

    /// Whether the value is an empty string.
    pub fn is_blank(&self) -> bool {
        matches!(self, LooseNumber::Text(s) if s.trim().is_empty())
    }
}

fn de_opt_decimal_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseNumber>::deserialize(deserializer)?.map(|v| v.as_decimal_string()))
}

/// A registry entry describing a token on a given chain.
///
/// Exactly one of `is_native` / `is_token` is set, and `address` is present
/// exactly when `is_token` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Store-generated identifier.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    /// Chain the token lives on.
    pub chain_id: u64,
    /// Smallest-unit precision.
    pub decimals: u8,
    /// Unique registry key (e.g. "CAKE").
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Native asset of the chain.
    #[serde(default)]
    pub is_native: bool,
    /// Contract token.
    #[serde(default)]
    pub is_token: bool,
    /// Contract address, only for contract tokens.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<String>,
    /// Display image URL.
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none", default)]
    pub logo_uri: Option<String>,
    /// Reference price in USDT captured at creation time.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "de_opt_decimal_string"
    )]
    pub usdt_price: Option<String>,
}

impl TokenRecord {
    /// Create a record for the chain's native asset.
    pub fn native(chain_id: u64, decimals: u8, symbol: String, name: String) -> Self {
        Self {
            id: None,
            chain_id,
            decimals,
            symbol,
            name,
            is_native: true,
            is_token: false,
            address: None,
            logo_uri: None,
            usdt_price: None,
        }
    }

    /// Create a record for a contract token.
    pub fn token(
        chain_id: u64,
        decimals: u8,
        symbol: String,
        name: String,
        address: Address,
    ) -> Self {
        Self {
            id: None,
            chain_id,
            decimals,
            symbol,
            name,
            is_native: false,
            is_token: true,
            address: Some(address.to_checksum(None)),
            logo_uri: None,
            usdt_price: None,
        }
    }

    /// Check the native/token invariants.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(AppError::Validation("symbol cannot be empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name cannot be empty".into()));
        }
        if self.is_native == self.is_token {
            return Err(AppError::Validation(
                "Exactly one of isNative and isToken must be true".into(),
            ));
        }
        match (&self.address, self.is_token) {
            (Some(address), true) => {
                parse_address(address)?;
            }
            (None, true) => {
                return Err(AppError::Validation("address is required for a token".into()));
            }
            (Some(_), false) => {
                return Err(AppError::Validation("native tokens cannot have an address".into()));
            }
            (None, false) => {}
        }
        Ok(())
    }
}

/// Partial update of a registry entry, already validated and normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenPatch {
    pub chain_id: Option<u64>,
    pub decimals: Option<u8>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    /// Sets both `isNative` and `isToken = !is_native`.
    pub is_native: Option<bool>,
    pub address: Option<String>,
    pub logo_uri: Option<String>,
    pub usdt_price: Option<String>,
    /// Remove the stored address (record switched to native).
    pub clear_address: bool,
}

impl TokenPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == TokenPatch::default()
    }

    /// Overwrite the supplied fields of `record`.
    pub fn apply_to(&self, record: &mut TokenRecord) {
        if let Some(chain_id) = self.chain_id {
            record.chain_id = chain_id;
        }
        if let Some(decimals) = self.decimals {
            record.decimals = decimals;
        }
        if let Some(symbol) = &self.symbol {
            record.symbol = symbol.clone();
        }
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(is_native) = self.is_native {
            record.is_native = is_native;
            record.is_token = !is_native;
        }
        if let Some(address) = &self.address {
            record.address = Some(address.clone());
        }
        if self.clear_address {
            record.address = None;
        }
        if let Some(logo_uri) = &self.logo_uri {
            record.logo_uri = Some(logo_uri.clone());
        }
        if let Some(usdt_price) = &self.usdt_price {
            record.usdt_price = Some(usdt_price.clone());
        }
    }
}

/// Token descriptor as sent in swap and quote request bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDescriptor {
    pub chain_id: LooseNumber,
    pub decimals: LooseNumber,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_native: bool,
    #[serde(default)]
    pub address: Option<String>,
}

impl TokenDescriptor {
    /// Normalize into a routable currency.
    pub fn to_currency(&self) -> Result<Currency> {
        let chain_id = self
            .chain_id
            .as_u64()
            .ok_or_else(|| AppError::Validation(format!("Invalid chainId for {}", self.symbol)))?;
        if chain_id != BSC_CHAIN_ID {
            return Err(AppError::Validation(format!(
                "Unsupported chainId {}: only BSC ({}) is supported",
                chain_id, BSC_CHAIN_ID
            )));
        }

        if self.is_native {
            return Ok(Currency::Native { chain_id });
        }

        let decimals = self
            .decimals
            .as_u64()
            .and_then(|d| u8::try_from(d).ok())
            .ok_or_else(|| AppError::Validation(format!("Invalid decimals for {}", self.symbol)))?;
        let address = self.address.as_deref().ok_or_else(|| {
            AppError::Validation(format!("address is required for token {}", self.symbol))
        })?;

        Ok(Currency::Token {
            chain_id,
            address: parse_address(address)?,
            decimals,
            symbol: self.symbol.clone(),
            name: self.name.clone(),
        })
    }
}

/// A currency the router can trade: the chain's native asset or a contract token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Currency {
    Native {
        chain_id: u64,
    },
    Token {
        chain_id: u64,
        address: Address,
        decimals: u8,
        symbol: String,
        name: String,
    },
}

impl Currency {
    pub fn chain_id(&self) -> u64 {
        match self {
            Currency::Native { chain_id } | Currency::Token { chain_id, .. } => *chain_id,
        }
    }

    pub fn decimals(&self) -> u8 {
        match self {
            Currency::Native { .. } => NATIVE_DECIMALS,
            Currency::Token { decimals, .. } => *decimals,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Currency::Native { .. } => NATIVE_SYMBOL,
            Currency::Token { symbol, .. } => symbol,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Currency::Native { .. })
    }

    /// Address used inside pools; the native asset trades as WBNB.
    pub fn wrapped(&self) -> Address {
        match self {
            Currency::Native { .. } => WBNB_ADDRESS,
            Currency::Token { address, .. } => *address,
        }
    }
}

/// Parse and validate an EVM address (0x + 40 hex characters).
pub fn parse_address(s: &str) -> Result<Address> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(AppError::InvalidAddress("Address cannot be empty".into()));
    }

    if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
        return Err(AppError::InvalidAddress(format!("Address must start with '0x': {}", s)));
    }

    if trimmed.len() != 42 {
        return Err(AppError::InvalidAddress(format!(
            "Address must be 42 characters (0x + 40 hex chars), got {}: {}",
            trimmed.len(),
            s
        )));
    }

    trimmed
        .parse::<Address>()
        .map_err(|e| AppError::InvalidAddress(format!("Invalid address format '{}': {}", s, e)))
}

/// Format a U256 value with decimals to a human-readable string.
pub fn format_units(value: U256, decimals: u8) -> String {
    if value == U256::ZERO {
        return "0".to_string();
    }

    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let (integer, fraction) = if digits.len() <= decimals {
        ("0".to_string(), format!("{}{}", "0".repeat(decimals - digits.len()), digits))
    } else {
        let (i, f) = digits.split_at(digits.len() - decimals);
        (i.to_string(), f.to_string())
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer
    } else {
        format!("{}.{}", integer, fraction)
    }
}

/// Parse a human-readable amount into smallest units.
///
/// Digits beyond `decimals` are truncated.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();

    if amount.is_empty() {
        return Err(AppError::Validation("Amount cannot be empty".into()));
    }
    if amount.starts_with('-') {
        return Err(AppError::Validation("Amount cannot be negative".into()));
    }

    let (integer, fraction) = match amount.split_once('.') {
        Some((_, f)) if f.contains('.') => {
            return Err(AppError::Validation(format!("Invalid amount format: {}", amount)));
        }
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };

    if integer.is_empty() && fraction.is_empty() {
        return Err(AppError::Validation(format!("Invalid amount format: {}", amount)));
    }
    if !integer.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(format!("Invalid amount: {}", amount)));
    }

    let decimals = decimals as usize;
    let mut fraction = fraction.to_string();
    if fraction.len() > decimals {
        fraction.truncate(decimals);
    } else {
        fraction.push_str(&"0".repeat(decimals - fraction.len()));
    }

    let overflow = || AppError::NumericOverflow(format!("Amount {} exceeds uint256", amount));
    let parse = |digits: &str| -> Result<U256> {
        if digits.is_empty() {
            Ok(U256::ZERO)
        } else {
            digits.parse::<U256>().map_err(|_| overflow())
        }
    };

    let multiplier = U256::from(10u64).checked_pow(U256::from(decimals)).ok_or_else(overflow)?;
    let integer_value = parse(integer)?;
    let fraction_value = parse(&fraction)?;

    integer_value
        .checked_mul(multiplier)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(overflow)
}
