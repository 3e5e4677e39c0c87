//! Protocol constants of the fast virtual machine.
//!
//! It groups the constants by the concern they govern as sub-modules.

/// Bounds on the energy limit a transaction may declare.
pub mod energy_limit {
    /// The minimum energy limit of a non-create transaction.
    pub const MIN_NON_CREATE: u64 = 21_000;
    /// The maximum energy limit of a non-create transaction.
    pub const MAX_NON_CREATE: u64 = 2_000_000;
    /// The minimum energy limit of a contract-creation transaction.
    pub const MIN_CREATE: u64 = 200_000;
    /// The maximum energy limit of a contract-creation transaction.
    pub const MAX_CREATE: u64 = 5_000_000;
}

/// Intrinsic energy charged for a transaction before any code runs.
pub mod intrinsic {
    /// The base cost of every transaction.
    pub const TRANSACTION: u64 = 21_000;
    /// The additional cost of a contract-creation transaction.
    pub const CREATE: u64 = 200_000;
    /// The cost of every zero byte of transaction data.
    pub const ZERO_DATA_BYTE: u64 = 4;
    /// The cost of every non-zero byte of transaction data.
    pub const NON_ZERO_DATA_BYTE: u64 = 64;
}

/// Limits applied while dispatching frames.
pub mod frame {
    /// The maximum depth of nested calls. A message whose depth reaches this value fails.
    pub const MAX_CALL_DEPTH: u32 = 128;
    /// The energy a successful `CREATE` must still hold for its code to be deposited.
    pub const CODE_DEPOSIT_ENERGY: u64 = 1_000;
}

/// Sizes of the fixed-width fields of the frame-bridging wire format.
pub mod wire {
    /// The width of an address.
    pub const ADDRESS_SIZE: usize = 20;
    /// The width of a transferred value. Values at or above 2^128 cannot travel on the wire.
    pub const VALUE_SIZE: usize = 16;
    /// The width of a topic word in a log.
    pub const TOPIC_SIZE: usize = 32;
}
