//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

/// Account ID - the identity provider's stable subject string.
///
/// # Constraints:
/// - **Opaque**: No structure is assumed beyond uniqueness
/// - **Immutable**: Once assigned, NEVER changes
///
/// The QR payload a customer scans is exactly this string, verbatim,
/// with no envelope or checksum.
pub type AccountId = String;

/// Transaction ID - unique per appended transaction record.
///
/// Assigned at append time as a ULID string, so ids sort roughly by
/// creation time.
pub type TransactionId = String;

/// Points - the sole unit of value.
///
/// Integer, non-divisible, non-negative per account by construction.
/// All arithmetic on points uses checked operations.
pub type Points = u64;
