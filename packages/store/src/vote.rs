//! The community auto-verification rule.

/// Minimum confirming votes before a report can auto-verify.
pub const AUTO_VERIFY_MIN_UPVOTES: u32 = 5;

/// Whether vote counters meet the auto-verification rule: at least
/// [`AUTO_VERIFY_MIN_UPVOTES`] upvotes, and strictly more upvotes than
/// twice the downvotes.
///
/// The rule only gates the `pending` to `verified` transition; it is never
/// re-evaluated to demote a verified report.
#[must_use]
pub const fn auto_verify(upvotes: u32, downvotes: u32) -> bool {
    upvotes >= AUTO_VERIFY_MIN_UPVOTES && upvotes > downvotes.saturating_mul(2)
}
