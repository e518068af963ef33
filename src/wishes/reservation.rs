// src/wishes/reservation.rs
//! The reservation state machine.
//!
//! available -> reserved -> purchased, with reserved -> available via
//! cancellation and `purchased` terminal. Every transition is a pure
//! function from the previous wish record to the next one; HTTP handlers
//! persist what these functions decide and nothing else. Counter deltas are
//! conditioned on the previously observed status so a replayed success can
//! never double-count.

use tracing::warn;

use super::models::Wish;
use crate::common::is_email_shaped;

/// Closed status enum. Unknown strings normalize to `Available` at the wire
/// boundary rather than leaking outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishStatus {
    Available,
    Reserved,
    Purchased,
}

impl WishStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "reserved" => WishStatus::Reserved,
            "purchased" => WishStatus::Purchased,
            _ => WishStatus::Available,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WishStatus::Available => "available",
            WishStatus::Reserved => "reserved",
            WishStatus::Purchased => "purchased",
        }
    }
}

/// Identity of the caller attempting a transition
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// Stable identity reference (user id)
    pub uid: String,
    /// Verified email for this session
    pub email: String,
}

/// What a reserve transition records on the wish
#[derive(Debug, Clone)]
pub struct ReservationClaim {
    pub email: String,
    pub uid: String,
    pub reserver_name: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TransitionError {
    /// The wish was not available; someone else holds it (or it is bought)
    Conflict(WishStatus),
    /// Cancel attempted on a wish that is not reserved
    NotReserved(WishStatus),
    /// Caller is not the reserver
    NotYourReservation,
}

/// How a cancel request was authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelAuthorization {
    /// Caller's stable identity equals the recorded reserver UID
    UidMatch,
    /// Legacy fallback: no UID was recorded at reservation time and the
    /// caller's verified email equals the recorded contact, which must
    /// itself be email-shaped. Audited - every use is logged.
    LegacyEmailMatch,
    Denied,
}

/// Reserve transition: only an available wish can be taken.
///
/// Returns the next wish record with all reservation metadata populated.
pub fn reserve(prev: &Wish, claim: &ReservationClaim) -> Result<Wish, TransitionError> {
    match prev.status() {
        WishStatus::Available => {}
        other => return Err(TransitionError::Conflict(other)),
    }

    let mut next = prev.clone();
    next.status = WishStatus::Reserved.as_str().to_string();
    next.reserved_by = Some(claim.email.clone());
    next.reserved_by_uid = Some(claim.uid.clone());
    next.reserver_name = claim.reserver_name.clone();
    next.reserved_message = claim.message.clone();
    Ok(next)
}

/// Cancel transition: reverts a reserved wish to available and clears all
/// reservation metadata. Authorization must be decided first via
/// [`authorize_cancel`]; this function rejects a `Denied` outcome.
pub fn cancel(
    prev: &Wish,
    authorization: CancelAuthorization,
) -> Result<Wish, TransitionError> {
    match prev.status() {
        WishStatus::Reserved => {}
        other => return Err(TransitionError::NotReserved(other)),
    }

    if authorization == CancelAuthorization::Denied {
        return Err(TransitionError::NotYourReservation);
    }

    let mut next = prev.clone();
    next.status = WishStatus::Available.as_str().to_string();
    next.reserved_by = None;
    next.reserved_by_uid = None;
    next.reserved_at = None;
    next.reserver_name = None;
    next.reserved_message = None;
    Ok(next)
}

/// Decide whether `caller` may cancel the reservation on `wish`.
///
/// Strict rule: the caller's stable identity must equal `reserved_by_uid`
/// exactly. Fallback (legacy records without a UID): the caller's verified
/// email case-insensitively equals `reserved_by`, and `reserved_by` is
/// itself email-shaped - a display name never matches.
pub fn authorize_cancel(caller: &CallerIdentity, wish: &Wish) -> CancelAuthorization {
    if let Some(uid) = &wish.reserved_by_uid {
        if uid == &caller.uid {
            return CancelAuthorization::UidMatch;
        }
        // A recorded UID is authoritative; the email fallback only exists
        // for records that never had one.
        return CancelAuthorization::Denied;
    }

    if let Some(reserved_by) = &wish.reserved_by {
        if is_email_shaped(reserved_by)
            && reserved_by.eq_ignore_ascii_case(&caller.email)
        {
            warn!(
                wish_id = %wish.id,
                caller_uid = %caller.uid,
                "Cancel authorized via legacy email match (no reserver UID on record)"
            );
            return CancelAuthorization::LegacyEmailMatch;
        }
    }

    CancelAuthorization::Denied
}

/// Increment applied to the parent wishlist's `reserved_count` when a
/// reserve succeeds, conditioned on the previously observed status.
/// A wish already seen as reserved contributes nothing - the idempotence
/// guard against double-applying a replayed success.
pub fn reserve_count_delta(prev: WishStatus) -> i64 {
    match prev {
        WishStatus::Available => 1,
        WishStatus::Reserved | WishStatus::Purchased => 0,
    }
}

/// Decrement applied on cancel; the caller floors the stored counter at
/// zero when persisting.
pub fn cancel_count_delta(prev: WishStatus) -> i64 {
    match prev {
        WishStatus::Reserved => -1,
        WishStatus::Available | WishStatus::Purchased => 0,
    }
}

/// State invariant: reservation metadata iff reserved, purchase metadata
/// iff purchased.
pub fn invariant_holds(wish: &Wish) -> bool {
    let has_reservation = wish.reserved_by.is_some();
    let has_purchase = wish.purchased_by.is_some();
    match wish.status() {
        WishStatus::Available => !has_reservation && !has_purchase,
        WishStatus::Reserved => has_reservation && !has_purchase,
        WishStatus::Purchased => has_purchase && !has_reservation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available_wish() -> Wish {
        Wish {
            id: "W_TEST01".to_string(),
            wishlist_id: "L_TEST01".to_string(),
            title: "Nike Air Max 90".to_string(),
            description: None,
            url: None,
            images: None,
            notes: None,
            price: Some(120.0),
            currency: "USD".to_string(),
            status: "available".to_string(),
            reserved_by: None,
            reserved_by_uid: None,
            reserved_at: None,
            reserver_name: None,
            reserved_message: None,
            purchased_by: None,
            purchased_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn claim() -> ReservationClaim {
        ReservationClaim {
            email: "friend@example.com".to_string(),
            uid: "U_FRIEND".to_string(),
            reserver_name: Some("Friend".to_string()),
            message: None,
        }
    }

    fn reserved_wish() -> Wish {
        reserve(&available_wish(), &claim()).unwrap()
    }

    fn caller(uid: &str, email: &str) -> CallerIdentity {
        CallerIdentity {
            uid: uid.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_reserve_populates_all_reservation_metadata() {
        let next = reserved_wish();
        assert_eq!(next.status(), WishStatus::Reserved);
        assert_eq!(next.reserved_by.as_deref(), Some("friend@example.com"));
        assert_eq!(next.reserved_by_uid.as_deref(), Some("U_FRIEND"));
        assert!(invariant_holds(&next));
    }

    #[test]
    fn test_reserve_conflicts_when_already_reserved() {
        let taken = reserved_wish();
        let result = reserve(&taken, &claim());
        assert_eq!(result, Err(TransitionError::Conflict(WishStatus::Reserved)));
    }

    #[test]
    fn test_reserve_conflicts_when_purchased() {
        let mut wish = available_wish();
        wish.status = "purchased".to_string();
        wish.purchased_by = Some("someone@example.com".to_string());
        let result = reserve(&wish, &claim());
        assert_eq!(
            result,
            Err(TransitionError::Conflict(WishStatus::Purchased))
        );
    }

    #[test]
    fn test_cancel_clears_all_reservation_metadata() {
        let taken = reserved_wish();
        let auth = authorize_cancel(&caller("U_FRIEND", "friend@example.com"), &taken);
        let next = cancel(&taken, auth).unwrap();

        assert_eq!(next.status(), WishStatus::Available);
        assert!(next.reserved_by.is_none());
        assert!(next.reserved_by_uid.is_none());
        assert!(next.reserved_at.is_none());
        assert!(next.reserver_name.is_none());
        assert!(next.reserved_message.is_none());
        assert!(invariant_holds(&next));
    }

    #[test]
    fn test_cancel_requires_reserved_state() {
        let wish = available_wish();
        let result = cancel(&wish, CancelAuthorization::UidMatch);
        assert_eq!(
            result,
            Err(TransitionError::NotReserved(WishStatus::Available))
        );
    }

    #[test]
    fn test_purchased_is_terminal() {
        let mut wish = available_wish();
        wish.status = "purchased".to_string();
        wish.purchased_by = Some("someone@example.com".to_string());

        assert!(reserve(&wish, &claim()).is_err());
        assert_eq!(
            cancel(&wish, CancelAuthorization::UidMatch),
            Err(TransitionError::NotReserved(WishStatus::Purchased))
        );
    }

    // ------------------------------------------------------------------
    // Cancel authorization truth table
    // ------------------------------------------------------------------

    #[test]
    fn test_authorize_cancel_uid_match() {
        let taken = reserved_wish();
        assert_eq!(
            authorize_cancel(&caller("U_FRIEND", "other@example.com"), &taken),
            CancelAuthorization::UidMatch
        );
    }

    #[test]
    fn test_authorize_cancel_rejects_other_uid() {
        let taken = reserved_wish();
        assert_eq!(
            authorize_cancel(&caller("U_STRANGER", "friend@example.com"), &taken),
            CancelAuthorization::Denied
        );
    }

    #[test]
    fn test_authorize_cancel_email_fallback_case_insensitive() {
        let mut taken = reserved_wish();
        taken.reserved_by_uid = None; // legacy record

        assert_eq!(
            authorize_cancel(&caller("U_ANY", "FRIEND@Example.COM"), &taken),
            CancelAuthorization::LegacyEmailMatch
        );
    }

    #[test]
    fn test_authorize_cancel_fallback_requires_email_shaped_contact() {
        let mut taken = reserved_wish();
        taken.reserved_by_uid = None;
        taken.reserved_by = Some("Aunt Carol".to_string());

        // Even a caller whose email string equals the contact must not pass
        // when the contact is a display name.
        assert_eq!(
            authorize_cancel(&caller("U_ANY", "Aunt Carol"), &taken),
            CancelAuthorization::Denied
        );
    }

    #[test]
    fn test_authorize_cancel_recorded_uid_blocks_email_fallback() {
        let taken = reserved_wish();
        // Matching email but wrong UID: the recorded UID is authoritative.
        assert_eq!(
            authorize_cancel(&caller("U_IMPOSTOR", "friend@example.com"), &taken),
            CancelAuthorization::Denied
        );
    }

    // ------------------------------------------------------------------
    // Idempotent counter deltas
    // ------------------------------------------------------------------

    #[test]
    fn test_reserve_count_delta_idempotent() {
        assert_eq!(reserve_count_delta(WishStatus::Available), 1);
        // Replayed success against a wish already seen as reserved
        assert_eq!(reserve_count_delta(WishStatus::Reserved), 0);
        assert_eq!(reserve_count_delta(WishStatus::Purchased), 0);
    }

    #[test]
    fn test_cancel_count_delta() {
        assert_eq!(cancel_count_delta(WishStatus::Reserved), -1);
        assert_eq!(cancel_count_delta(WishStatus::Available), 0);
    }

    #[test]
    fn test_invariant_rejects_mixed_metadata() {
        let mut wish = reserved_wish();
        wish.purchased_by = Some("someone@example.com".to_string());
        assert!(!invariant_holds(&wish));

        let mut bare = available_wish();
        bare.status = "reserved".to_string();
        assert!(!invariant_holds(&bare));
    }
}
