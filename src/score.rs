//! Deterministic scoring of a listing against buyer requirements.
//!
//! Pure: no I/O, no clock, no state. Identical inputs always produce an
//! identical `MatchResult`, including the order of `reasons`.

use crate::models::{
    Currency, ListingDetail, MatchResult, Requirements, TrustLevel, VendorRating, Verdict,
};

const WEIGHT_PRICE: f64 = 0.4;
const WEIGHT_SPECS: f64 = 0.4;
const WEIGHT_CONDITION: f64 = 0.1;
const WEIGHT_TRUST: f64 = 0.1;

/// Price above budget by more than this fraction forces a reject
const HARD_REJECT_OVERSHOOT: f64 = 0.5;

const MATCH_THRESHOLD: f64 = 0.75;
const PARTIAL_THRESHOLD: f64 = 0.4;

/// Score one listing against the buyer's requirements. Never fails:
/// malformed input degrades to a `Reject` verdict with a reason instead.
pub fn score(
    detail: &ListingDetail,
    req: &Requirements,
    vendor: Option<&VendorRating>,
) -> MatchResult {
    let mut reasons = Vec::new();
    let mut hard_reject = false;
    let mut capped_at_partial = false;

    // Price gates. No cross-currency conversion: a currency mismatch caps
    // the verdict at Partial and zeroes the price term.
    let price = &detail.summary.price;
    let mut price_score = 1.0;
    if let Some(max) = &req.max_price {
        let comparable = price.currency != Currency::Unknown
            && max.currency != Currency::Unknown
            && price.currency == max.currency;
        if !comparable {
            capped_at_partial = true;
            price_score = 0.0;
            reasons.push(format!(
                "currency mismatch: listing is {:?}, budget is {:?}",
                price.currency, max.currency
            ));
        } else if !price.amount.is_finite() || !max.amount.is_finite() {
            hard_reject = true;
            price_score = 0.0;
            reasons.push("unparseable price or budget".to_string());
        } else if price.amount > max.amount {
            price_score = 0.0;
            let overshoot = (price.amount - max.amount) / max.amount.max(f64::EPSILON);
            if overshoot > HARD_REJECT_OVERSHOOT {
                hard_reject = true;
                reasons.push(format!(
                    "price {} exceeds budget {} by more than 50%",
                    price.amount, max.amount
                ));
            } else {
                reasons.push(format!(
                    "price {} exceeds budget {}",
                    price.amount, max.amount
                ));
            }
        }
    }

    // Required specs: each satisfied key contributes 1/N
    let mut specs_score = if req.required_specs.is_empty() {
        1.0
    } else {
        let n = req.required_specs.len() as f64;
        let mut satisfied = 0.0;
        for (key, wanted) in &req.required_specs {
            let found = detail
                .specs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.to_lowercase().contains(&wanted.to_lowercase()))
                .unwrap_or(false);
            if found {
                satisfied += 1.0;
            } else {
                reasons.push(format!("missing required spec: {}={}", key, wanted));
            }
        }
        satisfied / n
    };

    // Condition gate: failing halves the specs subscore, never hard-rejects
    let mut condition_score = 1.0;
    if let Some(min) = req.min_condition {
        if !detail.condition.at_least(min) {
            condition_score = 0.0;
            specs_score /= 2.0;
            reasons.push(format!(
                "condition {:?} is below required {:?}",
                detail.condition, min
            ));
        }
    }

    // Vendor trust gate, only when a rating was supplied
    let mut trust_score = 1.0;
    if let Some(min) = req.min_vendor_trust {
        match vendor {
            Some(v) => {
                if !v.trust_level.at_least(min) {
                    trust_score = 0.0;
                    reasons.push(format!(
                        "vendor trust {:?} is below required {:?}",
                        v.trust_level, min
                    ));
                }
                if v.trust_level == TrustLevel::Unknown {
                    trust_score = 0.0;
                }
            }
            None => {
                // Absent data is not evidence against the listing
                reasons.push("vendor unchecked".to_string());
            }
        }
    }

    let score = WEIGHT_PRICE * clamp(price_score)
        + WEIGHT_SPECS * clamp(specs_score)
        + WEIGHT_CONDITION * clamp(condition_score)
        + WEIGHT_TRUST * clamp(trust_score);

    let mut verdict = if score >= MATCH_THRESHOLD {
        Verdict::Match
    } else if score >= PARTIAL_THRESHOLD {
        Verdict::Partial
    } else {
        Verdict::Reject
    };
    if capped_at_partial && verdict == Verdict::Match {
        verdict = Verdict::Partial;
    }
    if hard_reject {
        verdict = Verdict::Reject;
    }

    MatchResult {
        score,
        verdict,
        reasons,
    }
}

fn clamp(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}
