//! Property-Based Test Generators
//!
//! Proptest strategies for claims, including malformed numeric input.

use core_kernel::{LenientDecimal, PatientId};
use domain_claims::{Claim, ClaimLine};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::fixtures::CodeFixtures;

/// Strategy for procedure codes, biased toward codes the fixtures know
pub fn procedure_code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(CodeFixtures::OFFICE_VISIT.to_string()),
        Just(CodeFixtures::OFFICE_VISIT_L4.to_string()),
        Just(CodeFixtures::VENIPUNCTURE.to_string()),
        Just(CodeFixtures::ECG.to_string()),
        Just(CodeFixtures::WELLNESS.to_string()),
        (10000u32..99999u32).prop_map(|n| n.to_string()),
    ]
}

/// Strategy for place-of-service codes
pub fn pos_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("11".to_string()),
        Just(CodeFixtures::INPATIENT_POS.to_string()),
        Just(CodeFixtures::OUTPATIENT_POS.to_string()),
    ]
}

/// Strategy for text that never parses as a decimal
pub fn malformed_amount_strategy() -> impl Strategy<Value = LenientDecimal> {
    prop_oneof![
        Just(String::new()),
        "[a-zA-Z]{1,8}",
        "[0-9]{1,3},[0-9]{2}",
    ]
    .prop_map(LenientDecimal::new)
}

/// Strategy for well-formed money amounts, zero included
pub fn amount_strategy() -> impl Strategy<Value = LenientDecimal> {
    (0i64..100_000i64).prop_map(|cents| LenientDecimal::from(Decimal::new(cents, 2)))
}

/// Strategy for unit counts, sometimes malformed
pub fn units_strategy() -> impl Strategy<Value = LenientDecimal> {
    prop_oneof![
        4 => (1u32..10u32).prop_map(LenientDecimal::from),
        1 => malformed_amount_strategy(),
    ]
}

/// Strategy for a claim line
pub fn line_strategy() -> impl Strategy<Value = ClaimLine> {
    (procedure_code_strategy(), units_strategy(), amount_strategy())
        .prop_map(|(cpt, units, charge)| ClaimLine::new(cpt, units, charge))
}

/// Strategy for a claim with up to six lines
pub fn claim_strategy() -> impl Strategy<Value = Claim> {
    (
        prop_oneof![Just(String::new()), Just("Acme Health".to_string())],
        pos_strategy(),
        prop_oneof![amount_strategy(), malformed_amount_strategy()],
        prop::collection::vec(line_strategy(), 0..6),
    )
        .prop_map(|(payer, pos, total, lines)| {
            let mut claim = Claim::new(PatientId::new_v7(), payer, pos, total);
            for line in lines {
                claim.add_line(line);
            }
            claim
        })
}
