//! Unit tests for the Identifiers module
//!
//! Tests cover creation, parsing, conversion, ordering and display
//! formatting of the claim identifiers.

use core_kernel::{ClaimId, ClaimLineId, CoverageId, PatientId};
use std::collections::HashSet;
use uuid::Uuid;

mod claim_line_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = ClaimLineId::new();
        let id2 = ClaimLineId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = ClaimLineId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = ClaimLineId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = ClaimLineId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_parse_without_prefix() {
        let uuid = Uuid::new_v4();
        let id: ClaimLineId = uuid.to_string().parse().unwrap();
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("CLML-not-a-uuid".parse::<ClaimLineId>().is_err());
    }

    #[test]
    fn test_hashable() {
        let id = ClaimLineId::new();
        let mut set = HashSet::new();
        set.insert(id);
        set.insert(id);
        assert_eq!(set.len(), 1);
    }
}

mod prefix_tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(ClaimId::prefix(), "CLM");
        assert_eq!(ClaimLineId::prefix(), "CLML");
        assert_eq!(PatientId::prefix(), "PAT");
        assert_eq!(CoverageId::prefix(), "COV");
    }

    #[test]
    fn test_display_uses_prefix() {
        let id = PatientId::new();
        assert!(id.to_string().starts_with("PAT-"));
    }
}

mod serde_tests {
    use super::*;

    #[test]
    fn test_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = ClaimId::from(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));

        let back: ClaimId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
