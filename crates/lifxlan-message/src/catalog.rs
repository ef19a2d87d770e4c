use crate::message::CatalogEntry;
use crate::{device, light};

/// Every known message, device family first.
pub fn catalog() -> impl Iterator<Item = &'static CatalogEntry> {
    device::ENTRIES.iter().chain(light::ENTRIES.iter())
}

/// Find the catalog entry for a header's message type.
pub fn lookup(type_id: u16) -> Option<&'static CatalogEntry> {
    catalog().find(|entry| entry.type_id == type_id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::Family;

    #[test]
    fn type_ids_are_unique() {
        let mut seen = HashSet::new();
        for entry in catalog() {
            assert!(seen.insert(entry.type_id), "duplicate type id {}", entry.type_id);
        }
        assert_eq!(seen.len(), catalog().count());
    }

    #[test]
    fn payload_sizes_match_protocol() {
        let expected: &[(u16, usize)] = &[
            (2, 0),
            (3, 5),
            (13, 14),
            (15, 20),
            (17, 14),
            (19, 20),
            (21, 2),
            (24, 32),
            (33, 12),
            (35, 24),
            (45, 0),
            (50, 56),
            (53, 56),
            (58, 8),
            (59, 8),
            (102, 13),
            (107, 52),
            (117, 6),
            (118, 2),
        ];
        for (type_id, size) in expected {
            let entry = lookup(*type_id).unwrap_or_else(|| panic!("missing type {type_id}"));
            assert_eq!(entry.size, *size, "size of {entry}");
        }
    }

    #[test]
    fn get_messages_expect_responses() {
        for entry in catalog() {
            if entry.name.starts_with("Get") || entry.name == "EchoRequest" {
                assert!(entry.has_response, "{entry} should expect a response");
            } else {
                assert!(!entry.has_response, "{entry} should not expect a response");
            }
        }
    }

    #[test]
    fn lookup_reports_family() {
        let entry = lookup(107).unwrap();
        assert_eq!(entry.family, Family::Light);
        assert_eq!(entry.to_string(), "light::State");

        assert_eq!(lookup(22).unwrap().to_string(), "device::StatePower");
        assert!(lookup(9999).is_none());
    }
}
