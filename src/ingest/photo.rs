use crate::ingest::error::IngestError;
use crate::models::RawListing;

/// One `"<url> <size-tag>"` entry of a listing's photo field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoEntry<'a> {
    pub url: &'a str,
    pub size_tag: &'a str,
}

/// Parse the comma separated photo field, in original order.
///
/// Entries without both a URL and a size tag are skipped.
pub fn photo_entries(photo: &str) -> impl Iterator<Item = PhotoEntry<'_>> {
    photo.split(',').filter_map(|entry| {
        let mut parts = entry.split_whitespace();
        let url = parts.next()?;
        let size_tag = parts.next()?;
        Some(PhotoEntry { url, size_tag })
    })
}

/// Pick the first photo tagged `preferred_tag` as the listing's cover image
pub fn select_cover_photo<'a>(
    listing: &'a RawListing,
    preferred_tag: &str,
) -> Result<&'a str, IngestError> {
    photo_entries(&listing.photo)
        .find(|entry| entry.size_tag == preferred_tag)
        .map(|entry| entry.url)
        .ok_or_else(|| IngestError::MissingPreferredPhoto {
            house_id: listing.house_id().to_string(),
            preferred_tag: preferred_tag.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingFields;

    fn listing(photo: &str) -> RawListing {
        RawListing {
            fields: ListingFields {
                house_id: "123".to_string(),
                url: "https://listing/123".to_string(),
                ..Default::default()
            },
            photo: photo.to_string(),
        }
    }

    #[test]
    fn test_entries_keep_original_order() {
        let entries: Vec<_> = photo_entries("https://x/a 100w, https://x/b 180w").collect();
        assert_eq!(
            entries,
            vec![
                PhotoEntry { url: "https://x/a", size_tag: "100w" },
                PhotoEntry { url: "https://x/b", size_tag: "180w" },
            ]
        );
    }

    #[test]
    fn test_entries_skip_malformed() {
        let entries: Vec<_> = photo_entries("https://x/a,,  ,https://x/b 180w").collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://x/b");
    }

    #[test]
    fn test_selects_single_preferred_entry() {
        let raw = listing("https://x/a 100w,https://x/b 180w,https://x/c 360w");
        assert_eq!(select_cover_photo(&raw, "180w").unwrap(), "https://x/b");
    }

    #[test]
    fn test_selects_first_of_several_preferred_entries() {
        let raw = listing("https://x/a 180w,https://x/b 180w,https://x/c 180w");
        for _ in 0..3 {
            assert_eq!(select_cover_photo(&raw, "180w").unwrap(), "https://x/a");
        }
    }

    #[test]
    fn test_missing_preferred_tag_is_an_error() {
        let raw = listing("https://x/a 100w,https://x/c 360w");
        match select_cover_photo(&raw, "180w") {
            Err(IngestError::MissingPreferredPhoto { house_id, preferred_tag }) => {
                assert_eq!(house_id, "123");
                assert_eq!(preferred_tag, "180w");
            }
            other => panic!("expected MissingPreferredPhoto, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_photo_field_is_an_error() {
        assert!(select_cover_photo(&listing(""), "180w").is_err());
    }

    #[test]
    fn test_tag_match_is_exact() {
        let raw = listing("https://x/a 1180w,https://x/b 180W");
        assert!(select_cover_photo(&raw, "180w").is_err());
    }
}
