use uuid::Uuid;

/// Stable store identifier for a listing.
///
/// UUIDv5 over the DNS namespace, the same scheme Weaviate's `generate_uuid5`
/// uses, so re-ingesting a `house_id` replaces the stored object.
pub fn listing_uuid(house_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, house_id.as_bytes())
}
