entity! {
    /// Free-form key/value annotation on any other record.
    Metadata("metadata", "metadata") {
        entity_type: String,
        entity_id: String,
        key: String,
        value: String,
    }
}
