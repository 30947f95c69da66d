/// Projects are keyed by the backend's BIGSERIAL id.
pub type ProjectId = i64;

/// The flat key-value "system details" document for one project.
///
/// Keys follow the `bos_{system}_type{N}_{attribute}` naming scheme for slot
/// fields; every other key belongs to the surrounding equipment form and is
/// carried through untouched.
pub type Document = serde_json::Map<String, serde_json::Value>;
