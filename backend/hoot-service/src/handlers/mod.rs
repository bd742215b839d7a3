/// HTTP handlers for hoot endpoints
///
/// Create/list/get/update/delete on hoots, plus comment creation on a
/// hoot. Ownership is enforced here; response shaping (author expansion)
/// lives next to the handlers.
pub mod hoots;

// Re-export handler functions at module level
pub use hoots::{create_comment, create_hoot, delete_hoot, get_hoot, list_hoots, update_hoot};
