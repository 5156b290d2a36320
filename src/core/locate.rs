use crate::adapters::store::RemoteComment;

/// Finds the managed comment among the comments of a pull request: the first
/// one, in the order the store returned them, whose body starts with the exact
/// header string. Matching is case-sensitive; a header appearing elsewhere in
/// a body does not count. If duplicates exist only the first is acted upon.
pub fn find_managed<'a>(comments: &'a [RemoteComment], header: &str) -> Option<&'a RemoteComment> {
    comments.iter().find(|c| c.body.starts_with(header))
}
