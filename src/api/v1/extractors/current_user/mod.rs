/*!
 * Current user extractor
 *
 * Public API:
 * - CurrentUser
 * - CurrentUserExtractor
 */

mod core;
mod types;

pub use core::CurrentUserExtractor;
pub use types::CurrentUser;
