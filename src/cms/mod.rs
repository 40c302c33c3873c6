//! Content-management API access.
//!
//! | Operation | Prismic request |
//! |---|---|
//! | **query_documents** | `documents/search` with a `document.type` predicate and `fetch` list |
//! | **fetch_page** | `GET` on the opaque `next_page` URL |
//! | **query_uids** | `documents/search` followed page by page |
//! | **get_by_uid** | `documents/search` with a `my.<type>.uid` predicate |
//!
//! - **API**: [`ContentApi`] trait, [`CmsError`], [`DocumentQuery`]
//! - **Prismic**: [`PrismicClient`], the REST v2 implementation

pub mod api;
pub mod prismic;

pub use api::{CmsError, ContentApi, DocumentQuery};
pub use prismic::PrismicClient;
