//! Listing sources, page extraction, and the concurrent fetch over them.
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | Source names and their canonical listing URLs |
//! | [`offers`] | Offer extraction from one listing page |
//! | [`coordinator`] | One task per source over the shared session, joined before returning |
//!
//! Every source is a Freecycle group queried at
//! `https://groups.freecycle.org/{group}/posts/offer?resultsperpage={n}`.
//! Pages list posts newest first, which the extractor relies on to stop at
//! the first post past the recency cutoff.

pub mod coordinator;
pub mod offers;
pub mod source;
