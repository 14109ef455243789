//! Version identifiers and resource metadata
//!
//! This crate provides the typed building blocks shared by every versioned
//! resource: the `MAJOR.MINOR.PATCH` version identifier with its bump
//! policy, the ordering rules used when listing version history, and the
//! `meta` envelope (`versionId`, `lastUpdated`, `profile`) carried by every
//! stored document.
//!
//! # Design Philosophy
//!
//! - **Strict identifiers**: a version identifier is exactly three
//!   dot-separated integers. Pre-release and build suffixes are rejected;
//!   clinical version history has no notion of `1.0.0-beta`.
//! - **Lenient envelopes**: [`Meta`] keeps `versionId` as a plain string so
//!   that documents with corrupt version data can still be read and
//!   inspected; parsing happens at the sites that need ordering or bumping.
//! - **No I/O**: this crate is pure data. Storage and orchestration live in
//!   `stratum-store`.
//!
//! # Example
//!
//! ```rust
//! use stratum_meta::{VersionBump, VersionId};
//!
//! let v = VersionId::initial();
//! assert_eq!(v.to_string(), "1.0.0");
//!
//! let v = v.bump(VersionBump::Minor);
//! assert_eq!(v.to_string(), "1.1.0");
//!
//! let v = v.bump(VersionBump::Major);
//! assert_eq!(v.to_string(), "2.0.0");
//! ```

pub mod meta;
pub mod version;

pub use meta::Meta;
pub use version::{MalformedVersion, VersionBump, VersionId, VersionOrder};
