//! Git repository access
//!
//! Reads repository records (root, HEAD, remotes), lists tracked files and
//! rewrites remote URLs into browsable form.
//!
//! # Reading a repository
//!
//! ```no_run
//! use presence::git::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = read_repository_record(".")?;
//! if let (Some(reference), Some(url)) = (repo.reference(), repo.fetch_url()) {
//!     println!("{} @ {}", normalize_remote_url(url), reference);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Listing tracked files
//!
//! ```no_run
//! use presence::git::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! for file in list_tracked_files(".").await? {
//!     println!("{}", file);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! All operations are **read-only**.

pub mod operations;
pub mod remote;
pub mod types;

pub use operations::*;
pub use remote::*;
pub use types::*;
