//! Integration test crate for Cutline.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It drives a full `EditorSession` on the in-memory hosts.

#[cfg(test)]
mod support;

#[cfg(test)]
mod timing;

#[cfg(test)]
mod editing;

#[cfg(test)]
mod playback;

#[cfg(test)]
mod export;
